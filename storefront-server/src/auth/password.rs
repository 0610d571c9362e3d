//! Password hashing (Argon2id, PHC string format)

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::LazyLock;

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Malformed stored hashes never verify
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Run one full verification against a throwaway hash
///
/// Logins for unknown accounts call this so they cost as much as a wrong password.
pub fn verify_unknown_account(password: &str) -> bool {
    static PLACEHOLDER: LazyLock<Option<String>> =
        LazyLock::new(|| hash_password("no-such-account").ok());
    PLACEHOLDER
        .as_deref()
        .is_some_and(|hash| verify_password(password, hash))
}
