//! Authentication
//!
//! Opaque per-user tokens stored in the database, Argon2 password hashes and
//! the password strength policy.

pub mod extractor;
pub mod password;
pub mod policy;

use shared::models::User;

pub use password::{hash_password, verify_password, verify_unknown_account};

/// Authenticated caller, resolved from the `Authorization` header
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }

    pub fn is_staff(&self) -> bool {
        self.0.is_staff
    }
}

/// Extract the token from `Token <key>` or `Bearer <key>`
pub fn extract_token(header: &str) -> Option<&str> {
    let (scheme, key) = header.trim().split_once(' ')?;
    let key = key.trim();
    if key.is_empty() || key.contains(' ') {
        return None;
    }
    (scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer")).then_some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_schemes() {
        assert_eq!(extract_token("Token abc123"), Some("abc123"));
        assert_eq!(extract_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_token("bearer  abc123 "), Some("abc123"));
        assert_eq!(extract_token("Basic abc123"), None);
        assert_eq!(extract_token("Token"), None);
        assert_eq!(extract_token("Token a b"), None);
    }
}
