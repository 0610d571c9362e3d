//! Password strength policy
//!
//! Four rules, all reported together:
//! - at least [`MIN_LENGTH`] characters
//! - not entirely numeric
//! - not in the embedded common-password list (case-insensitive)
//! - not too similar to the user's phone number or names

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

pub const MIN_LENGTH: usize = 8;

/// Similarity at or above this ratio is rejected
pub const MAX_SIMILARITY: f64 = 0.7;

static COMMON_PASSWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    include_str!("common-passwords.txt")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
});

/// Identifying fields a password must not resemble
#[derive(Debug, Clone, Copy)]
pub struct UserAttributes<'a> {
    pub phone_number: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

impl UserAttributes<'_> {
    fn labelled(&self) -> [(&'static str, &str); 3] {
        [
            ("phone number", self.phone_number),
            ("first name", self.first_name),
            ("last name", self.last_name),
        ]
    }
}

/// Check `password` against every rule; the error lists each violation
pub fn validate(password: &str, user: &UserAttributes<'_>) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(field) = too_similar(password, user) {
        errors.push(format!("The password is too similar to the {field}."));
    }
    if password.chars().count() < MIN_LENGTH {
        errors.push(format!(
            "This password is too short. It must contain at least {MIN_LENGTH} characters."
        ));
    }
    if COMMON_PASSWORDS.contains(password.trim().to_lowercase().as_str()) {
        errors.push("This password is too common.".to_string());
    }
    if !password.is_empty() && password.chars().all(char::is_numeric) {
        errors.push("This password is entirely numeric.".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Name of the first attribute the password resembles
fn too_similar<'a>(password: &str, user: &UserAttributes<'a>) -> Option<&'static str> {
    let password = password.to_lowercase();
    let pwd_len = password.chars().count();
    for (label, value) in user.labelled() {
        if value.is_empty() {
            continue;
        }
        let value = value.to_lowercase();
        let parts = value
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .chain(std::iter::once(value.as_str()));
        for part in parts {
            let part_len = part.chars().count();
            if exceeds_length_ratio(pwd_len, part_len) {
                continue;
            }
            if quick_ratio(&password, part) >= MAX_SIMILARITY {
                return Some(label);
            }
        }
    }
    None
}

/// Parts far shorter than the password can never reach the similarity bound
fn exceeds_length_ratio(pwd_len: usize, part_len: usize) -> bool {
    let bound = MAX_SIMILARITY / 2.0 * pwd_len as f64;
    pwd_len >= 10 * part_len && (part_len as f64) < bound
}

/// Upper bound on sequence similarity: `2 * shared characters / total length`
pub fn quick_ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }
    let mut available: HashMap<char, usize> = HashMap::new();
    for ch in b.chars() {
        *available.entry(ch).or_default() += 1;
    }
    let mut matches = 0usize;
    for ch in a.chars() {
        if let Some(n) = available.get_mut(&ch)
            && *n > 0
        {
            *n -= 1;
            matches += 1;
        }
    }
    2.0 * matches as f64 / total as f64
}
