//! Phone number normalization
//!
//! Accounts are keyed by E.164 numbers: `+` followed by 9 to 15 digits.

/// Region code applied to bare 9-digit local numbers
pub const DEFAULT_REGION_CODE: &str = "998";

const MIN_DIGITS: usize = 9;
const MAX_DIGITS: usize = 15;

/// Normalize user input to E.164, or `None` when it is not a phone number
///
/// Spaces, dashes, dots and parentheses are ignored. A leading `00` is read
/// as `+`.
pub fn normalize(raw: &str) -> Option<String> {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();

    let (explicit_plus, digits) = if let Some(rest) = compact.strip_prefix('+') {
        (true, rest)
    } else if let Some(rest) = compact.strip_prefix("00") {
        (true, rest)
    } else {
        (false, compact.as_str())
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !explicit_plus && digits.len() == MIN_DIGITS {
        return Some(format!("+{DEFAULT_REGION_CODE}{digits}"));
    }
    if (MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
        return Some(format!("+{digits}"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_formats() {
        assert_eq!(normalize("+998 90 123-45-67").as_deref(), Some("+998901234567"));
        assert_eq!(normalize("998901234567").as_deref(), Some("+998901234567"));
        assert_eq!(normalize("(90) 123 45 67").as_deref(), Some("+998901234567"));
        assert_eq!(normalize("00998901234567").as_deref(), Some("+998901234567"));
        assert_eq!(normalize("+14155552671").as_deref(), Some("+14155552671"));
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("+"), None);
        assert_eq!(normalize("12345"), None);
        assert_eq!(normalize("+9989012345678901"), None);
        assert_eq!(normalize("90-abc-45-67"), None);
    }
}
