//! Input validation helpers
//!
//! Text length limits and field checks used by the write handlers. Every
//! failure names its field under `details.<field>`.

use rust_decimal::Decimal;
use shared::money::MAX_PRICE;
use shared::{AppError, ErrorCode};

// ── Text length limits ──────────────────────────────────────────────

/// Company and category names, specification names, brands, materials, dimensions
pub const MAX_NAME_LEN: usize = 100;

/// Product titles, image alt text
pub const MAX_TITLE_LEN: usize = 200;

/// Person names
pub const MAX_PERSON_NAME_LEN: usize = 150;

/// Seller codes, colors
pub const MAX_CODE_LEN: usize = 50;

/// Locations, specification values
pub const MAX_SHORT_TEXT_LEN: usize = 255;

/// Delivery addresses and notes
pub const MAX_NOTE_LEN: usize = 1000;

/// Delivery phone
pub const MAX_PHONE_LEN: usize = 20;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Image paths
pub const MAX_URL_LEN: usize = 2048;

// ── Validation helpers ──────────────────────────────────────────────

/// A required string must be non-blank and within the length limit
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::field(
            ErrorCode::RequiredField,
            field,
            "This field may not be blank.",
        ));
    }
    validate_length(value, field, max_len)
}

/// An optional string, if present, must be within the length limit
pub fn validate_optional_text(
    value: Option<&str>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    match value {
        Some(v) => validate_length(v, field, max_len),
        None => Ok(()),
    }
}

fn validate_length(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::field(
            ErrorCode::ValidationFailed,
            field,
            format!("Ensure this field has no more than {max_len} characters ({len} given)."),
        ));
    }
    Ok(())
}

/// A price must be present, non-negative and below the storage bound
pub fn validate_price(price: Option<Decimal>, field: &str) -> Result<Decimal, AppError> {
    let price = price.ok_or_else(|| {
        AppError::field(ErrorCode::RequiredField, field, "This field is required.")
    })?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(AppError::field(
            ErrorCode::ProductInvalidPrice,
            field,
            "Ensure this value is greater than or equal to 0.",
        ));
    }
    if price > MAX_PRICE {
        return Err(AppError::field(
            ErrorCode::ProductInvalidPrice,
            field,
            format!("Ensure this value is less than or equal to {MAX_PRICE}."),
        ));
    }
    Ok(price)
}

/// A required reference id
pub fn require_id(value: Option<i64>, field: &str) -> Result<i64, AppError> {
    value.ok_or_else(|| AppError::field(ErrorCode::RequiredField, field, "This field is required."))
}
