//! Unified error codes for the storefront
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Account / authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Company errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog errors (products and categories)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Accounts ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (phone number/password)
    InvalidCredentials = 1002,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Password and confirmation differ
    PasswordMismatch = 1101,
    /// Password rejected by the strength policy
    PasswordTooWeak = 1102,
    /// Phone number already registered
    PhoneNumberExists = 1103,
    /// Phone number cannot be parsed
    PhoneNumberInvalid = 1104,
    /// Update touched a read-only profile field
    ReadOnlyField = 1105,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Staff account required
    StaffRequired = 2003,
    /// Only the seller may modify the product
    NotProductSeller = 2004,

    // ==================== 3xxx: Company ====================
    /// Company not found
    CompanyNotFound = 3001,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no items
    OrderEmpty = 4007,
    /// Status change not allowed from the current status
    OrderInvalidTransition = 4008,
    /// Ordered product is missing or inactive
    OrderProductUnavailable = 4009,
    /// Item quantity must be positive
    OrderInvalidQuantity = 4010,

    // ==================== 5xxx: Payment ====================
    /// Unknown payment method
    PaymentInvalidMethod = 5003,

    // ==================== 6xxx: Catalog ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product price is invalid
    ProductInvalidPrice = 6002,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category would become its own ancestor
    CategoryCircularParent = 6104,
    /// Category would become its own parent
    CategorySelfParent = 6105,
    /// Seller code already used by another product
    SellerCodeExists = 6202,
    /// Two specifications share a name on one product
    SpecificationNameDuplicate = 6203,
    /// Search query is blank
    SearchQueryRequired = 6601,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Success",
            ErrorCode::Unknown => "Unknown error",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field missing",

            // Accounts
            ErrorCode::NotAuthenticated => "Authentication credentials were not provided",
            ErrorCode::InvalidCredentials => "Invalid phone number or password",
            ErrorCode::TokenInvalid => "Invalid token",
            ErrorCode::AccountDisabled => "User account is disabled",
            ErrorCode::PasswordMismatch => "Passwords do not match",
            ErrorCode::PasswordTooWeak => "Password is too weak",
            ErrorCode::PhoneNumberExists => "User with this phone number already exists",
            ErrorCode::PhoneNumberInvalid => "Enter a valid phone number",
            ErrorCode::ReadOnlyField => "Field is read-only",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::StaffRequired => "Staff privileges required",
            ErrorCode::NotProductSeller => "Only the seller can modify this product",

            // Company
            ErrorCode::CompanyNotFound => "Company not found",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order must contain at least one item",
            ErrorCode::OrderInvalidTransition => "Order status transition not allowed",
            ErrorCode::OrderProductUnavailable => "Product is not available",
            ErrorCode::OrderInvalidQuantity => "Quantity must be greater than zero",

            // Payment
            ErrorCode::PaymentInvalidMethod => "Invalid payment method",

            // Catalog
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Invalid product price",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryCircularParent => "Cannot create circular parent relationship",
            ErrorCode::CategorySelfParent => "Category cannot be parent of itself",
            ErrorCode::SellerCodeExists => "Seller code already exists",
            ErrorCode::SpecificationNameDuplicate => "Specification names must be unique per product",
            ErrorCode::SearchQueryRequired => "Search query is required",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),

            // Accounts
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),
            1101 => Ok(ErrorCode::PasswordMismatch),
            1102 => Ok(ErrorCode::PasswordTooWeak),
            1103 => Ok(ErrorCode::PhoneNumberExists),
            1104 => Ok(ErrorCode::PhoneNumberInvalid),
            1105 => Ok(ErrorCode::ReadOnlyField),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::StaffRequired),
            2004 => Ok(ErrorCode::NotProductSeller),

            // Company
            3001 => Ok(ErrorCode::CompanyNotFound),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4008 => Ok(ErrorCode::OrderInvalidTransition),
            4009 => Ok(ErrorCode::OrderProductUnavailable),
            4010 => Ok(ErrorCode::OrderInvalidQuantity),

            // Payment
            5003 => Ok(ErrorCode::PaymentInvalidMethod),

            // Catalog
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInvalidPrice),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6104 => Ok(ErrorCode::CategoryCircularParent),
            6105 => Ok(ErrorCode::CategorySelfParent),
            6202 => Ok(ErrorCode::SellerCodeExists),
            6203 => Ok(ErrorCode::SpecificationNameDuplicate),
            6601 => Ok(ErrorCode::SearchQueryRequired),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
