//! User Model

use serde::{Deserialize, Serialize};

/// User entity (phone number is the identity key)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub location: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_verified: bool,
    pub is_active: bool,
    pub is_staff: bool,
    pub date_joined: i64,
    pub updated_at: i64,
}

impl User {
    /// "First Last", as shown next to products
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Public profile view of a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: i64,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub location: Option<String>,
    pub is_verified: bool,
    pub date_joined: i64,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            phone_number: user.phone_number.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            location: user.location.clone(),
            is_verified: user.is_verified,
            date_joined: user.date_joined,
        }
    }
}

/// Registration payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
    pub location: Option<String>,
}

/// Login payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub phone_number: Option<String>,
    pub password: Option<String>,
}

/// Row-level user insert (password already hashed, phone already normalized)
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub location: Option<String>,
    pub password_hash: String,
    pub is_staff: bool,
}

/// Editable profile fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub location: Option<String>,
}

/// Response for register and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserProfile,
    pub token: String,
}

/// Profile fields clients may not write
pub const READ_ONLY_PROFILE_FIELDS: &[&str] = &["id", "phone_number", "is_verified", "date_joined"];
