//! Data models
//!
//! Shared between storefront-server and its API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod category;
pub mod company;
pub mod order;
pub mod product;
pub mod serde_helpers;
pub mod user;

// Re-exports
pub use category::*;
pub use company::*;
pub use order::*;
pub use product::*;
pub use user::*;
