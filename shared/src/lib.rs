//! Shared types for the storefront
//!
//! Domain models, the unified error system, the pagination envelope and
//! money/time helpers used by the server and its clients.

pub mod error;
pub mod models;
pub mod money;
pub mod pagination;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use pagination::{PAGE_SIZE, Page, PageRequest};
