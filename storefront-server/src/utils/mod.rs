//! Utility Module
//!
//! Logging setup and request-parsing helpers shared by the handlers.

pub mod logger;
pub mod media;
pub mod phone;
pub mod query;
pub mod validation;

pub use media::MediaUrls;
pub use query::QueryParams;
