//! Absolute media URLs
//!
//! Stored image paths are relative to the media root; responses carry
//! absolute URLs built from `PUBLIC_BASE_URL` or, failing that, the request
//! `Host` header.

use axum::extract::FromRequestParts;
use http::request::Parts;
use std::convert::Infallible;

use crate::core::ServerState;

/// Builds client-facing URLs for stored media paths
#[derive(Debug, Clone)]
pub struct MediaUrls {
    /// Scheme and authority, e.g. `https://shop.example.com`; empty for relative URLs
    base: String,
    /// Always starts and ends with `/`
    prefix: String,
}

impl MediaUrls {
    pub fn new(base: impl Into<String>, media_url: &str) -> Self {
        let trimmed = media_url.trim_matches('/');
        let prefix = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed}/")
        };
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            prefix,
        }
    }

    /// URL for a stored path; absolute URLs pass through unchanged
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}{}{}", self.base, self.prefix, path.trim_start_matches('/'))
    }

    pub fn url_opt(&self, path: Option<&str>) -> Option<String> {
        path.filter(|p| !p.is_empty()).map(|p| self.url(p))
    }
}

impl FromRequestParts<ServerState> for MediaUrls {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let config = &state.config;
        let base = match &config.public_base_url {
            Some(url) => url.clone(),
            None => parts
                .headers
                .get(http::header::HOST)
                .and_then(|h| h.to_str().ok())
                .map(|host| format!("http://{host}"))
                .unwrap_or_default(),
        };
        Ok(Self::new(base, &config.media_url))
    }
}
