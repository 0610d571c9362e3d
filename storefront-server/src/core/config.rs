use rust_decimal::Decimal;
use std::str::FromStr;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | DATABASE_PATH | storefront.db | SQLite database file |
/// | HTTP_PORT | 8000 | HTTP listen port |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_LEVEL | info | fallback filter when RUST_LOG is unset |
/// | LOG_DIR | (unset) | enables daily rolling log files |
/// | PUBLIC_BASE_URL | (unset) | absolute base for media URLs, else the request Host |
/// | MEDIA_URL | /media/ | media path prefix |
/// | DELIVERY_FEE | 0.00 | delivery fee applied to new orders |
/// | DB_MAX_CONNECTIONS | 5 | connection pool size |
///
/// Malformed numeric values fall back to the defaults.
///
/// ```ignore
/// DATABASE_PATH=/data/shop.db HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// e.g. `https://shop.example.com` (no trailing slash needed)
    pub public_base_url: Option<String>,
    pub media_url: String,
    pub delivery_fee: Decimal,
    pub db_max_connections: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "storefront.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .ok()
                .map(|u| u.trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
            media_url: std::env::var("MEDIA_URL").unwrap_or_else(|_| "/media/".into()),
            delivery_fee: std::env::var("DELIVERY_FEE")
                .ok()
                .and_then(|v| Decimal::from_str(v.trim()).ok())
                .filter(|fee| !fee.is_sign_negative())
                .unwrap_or(Decimal::ZERO),
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(5),
        }
    }

    /// Fixed configuration independent of the process environment
    ///
    /// Used by tests and embedded setups.
    pub fn with_database(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            http_port: 8000,
            environment: "development".into(),
            log_level: "info".into(),
            log_dir: None,
            public_base_url: None,
            media_url: "/media/".into(),
            delivery_fee: Decimal::ZERO,
            db_max_connections: 5,
        }
    }

    /// Whether running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_database_defaults() {
        let config = Config::with_database(":memory:");
        assert_eq!(config.database_path, ":memory:");
        assert_eq!(config.http_port, 8000);
        assert_eq!(config.media_url, "/media/");
        assert_eq!(config.delivery_fee, Decimal::ZERO);
        assert!(!config.is_production());
    }
}
