//! Server State
//!
//! Cloned into every handler; holds only the configuration and the pool.

use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::core::{Config, Result};
use crate::db::DbService;

#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        Self {
            config: Arc::new(config),
            pool,
        }
    }

    /// Open the configured database and apply migrations
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db = DbService::new(&config.database_path, config.db_max_connections).await?;
        Ok(Self::new(config.clone(), db.pool))
    }

    /// State over a fresh in-memory database
    pub async fn in_memory(config: Config) -> Result<Self> {
        let db = DbService::in_memory().await?;
        Ok(Self::new(config, db.pool))
    }

    /// Delivery fee applied to new orders
    pub fn delivery_fee(&self) -> Decimal {
        self.config.delivery_fee
    }
}
