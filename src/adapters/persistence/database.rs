// Database connection pool and lifecycle management.

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;

use crate::core::error::StorageError;

/// Connection pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection idle timeout before being closed
    pub idle_timeout: Duration,
    /// Maximum lifetime of a connection
    pub max_lifetime: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 20,
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

/// Database connection pool manager.
///
/// Handles creation, management, and lifecycle of database connections.
/// All repository operations must use this pool.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool and verify connectivity.
    pub async fn new(database_url: &str, config: PoolConfig) -> Result<Self, StorageError> {
        if database_url.is_empty() {
            return Err(StorageError::unavailable("database URL cannot be empty"));
        }

        let connect_options = PgConnectOptions::from_str(database_url)
            .map_err(|e| StorageError::unavailable(format!("invalid database url: {}", e)))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .idle_timeout(Some(config.idle_timeout))
            .max_lifetime(Some(config.max_lifetime))
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                StorageError::unavailable(format!("failed to create connection pool: {}", e))
            })?;

        let db = Self { pool };
        db.ping().await?;
        Ok(db)
    }

    /// Create a new database connection pool with default configuration.
    pub async fn new_default(database_url: &str) -> Result<Self, StorageError> {
        Self::new(database_url, PoolConfig::default()).await
    }

    /// Readiness probe: one round-trip to the server.
    pub async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| StorageError::unavailable(format!("database ping failed: {}", e)))
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close all connections in the pool.
    pub async fn shutdown(&self) {
        self.pool.close().await;
    }
}
