//! SQLite state store implementation for Launchpad
//!
//! This crate provides sqlx-backed implementations of the repository
//! interfaces defined in launchpad-core.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub mod migrations;
pub mod repositories;

pub use repositories::{
    SqlFlightNumberSequence, SqlLaunchRepository, SqlPlanetCatalog, SqlSyncStatusRepository,
};

use launchpad_core::{CoreError, CoreResult, StateStores};

/// Configuration for the SQLite connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlConfig {
    /// Database URL, e.g. `sqlite://launchpad.db` or `sqlite::memory:`
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Timeout for acquiring a connection from the pool (in seconds)
    pub acquire_timeout_secs: u64,

    /// Whether to run migrations on startup
    pub run_migrations: bool,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://launchpad.db".to_string(),
            max_connections: 5,
            acquire_timeout_secs: 30,
            run_migrations: true,
        }
    }
}

impl SqlConfig {
    /// Configuration for a private in-memory database
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Self::default()
        }
    }

    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }
}

/// SQLite connection wrapper
#[derive(Clone)]
pub struct SqlConnection {
    pool: SqlitePool,
}

impl SqlConnection {
    /// Open a pool and, if configured, apply migrations
    pub async fn connect(config: &SqlConfig) -> CoreResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| CoreError::ConfigurationError(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));

        // Every connection to :memory: opens its own database
        if config.is_in_memory() {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| CoreError::StateStoreError(format!("Failed to connect to SQLite: {}", e)))?;

        debug!(url = %config.url, "Connected to SQLite database");

        let conn = Self { pool };
        if config.run_migrations {
            conn.run_migrations().await?;
        }

        Ok(conn)
    }

    /// Apply every embedded migration in order
    pub async fn run_migrations(&self) -> CoreResult<()> {
        for (migration_name, migration_sql) in migrations::generate_migrations() {
            debug!("Applying migration: {}", migration_name);

            sqlx::raw_sql(migration_sql)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    CoreError::StateStoreError(format!(
                        "Migration '{}' failed: {}",
                        migration_name, e
                    ))
                })?;
        }

        info!("SQLite migrations completed successfully");
        Ok(())
    }

    /// Get the database connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Provider for SQLite state store repositories
pub struct SqlStateStoreProvider {
    connection: SqlConnection,
}

impl SqlStateStoreProvider {
    /// Connect with default settings to the given URL
    pub async fn new(url: &str) -> CoreResult<Self> {
        Self::with_config(SqlConfig {
            url: url.to_string(),
            ..SqlConfig::default()
        })
        .await
    }

    /// Connect with a custom configuration
    pub async fn with_config(config: SqlConfig) -> CoreResult<Self> {
        let connection = SqlConnection::connect(&config).await?;
        Ok(Self { connection })
    }

    /// Get the connection
    pub fn connection(&self) -> &SqlConnection {
        &self.connection
    }

    /// Planet catalog with write access for seeding
    pub fn planet_catalog(&self) -> SqlPlanetCatalog {
        SqlPlanetCatalog::new(self.connection.clone())
    }

    /// Create all repositories
    pub fn create_repositories(&self) -> StateStores {
        let conn = self.connection.clone();

        StateStores {
            launches: Arc::new(SqlLaunchRepository::new(conn.clone())),
            sequence: Arc::new(SqlFlightNumberSequence::new(conn.clone())),
            sync_status: Arc::new(SqlSyncStatusRepository::new(conn.clone())),
            planets: Arc::new(SqlPlanetCatalog::new(conn)),
        }
    }
}
