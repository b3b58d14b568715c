//! SQLite connection pool.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::Context;
use crate::{DbError, StoreConfig};

/// Type alias for the shared pool used across the whole application.
pub type DbPool = SqlitePool;

/// Create a new connection pool from `config`.
///
/// Foreign keys are switched on for every connection; the composite key on
/// `responses` depends on it.
pub async fn create_pool(config: &StoreConfig) -> Result<DbPool, DbError> {
    if !config.database_url.starts_with("sqlite:") {
        return Err(DbError::Config(format!(
            "unsupported database url '{}', expected sqlite:",
            config.database_url
        )));
    }

    let options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(|e| DbError::Config(format!("{}: {e}", config.database_url)))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(config.busy_timeout);

    let mut pool_options = SqlitePoolOptions::new().acquire_timeout(config.acquire_timeout);

    if config.is_in_memory() {
        // Every connection to `:memory:` opens a fresh database, so keep exactly one alive.
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    } else {
        pool_options = pool_options.max_connections(config.max_connections);
    }

    info!(
        "Connecting to database (max_connections={})",
        if config.is_in_memory() { 1 } else { config.max_connections }
    );
    let pool = pool_options
        .connect_with(options)
        .await
        .during("connect")?;
    Ok(pool)
}

/// Run embedded SQLx migrations located in `./migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    info!("Running database migrations");
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// A private in-memory database with the schema already applied.
pub async fn create_in_memory_pool() -> Result<DbPool, DbError> {
    let pool = create_pool(&StoreConfig::new("sqlite::memory:")).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
