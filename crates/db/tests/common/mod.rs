//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use std::path::Path;

use poll_db::pool::{create_in_memory_pool, create_pool, run_migrations};
use poll_db::repository::create_poll;
use poll_db::{DbPool, NewPoll, Poll, StoreConfig};

pub async fn fresh_pool() -> DbPool {
    create_in_memory_pool()
        .await
        .expect("in-memory pool should open")
}

/// Settings for a database file inside `dir`.
pub fn file_config(dir: &Path, max_connections: u32) -> StoreConfig {
    let url = format!("sqlite://{}", dir.join("polls.db").display());
    StoreConfig::new(url).with_max_connections(max_connections)
}

/// A migrated file-backed pool with several connections.
pub async fn file_pool(config: &StoreConfig) -> DbPool {
    let pool = create_pool(config).await.expect("file pool should open");
    run_migrations(&pool).await.expect("migrations should apply");
    pool
}

/// A poll owned by user 1 with the given choices.
pub async fn seed_poll(pool: &DbPool, question: &str, choices: &[&str]) -> Poll {
    create_poll(pool, NewPoll::new(1, question, choices.iter().copied()))
        .await
        .expect("seed poll should be created")
}

pub async fn count_rows(pool: &DbPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("count query should succeed")
}
