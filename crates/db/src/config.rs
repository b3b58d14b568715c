//! Connection settings for the store.

use std::time::Duration;

/// Tuning knobs for the connection pool.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// SQLite URL, e.g. `sqlite://polls.db` or `sqlite::memory:`.
    pub database_url: String,
    /// Pool ceiling. Forced to 1 for in-memory databases.
    pub max_connections: u32,
    /// How long a caller waits for a pooled connection before `StoreUnavailable`.
    pub acquire_timeout: Duration,
    /// How long SQLite waits on a locked database before giving up.
    pub busy_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://polls.db".to_string(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl StoreConfig {
    /// Settings for the given URL with every other knob at its default.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// True for URLs whose database lives only as long as its connection.
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}
