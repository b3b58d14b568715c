//! `poll-db` crate: persistence core for polls.
//!
//! Creates polls with their choices atomically, reads them back, closes
//! them, records responses and reads per-choice response counts. Everything
//! is backed by SQLite through a shared connection pool.

pub mod config;
pub mod error;
pub mod models;
pub mod pool;
pub mod repository;
pub mod unit_of_work;

pub use config::StoreConfig;
pub use error::DbError;
pub use models::{Choice, NewPoll, Poll, PollSummary, Response};
pub use pool::DbPool;
pub use unit_of_work::UnitOfWork;
