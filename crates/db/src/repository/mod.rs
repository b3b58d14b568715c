//! Repository functions: one function per store operation.
//!
//! Every function takes a `&DbPool` and returns a `Result<T, DbError>`.
//! Multi-statement operations run inside a [`crate::UnitOfWork`].

pub mod polls;
pub mod responses;

pub use polls::{close_poll, create_poll, get_poll, get_poll_summaries};
pub use responses::create_response;
