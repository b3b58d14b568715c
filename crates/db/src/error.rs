//! Typed error type for the poll-db crate.

use sqlx::error::ErrorKind;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum DbError {
    /// The requested row does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// An insert completed without handing back the generated key.
    #[error("creating {entity} failed, no id obtained")]
    CreationFailure { entity: &'static str },

    /// The store rejected a write on a foreign-key, check, unique or not-null rule.
    #[error("{operation}: constraint violation: {detail}")]
    ConstraintViolation {
        operation: &'static str,
        detail: String,
        #[source]
        source: Option<sqlx::Error>,
    },

    /// The store could not be reached, or the pool gave up waiting for a connection.
    #[error("{operation}: store unavailable: {source}")]
    StoreUnavailable {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// Responses are refused once a poll is closed.
    #[error("poll {poll_id} is closed")]
    PollClosed { poll_id: i64 },

    /// Caller input rejected before anything was written.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Any other failure reported by sqlx.
    #[error("{operation}: {source}")]
    Query {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// Sort a raw sqlx failure into the store's error kinds.
    pub fn classify(operation: &'static str, err: sqlx::Error) -> Self {
        let constraint_detail = match &err {
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::ForeignKeyViolation
                | ErrorKind::CheckViolation
                | ErrorKind::UniqueViolation
                | ErrorKind::NotNullViolation => Some(db_err.message().to_owned()),
                _ => None,
            },
            _ => None,
        };
        let unavailable = match &err {
            sqlx::Error::Database(db_err) => db_err.code().is_some_and(|c| is_unavailable_code(&c)),
            _ => false,
        };

        let classified = match err {
            err @ sqlx::Error::Database(_) if unavailable => {
                Self::StoreUnavailable { operation, source: err }
            }
            err @ sqlx::Error::Database(_) => match constraint_detail {
                Some(detail) => Self::ConstraintViolation {
                    operation,
                    detail,
                    source: Some(err),
                },
                None => Self::Query { operation, source: err },
            },
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::StoreUnavailable { operation, source: err },
            other => Self::Query { operation, source: other },
        };

        warn!(operation, error = %classified, "store operation failed");
        classified
    }

    /// Shorthand for the `NotFound` variant of a poll.
    pub(crate) fn poll_not_found(id: i64) -> Self {
        Self::NotFound { entity: "poll", id }
    }
}

/// SQLite result codes that mean the database could not be reached or locked,
/// matched on the primary code so extended variants (e.g. `SQLITE_BUSY_SNAPSHOT`) count too.
fn is_unavailable_code(code: &str) -> bool {
    const BUSY: i32 = 5;
    const LOCKED: i32 = 6;
    const IOERR: i32 = 10;
    const CANTOPEN: i32 = 14;
    const NOTADB: i32 = 26;

    code.parse::<i32>()
        .map(|extended| matches!(extended & 0xff, BUSY | LOCKED | IOERR | CANTOPEN | NOTADB))
        .unwrap_or(false)
}

/// Attach the failing operation to a sqlx result.
pub(crate) trait Context<T> {
    fn during(self, operation: &'static str) -> Result<T, DbError>;
}

impl<T> Context<T> for Result<T, sqlx::Error> {
    fn during(self, operation: &'static str) -> Result<T, DbError> {
        self.map_err(|err| DbError::classify(operation, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn pool_exhaustion_is_store_unavailable() {
        let err = DbError::classify("get poll", sqlx::Error::PoolTimedOut);
        assert!(matches!(
            err,
            DbError::StoreUnavailable { operation: "get poll", .. }
        ));
    }

    #[test]
    fn io_failure_is_store_unavailable() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let err = DbError::classify("close poll", sqlx::Error::Io(io_err));
        assert!(matches!(err, DbError::StoreUnavailable { .. }));
        assert!(err.to_string().starts_with("close poll: store unavailable"));
    }

    #[test]
    fn row_not_found_stays_a_query_error() {
        let err = DbError::classify("insert poll", sqlx::Error::RowNotFound);
        assert!(matches!(err, DbError::Query { operation: "insert poll", .. }));
    }

    #[test]
    fn sqlite_lock_and_open_codes_are_unavailable() {
        for code in ["5", "6", "10", "14", "26", "517", "3338"] {
            assert!(is_unavailable_code(code), "{code} should be unavailable");
        }
        for code in ["19", "787", "2067", "1", "not-a-number"] {
            assert!(!is_unavailable_code(code), "{code} should not be unavailable");
        }
    }

    #[test]
    fn context_leaves_ok_untouched() {
        let ok: Result<i64, sqlx::Error> = Ok(7);
        assert_eq!(ok.during("noop").unwrap(), 7);
    }

    #[test]
    fn messages_name_the_offending_id() {
        assert_eq!(DbError::poll_not_found(42).to_string(), "poll 42 not found");
        assert_eq!(
            DbError::PollClosed { poll_id: 3 }.to_string(),
            "poll 3 is closed"
        );
        assert_eq!(
            DbError::CreationFailure { entity: "choice" }.to_string(),
            "creating choice failed, no id obtained"
        );
    }
}
