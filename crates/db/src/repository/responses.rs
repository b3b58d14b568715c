//! Response repository functions.

use chrono::Utc;
use tracing::{info, instrument};

use crate::error::Context;
use crate::models::Response;
use crate::{DbError, DbPool};

/// Record one user's vote for `choice_id` on `poll_id`.
///
/// The open-poll check and the insert are a single statement, so a poll
/// closed concurrently can never accept a late response. Whether the choice
/// belongs to the poll is left to the composite foreign key.
///
/// # Errors
/// - [`DbError::PollClosed`] if the poll no longer accepts responses.
/// - [`DbError::ConstraintViolation`] if the poll or choice does not exist,
///   or the choice belongs to another poll.
#[instrument(skip(pool))]
pub async fn create_response(
    pool: &DbPool,
    poll_id: i64,
    choice_id: i64,
    user_id: i64,
) -> Result<Response, DbError> {
    let created_at = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO responses (poll_id, choice_id, user_id, created_at)
        SELECT id, ?, ?, ?
        FROM polls
        WHERE id = ? AND is_closed = FALSE
        "#,
    )
    .bind(choice_id)
    .bind(user_id)
    .bind(created_at)
    .bind(poll_id)
    .execute(pool)
    .await
    .during("insert response")?;

    if result.rows_affected() == 0 {
        let is_closed =
            sqlx::query_scalar::<_, bool>(r#"SELECT is_closed FROM polls WHERE id = ?"#)
                .bind(poll_id)
                .fetch_optional(pool)
                .await
                .during("select poll state")?;

        return Err(match is_closed {
            Some(true) => DbError::PollClosed { poll_id },
            // Open poll yet nothing inserted: not reachable through the schema.
            Some(false) => DbError::CreationFailure { entity: "response" },
            None => DbError::ConstraintViolation {
                operation: "insert response",
                detail: format!("poll {poll_id} does not exist"),
                source: None,
            },
        });
    }

    info!(poll_id, choice_id, "Response recorded");

    Ok(Response {
        poll_id,
        choice_id,
        user_id,
        created_at,
    })
}
