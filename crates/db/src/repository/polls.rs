//! Poll repository functions.

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::error::Context;
use crate::models::{Choice, NewPoll, Poll, PollRow, PollSummary};
use crate::unit_of_work::UnitOfWork;
use crate::{DbError, DbPool};

/// Insert a poll and all of its choices as one unit.
///
/// The poll row goes in first so its generated id can be written into every
/// choice row. Nothing is persisted unless all inserts succeed.
///
/// # Errors
/// - [`DbError::InvalidInput`] if `new_poll` fails validation.
/// - [`DbError::CreationFailure`] if an insert returns no generated id.
/// - [`DbError::ConstraintViolation`] / [`DbError::StoreUnavailable`] from the store.
#[instrument(skip(pool, new_poll), fields(user_id = new_poll.user_id, choices = new_poll.choices.len()))]
pub async fn create_poll(pool: &DbPool, new_poll: NewPoll) -> Result<Poll, DbError> {
    new_poll.validate()?;
    let NewPoll { user_id, question, choices: texts } = new_poll;
    let created_at = Utc::now();

    let mut uow = UnitOfWork::begin(pool).await?;

    let poll_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO polls (user_id, question, is_closed, created_at)
        VALUES (?, ?, FALSE, ?)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(&question)
    .bind(created_at)
    .fetch_optional(uow.conn())
    .await
    .during("insert poll")?
    .ok_or(DbError::CreationFailure { entity: "poll" })?;

    let mut choices = Vec::with_capacity(texts.len());
    for text in texts {
        let choice_id = sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO choices (poll_id, choice_text) VALUES (?, ?) RETURNING id"#,
        )
        .bind(poll_id)
        .bind(&text)
        .fetch_optional(uow.conn())
        .await
        .during("insert choice")?
        .ok_or(DbError::CreationFailure { entity: "choice" })?;

        choices.push(Choice { id: choice_id, poll_id, text });
    }

    uow.commit().await?;
    info!(poll_id, "Poll created with {} choices", choices.len());

    Ok(Poll {
        id: poll_id,
        user_id,
        question,
        choices,
        is_closed: false,
        created_at,
    })
}

/// Fetch a poll and its choices (in id order) from one snapshot.
///
/// Returns `DbError::NotFound` if no poll has this id.
#[instrument(skip(pool))]
pub async fn get_poll(pool: &DbPool, poll_id: i64) -> Result<Poll, DbError> {
    let mut uow = UnitOfWork::begin(pool).await?;

    let row = sqlx::query_as::<_, PollRow>(
        r#"SELECT id, user_id, question, is_closed, created_at FROM polls WHERE id = ?"#,
    )
    .bind(poll_id)
    .fetch_optional(uow.conn())
    .await
    .during("select poll")?
    .ok_or_else(|| DbError::poll_not_found(poll_id))?;

    let choices = sqlx::query_as::<_, Choice>(
        r#"SELECT id, poll_id, choice_text FROM choices WHERE poll_id = ? ORDER BY id"#,
    )
    .bind(poll_id)
    .fetch_all(uow.conn())
    .await
    .during("select choices")?;

    uow.commit().await?;
    debug!(choices = choices.len(), closed = row.is_closed, "Poll loaded");

    Ok(Poll::from_row(row, choices))
}

/// Mark a poll as closed. Closing an already-closed poll is a no-op.
///
/// Returns `DbError::NotFound` if no row was updated.
#[instrument(skip(pool))]
pub async fn close_poll(pool: &DbPool, poll_id: i64) -> Result<(), DbError> {
    let result = sqlx::query(r#"UPDATE polls SET is_closed = TRUE WHERE id = ?"#)
        .bind(poll_id)
        .execute(pool)
        .await
        .during("close poll")?;

    if result.rows_affected() == 0 {
        return Err(DbError::poll_not_found(poll_id));
    }

    info!(poll_id, "Poll closed");
    Ok(())
}

/// Response counts for every choice of a poll, in choice order.
///
/// Choices nobody picked are reported with a count of zero. An unknown poll
/// is `DbError::NotFound`, same as [`get_poll`].
#[instrument(skip(pool))]
pub async fn get_poll_summaries(pool: &DbPool, poll_id: i64) -> Result<Vec<PollSummary>, DbError> {
    let summaries = sqlx::query_as::<_, PollSummary>(
        r#"
        SELECT question, choice_text, response_count
        FROM poll_summaries
        WHERE poll_id = ?
        ORDER BY choice_id
        "#,
    )
    .bind(poll_id)
    .fetch_all(pool)
    .await
    .during("select poll summaries")?;

    if summaries.is_empty() && !poll_exists(pool, poll_id).await? {
        return Err(DbError::poll_not_found(poll_id));
    }

    debug!(rows = summaries.len(), "Poll summaries loaded");
    Ok(summaries)
}

async fn poll_exists(pool: &DbPool, poll_id: i64) -> Result<bool, DbError> {
    let found = sqlx::query_scalar::<_, i64>(r#"SELECT id FROM polls WHERE id = ?"#)
        .bind(poll_id)
        .fetch_optional(pool)
        .await
        .during("select poll id")?;
    Ok(found.is_some())
}
