//! Entities handed to callers, and the rows they are assembled from.
//!
//! `Poll` owns its `Choice`s; a `Response` only references them by id.
//! `PollSummary` is a read-only projection of the `poll_summaries` view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::DbError;

// ---------------------------------------------------------------------------
// polls
// ---------------------------------------------------------------------------

/// A persisted poll row, without its choices.
#[derive(Debug, Clone, FromRow)]
pub struct PollRow {
    pub id: i64,
    pub user_id: i64,
    pub question: String,
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
}

/// A poll together with its choices in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: i64,
    pub user_id: i64,
    pub question: String,
    pub choices: Vec<Choice>,
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
}

impl Poll {
    pub(crate) fn from_row(row: PollRow, choices: Vec<Choice>) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            question: row.question,
            choices,
            is_closed: row.is_closed,
            created_at: row.created_at,
        }
    }

    /// Choice texts in display order.
    pub fn choice_texts(&self) -> Vec<&str> {
        self.choices.iter().map(|c| c.text.as_str()).collect()
    }
}

/// Input for [`crate::repository::polls::create_poll`].
#[derive(Debug, Clone)]
pub struct NewPoll {
    pub user_id: i64,
    pub question: String,
    pub choices: Vec<String>,
}

impl NewPoll {
    pub fn new<I, S>(user_id: i64, question: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user_id,
            question: question.into(),
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    /// Reject input that would produce a poll without a question or choices.
    pub fn validate(&self) -> Result<(), DbError> {
        if self.user_id <= 0 {
            return Err(DbError::InvalidInput(format!(
                "user id must be positive, got {}",
                self.user_id
            )));
        }
        if self.question.trim().is_empty() {
            return Err(DbError::InvalidInput("question is empty".into()));
        }
        if self.choices.is_empty() {
            return Err(DbError::InvalidInput("poll needs at least one choice".into()));
        }
        if let Some(index) = self.choices.iter().position(|c| c.trim().is_empty()) {
            return Err(DbError::InvalidInput(format!("choice {index} is empty")));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// choices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Choice {
    pub id: i64,
    pub poll_id: i64,
    #[sqlx(rename = "choice_text")]
    pub text: String,
}

// ---------------------------------------------------------------------------
// responses
// ---------------------------------------------------------------------------

/// One recorded vote. The row's own id is not exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub poll_id: i64,
    pub choice_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// poll_summaries (view)
// ---------------------------------------------------------------------------

/// Response count for one choice of a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PollSummary {
    pub question: String,
    pub choice_text: String,
    pub response_count: i64,
}
