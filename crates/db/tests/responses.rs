//! Response repository against an in-memory SQLite store.

mod common;

use common::{count_rows, fresh_pool, seed_poll};
use poll_db::repository::{close_poll, create_response, get_poll_summaries};
use poll_db::DbError;

#[tokio::test]
async fn response_carries_the_given_ids() {
    let pool = fresh_pool().await;
    let poll = seed_poll(&pool, "Ship it?", &["yes", "no"]).await;
    let choice = poll.choices[0].id;

    let response = create_response(&pool, poll.id, choice, 42).await.unwrap();

    assert_eq!(response.poll_id, poll.id);
    assert_eq!(response.choice_id, choice);
    assert_eq!(response.user_id, 42);
    assert_eq!(count_rows(&pool, "responses").await, 1);
}

#[tokio::test]
async fn same_user_may_respond_more_than_once() {
    let pool = fresh_pool().await;
    let poll = seed_poll(&pool, "Again?", &["yes"]).await;
    let choice = poll.choices[0].id;

    create_response(&pool, poll.id, choice, 5).await.unwrap();
    create_response(&pool, poll.id, choice, 5).await.unwrap();

    let summaries = get_poll_summaries(&pool, poll.id).await.unwrap();
    assert_eq!(summaries[0].response_count, 2);
}

#[tokio::test]
async fn choice_from_another_poll_is_a_constraint_violation() {
    let pool = fresh_pool().await;
    let ours = seed_poll(&pool, "Ours?", &["a", "b"]).await;
    let theirs = seed_poll(&pool, "Theirs?", &["c"]).await;

    let err = create_response(&pool, ours.id, theirs.choices[0].id, 1)
        .await
        .unwrap_err();

    assert!(
        matches!(err, DbError::ConstraintViolation { operation: "insert response", .. }),
        "unexpected error: {err:?}"
    );
    assert_eq!(count_rows(&pool, "responses").await, 0);
}

#[tokio::test]
async fn unknown_choice_is_a_constraint_violation() {
    let pool = fresh_pool().await;
    let poll = seed_poll(&pool, "Real poll", &["a"]).await;

    let err = create_response(&pool, poll.id, 9_999, 1).await.unwrap_err();

    assert!(matches!(err, DbError::ConstraintViolation { .. }));
    assert_eq!(count_rows(&pool, "responses").await, 0);
}

#[tokio::test]
async fn unknown_poll_is_a_constraint_violation() {
    let pool = fresh_pool().await;
    let poll = seed_poll(&pool, "Real poll", &["a"]).await;

    let err = create_response(&pool, poll.id + 100, poll.choices[0].id, 1)
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::ConstraintViolation { source: None, .. }));
    assert!(err.to_string().contains("does not exist"));
    assert_eq!(count_rows(&pool, "responses").await, 0);
}

#[tokio::test]
async fn closed_poll_refuses_responses() {
    let pool = fresh_pool().await;
    let poll = seed_poll(&pool, "Closing soon", &["a", "b"]).await;
    let choice = poll.choices[1].id;

    create_response(&pool, poll.id, choice, 1).await.unwrap();
    close_poll(&pool, poll.id).await.unwrap();

    let err = create_response(&pool, poll.id, choice, 2).await.unwrap_err();

    assert!(matches!(err, DbError::PollClosed { poll_id } if poll_id == poll.id));
    assert_eq!(count_rows(&pool, "responses").await, 1);

    // Closing freezes the tally but does not hide it.
    let summaries = get_poll_summaries(&pool, poll.id).await.unwrap();
    assert_eq!(summaries[1].response_count, 1);
}
