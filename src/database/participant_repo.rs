use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::ParticipantRow;

pub const SQL_PARTICIPANT_BASE: &str = r#"
SELECT
  ap.participant_id,
  ap.activity_id,
  ap.user_id,
  ap.status,
  ap.requested_at,
  ap.responded_at,
  u.full_name AS user_name,
  u.photo_url AS user_photo_url,
  p.average_rating AS user_rating
FROM activity_participants ap
LEFT JOIN users u ON u.user_id = ap.user_id
LEFT JOIN user_profiles p ON p.user_id = ap.user_id
"#;

const SQL_INSERT_PARTICIPANT: &str = r#"
INSERT INTO activity_participants (
  participant_id,
  activity_id,
  user_id,
  status,
  requested_at
) VALUES (?, ?, ?, ?, ?)
"#;

pub struct NewParticipant<'a> {
    pub participant_id: &'a str,
    pub activity_id: &'a str,
    pub user_id: &'a str,
    pub status: &'a str,
    pub requested_at: DateTime<Utc>,
}

// A duplicate (activity_id, user_id) pair violates the UNIQUE constraint;
// the caller maps that error, it is not swallowed here.
pub async fn insert<'e>(
    exec: impl Executor<'e, Database = Sqlite>,
    participant: &NewParticipant<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_PARTICIPANT)
        .bind(participant.participant_id)
        .bind(participant.activity_id)
        .bind(participant.user_id)
        .bind(participant.status)
        .bind(participant.requested_at)
        .execute(exec)
        .await?;
    Ok(res.rows_affected())
}

pub async fn load_by_id(
    pool: &SqlitePool,
    participant_id: &str,
) -> sqlx::Result<Option<ParticipantRow>> {
    let sql = format!("{} WHERE ap.participant_id = ?1 LIMIT 1", SQL_PARTICIPANT_BASE);
    sqlx::query_as::<_, ParticipantRow>(&sql)
        .bind(participant_id)
        .fetch_optional(pool)
        .await
}

pub async fn load_for_user(
    pool: &SqlitePool,
    activity_id: &str,
    user_id: &str,
) -> sqlx::Result<Option<ParticipantRow>> {
    let sql = format!(
        "{} WHERE ap.activity_id = ?1 AND ap.user_id = ?2 LIMIT 1",
        SQL_PARTICIPANT_BASE
    );
    sqlx::query_as::<_, ParticipantRow>(&sql)
        .bind(activity_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

const SQL_EXISTS_FOR_USER: &str = r#"
SELECT COUNT(*)
FROM activity_participants
WHERE activity_id = ?1
  AND user_id = ?2
"#;

pub async fn exists_for_user(
    pool: &SqlitePool,
    activity_id: &str,
    user_id: &str,
) -> sqlx::Result<bool> {
    let count: i64 = sqlx::query_scalar(SQL_EXISTS_FOR_USER)
        .bind(activity_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn list_for_activity_by_status(
    pool: &SqlitePool,
    activity_id: &str,
    status: &str,
) -> sqlx::Result<Vec<ParticipantRow>> {
    let sql = format!(
        "{} WHERE ap.activity_id = ?1 AND ap.status = ?2 ORDER BY ap.requested_at ASC",
        SQL_PARTICIPANT_BASE
    );
    sqlx::query_as::<_, ParticipantRow>(&sql)
        .bind(activity_id)
        .bind(status)
        .fetch_all(pool)
        .await
}

const SQL_LIST_USER_IDS_BY_STATUS: &str = r#"
SELECT user_id
FROM activity_participants
WHERE activity_id = ?1
  AND status = ?2
ORDER BY requested_at ASC
"#;

pub async fn list_user_ids_for_activity_by_status<'e>(
    exec: impl Executor<'e, Database = Sqlite>,
    activity_id: &str,
    status: &str,
) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar(SQL_LIST_USER_IDS_BY_STATUS)
        .bind(activity_id)
        .bind(status)
        .fetch_all(exec)
        .await
}

// (activity, category) pairs of a user's participations, for seeding
// preferred categories from history.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ParticipationActivityRef {
    pub activity_id: String,
    pub category: Option<String>,
}

const SQL_LIST_JOINED_ACTIVITY_REFS: &str = r#"
SELECT
  a.activity_id,
  a.category
FROM activity_participants ap
INNER JOIN activities a ON a.activity_id = ap.activity_id
WHERE ap.user_id = ?1
  AND ap.status = ?2
"#;

pub async fn list_joined_activity_refs(
    pool: &SqlitePool,
    user_id: &str,
    status: &str,
) -> sqlx::Result<Vec<ParticipationActivityRef>> {
    sqlx::query_as::<_, ParticipationActivityRef>(SQL_LIST_JOINED_ACTIVITY_REFS)
        .bind(user_id)
        .bind(status)
        .fetch_all(pool)
        .await
}

const SQL_LIST_ACTIVITY_IDS_FOR_USER: &str = r#"
SELECT activity_id
FROM activity_participants
WHERE user_id = ?1
"#;

pub async fn list_activity_ids_for_user(
    pool: &SqlitePool,
    user_id: &str,
) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar(SQL_LIST_ACTIVITY_IDS_FOR_USER)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

// PENDING is the only state this update fires from; approving or
// rejecting an already-processed request touches zero rows.
const SQL_MARK_RESPONDED: &str = r#"
UPDATE activity_participants
SET status = ?2,
    responded_at = ?3
WHERE participant_id = ?1
  AND status = 'PENDING'
"#;

pub async fn mark_responded<'e>(
    exec: impl Executor<'e, Database = Sqlite>,
    participant_id: &str,
    status: &str,
    responded_at: DateTime<Utc>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_MARK_RESPONDED)
        .bind(participant_id)
        .bind(status)
        .bind(responded_at)
        .execute(exec)
        .await?;
    Ok(res.rows_affected())
}
