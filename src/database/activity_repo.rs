use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteArguments, Arguments, Executor, Sqlite, SqlitePool};

use crate::models::ActivityRow;

pub const SQL_ACTIVITY_BASE: &str = r#"
SELECT
  a.activity_id,
  a.name,
  a.category,
  a.description,
  a.location,
  a.scheduled_at,
  a.required_skill_level,
  a.min_age,
  a.max_age,
  a.max_participants,
  a.current_participants,
  a.entry_fee,
  a.status,
  a.creator_id,
  a.is_deleted,
  a.created_at,
  u.full_name AS creator_name,
  u.photo_url AS creator_photo_url,
  p.average_rating AS creator_rating
FROM activities a
LEFT JOIN users u ON u.user_id = a.creator_id
LEFT JOIN user_profiles p ON p.user_id = a.creator_id
"#;

pub async fn load_by_id(pool: &SqlitePool, activity_id: &str) -> sqlx::Result<Option<ActivityRow>> {
    let sql = format!("{} WHERE a.activity_id = ?1 LIMIT 1", SQL_ACTIVITY_BASE);
    sqlx::query_as::<_, ActivityRow>(&sql)
        .bind(activity_id)
        .fetch_optional(pool)
        .await
}

const SQL_INSERT_ACTIVITY: &str = r#"
INSERT INTO activities (
  activity_id,
  name,
  category,
  description,
  location,
  scheduled_at,
  required_skill_level,
  min_age,
  max_age,
  max_participants,
  entry_fee,
  status,
  creator_id,
  is_deleted,
  created_at
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'OPEN', ?, 0, ?)
"#;

pub struct NewActivity<'a> {
    pub activity_id: &'a str,
    pub name: &'a str,
    pub category: Option<&'a str>,
    pub description: Option<&'a str>,
    pub location: Option<&'a str>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub required_skill_level: Option<&'a str>,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    pub max_participants: Option<i64>,
    pub entry_fee: Option<f64>,
    pub creator_id: &'a str,
    pub created_at: DateTime<Utc>,
}

// The creator occupies the first slot, so current_participants starts at
// the schema default of 1.
pub async fn insert<'e>(
    exec: impl Executor<'e, Database = Sqlite>,
    activity: &NewActivity<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_ACTIVITY)
        .bind(activity.activity_id)
        .bind(activity.name)
        .bind(activity.category)
        .bind(activity.description)
        .bind(activity.location)
        .bind(activity.scheduled_at)
        .bind(activity.required_skill_level)
        .bind(activity.min_age)
        .bind(activity.max_age)
        .bind(activity.max_participants)
        .bind(activity.entry_fee)
        .bind(activity.creator_id)
        .bind(activity.created_at)
        .execute(exec)
        .await?;
    Ok(res.rows_affected())
}

#[derive(Default)]
pub struct ActivityChanges<'a> {
    pub name: Option<&'a str>,
    pub category: Option<&'a str>,
    pub description: Option<&'a str>,
    pub location: Option<&'a str>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub required_skill_level: Option<&'a str>,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    pub max_participants: Option<i64>,
    pub entry_fee: Option<f64>,
}

pub async fn update_fields(
    pool: &SqlitePool,
    activity_id: &str,
    changes: &ActivityChanges<'_>,
) -> sqlx::Result<u64> {
    let mut sets: Vec<&str> = Vec::new();
    let mut args = SqliteArguments::default();

    if let Some(name) = changes.name {
        sets.push("name = ?");
        args.add(name);
    }
    if let Some(category) = changes.category {
        sets.push("category = ?");
        args.add(category);
    }
    if let Some(description) = changes.description {
        sets.push("description = ?");
        args.add(description);
    }
    if let Some(location) = changes.location {
        sets.push("location = ?");
        args.add(location);
    }
    if let Some(scheduled_at) = changes.scheduled_at {
        sets.push("scheduled_at = ?");
        args.add(scheduled_at);
    }
    if let Some(skill) = changes.required_skill_level {
        sets.push("required_skill_level = ?");
        args.add(skill);
    }
    if let Some(min_age) = changes.min_age {
        sets.push("min_age = ?");
        args.add(min_age);
    }
    if let Some(max_age) = changes.max_age {
        sets.push("max_age = ?");
        args.add(max_age);
    }
    if let Some(max_participants) = changes.max_participants {
        sets.push("max_participants = ?");
        args.add(max_participants);
    }
    if let Some(entry_fee) = changes.entry_fee {
        sets.push("entry_fee = ?");
        args.add(entry_fee);
    }

    if sets.is_empty() {
        return Ok(0);
    }

    let sql = format!(
        "UPDATE activities SET {} WHERE activity_id = ? AND is_deleted = 0",
        sets.join(", ")
    );
    args.add(activity_id);

    let res = sqlx::query_with(&sql, args).execute(pool).await?;
    Ok(res.rows_affected())
}

pub struct ActivityListFilter<'a> {
    pub category: Option<&'a str>,
    pub location: Option<&'a str>,
    pub status: Option<&'a str>,
    pub limit: i64,
    pub offset: i64,
}

pub async fn list(
    pool: &SqlitePool,
    filter: &ActivityListFilter<'_>,
) -> sqlx::Result<Vec<ActivityRow>> {
    let mut sql = String::from(SQL_ACTIVITY_BASE);
    sql.push_str(" WHERE a.is_deleted = 0");
    let mut args = SqliteArguments::default();

    if let Some(category) = filter.category {
        sql.push_str(" AND a.category = ?");
        args.add(category);
    }
    if let Some(location) = filter.location {
        sql.push_str(" AND a.location LIKE '%' || ? || '%'");
        args.add(location);
    }
    if let Some(status) = filter.status {
        sql.push_str(" AND a.status = ?");
        args.add(status);
    }

    sql.push_str(" ORDER BY a.created_at DESC LIMIT ? OFFSET ?");
    args.add(filter.limit);
    args.add(filter.offset);

    sqlx::query_as_with::<_, ActivityRow, _>(&sql, args)
        .fetch_all(pool)
        .await
}

pub async fn list_by_creator(pool: &SqlitePool, creator_id: &str) -> sqlx::Result<Vec<ActivityRow>> {
    let sql = format!(
        "{} WHERE a.creator_id = ?1 AND a.is_deleted = 0 ORDER BY a.created_at DESC",
        SQL_ACTIVITY_BASE
    );
    sqlx::query_as::<_, ActivityRow>(&sql)
        .bind(creator_id)
        .fetch_all(pool)
        .await
}

pub async fn list_joined_by_user(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Vec<ActivityRow>> {
    let sql = format!(
        r#"{}
INNER JOIN activity_participants ap ON ap.activity_id = a.activity_id
WHERE ap.user_id = ?1
  AND ap.status = 'APPROVED'
  AND a.is_deleted = 0
ORDER BY a.created_at DESC"#,
        SQL_ACTIVITY_BASE
    );
    sqlx::query_as::<_, ActivityRow>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn list_open_by_categories(
    pool: &SqlitePool,
    categories: &[String],
) -> sqlx::Result<Vec<ActivityRow>> {
    if categories.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; categories.len()].join(", ");
    let sql = format!(
        "{} WHERE a.is_deleted = 0 AND a.status = 'OPEN' AND a.category IN ({}) ORDER BY a.created_at DESC",
        SQL_ACTIVITY_BASE, placeholders
    );

    let mut args = SqliteArguments::default();
    for category in categories {
        args.add(category.as_str());
    }

    sqlx::query_as_with::<_, ActivityRow, _>(&sql, args)
        .fetch_all(pool)
        .await
}

pub async fn list_recent_open(pool: &SqlitePool, limit: i64) -> sqlx::Result<Vec<ActivityRow>> {
    let sql = format!(
        "{} WHERE a.is_deleted = 0 AND a.status = 'OPEN' ORDER BY a.created_at DESC LIMIT ?1",
        SQL_ACTIVITY_BASE
    );
    sqlx::query_as::<_, ActivityRow>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await
}

// Counter increment and the FULL flip in one conditional statement. The
// WHERE clause is the capacity gate: with the slot already consumed the
// update touches zero rows and the caller must treat the approval as lost.
const SQL_CLAIM_CAPACITY_SLOT: &str = r#"
UPDATE activities
SET current_participants = current_participants + 1,
    status = CASE
      WHEN max_participants IS NOT NULL
       AND current_participants + 1 >= max_participants
      THEN 'FULL'
      ELSE status
    END
WHERE activity_id = ?1
  AND is_deleted = 0
  AND (max_participants IS NULL OR current_participants < max_participants)
"#;

pub async fn claim_capacity_slot<'e>(
    exec: impl Executor<'e, Database = Sqlite>,
    activity_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_CLAIM_CAPACITY_SLOT)
        .bind(activity_id)
        .execute(exec)
        .await?;
    Ok(res.rows_affected())
}

// Completion is only reachable from OPEN or FULL so the participant
// side effect cannot run twice for the same activity.
const SQL_MARK_COMPLETED: &str = r#"
UPDATE activities
SET status = 'COMPLETED'
WHERE activity_id = ?1
  AND is_deleted = 0
  AND status IN ('OPEN', 'FULL')
"#;

pub async fn mark_completed<'e>(
    exec: impl Executor<'e, Database = Sqlite>,
    activity_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_MARK_COMPLETED)
        .bind(activity_id)
        .execute(exec)
        .await?;
    Ok(res.rows_affected())
}

const SQL_SOFT_DELETE: &str = r#"
UPDATE activities
SET is_deleted = 1
WHERE activity_id = ?1
  AND is_deleted = 0
"#;

pub async fn soft_delete(pool: &SqlitePool, activity_id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SOFT_DELETE)
        .bind(activity_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
