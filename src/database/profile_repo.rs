use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::UserProfilesRow;

pub const SQL_LOAD_PROFILE: &str = r#"
SELECT
  user_id,
  skill_level,
  location,
  interests,
  average_rating,
  total_activities
FROM user_profiles
WHERE user_id = ?1
LIMIT 1
"#;

pub async fn load_profile(
    pool: &SqlitePool,
    user_id: &str,
) -> sqlx::Result<Option<UserProfilesRow>> {
    sqlx::query_as::<_, UserProfilesRow>(SQL_LOAD_PROFILE)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

// Lifetime activity counter, bumped once per completed activity. Users
// without a profile row are skipped, matching zero affected rows.
const SQL_INCREMENT_TOTAL_ACTIVITIES: &str = r#"
UPDATE user_profiles
SET total_activities = COALESCE(total_activities, 0) + 1
WHERE user_id = ?1
"#;

pub async fn increment_total_activities<'e>(
    exec: impl Executor<'e, Database = Sqlite>,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INCREMENT_TOTAL_ACTIVITIES)
        .bind(user_id)
        .execute(exec)
        .await?;
    Ok(res.rows_affected())
}
