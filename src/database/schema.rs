use sqlx::SqlitePool;

const SQL_CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
  user_id TEXT PRIMARY KEY,
  full_name TEXT,
  photo_url TEXT,
  age INTEGER
)
"#;

const SQL_CREATE_USER_PROFILES: &str = r#"
CREATE TABLE IF NOT EXISTS user_profiles (
  user_id TEXT PRIMARY KEY,
  skill_level TEXT,
  location TEXT,
  interests TEXT,
  average_rating REAL DEFAULT 0.0,
  total_activities INTEGER DEFAULT 0
)
"#;

const SQL_CREATE_ACTIVITIES: &str = r#"
CREATE TABLE IF NOT EXISTS activities (
  activity_id TEXT PRIMARY KEY,
  name TEXT NOT NULL,
  category TEXT,
  description TEXT,
  location TEXT,
  scheduled_at TEXT,
  required_skill_level TEXT,
  min_age INTEGER,
  max_age INTEGER,
  max_participants INTEGER,
  current_participants INTEGER NOT NULL DEFAULT 1,
  entry_fee REAL,
  status TEXT NOT NULL DEFAULT 'OPEN',
  creator_id TEXT NOT NULL,
  is_deleted INTEGER NOT NULL DEFAULT 0,
  created_at TEXT NOT NULL
)
"#;

// UNIQUE(activity_id, user_id) closes the duplicate-join race at the
// storage layer; the service-level existence check only exists for the
// friendlier error message.
const SQL_CREATE_ACTIVITY_PARTICIPANTS: &str = r#"
CREATE TABLE IF NOT EXISTS activity_participants (
  participant_id TEXT PRIMARY KEY,
  activity_id TEXT NOT NULL,
  user_id TEXT NOT NULL,
  status TEXT NOT NULL DEFAULT 'PENDING',
  requested_at TEXT NOT NULL,
  responded_at TEXT,
  UNIQUE(activity_id, user_id)
)
"#;

const SQL_CREATE_PARTICIPANTS_BY_USER_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_activity_participants_user
ON activity_participants (user_id, status)
"#;

pub async fn ensure_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    for sql in [
        SQL_CREATE_USERS,
        SQL_CREATE_USER_PROFILES,
        SQL_CREATE_ACTIVITIES,
        SQL_CREATE_ACTIVITY_PARTICIPANTS,
        SQL_CREATE_PARTICIPANTS_BY_USER_INDEX,
    ] {
        sqlx::query(sql).execute(pool).await?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;
    use tempfile::TempDir;

    pub async fn setup_test_db() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .unwrap();

        super::ensure_schema(&pool).await.unwrap();

        (pool, temp_dir)
    }

    pub async fn insert_user(pool: &SqlitePool, user_id: &str, name: &str, age: Option<i64>) {
        sqlx::query("INSERT INTO users (user_id, full_name, photo_url, age) VALUES (?, ?, NULL, ?)")
            .bind(user_id)
            .bind(name)
            .bind(age)
            .execute(pool)
            .await
            .unwrap();
    }

    pub async fn insert_profile(
        pool: &SqlitePool,
        user_id: &str,
        skill_level: Option<&str>,
        location: Option<&str>,
        interests: Option<&str>,
        average_rating: f64,
        total_activities: i64,
    ) {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (
              user_id, skill_level, location, interests, average_rating, total_activities
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(skill_level)
        .bind(location)
        .bind(interests)
        .bind(average_rating)
        .bind(total_activities)
        .execute(pool)
        .await
        .unwrap();
    }
}
