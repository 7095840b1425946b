use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{activity_repo, participant_repo};
use crate::error::AppError;
use crate::models::{ActivityRow, ActivityStatus, ParticipationStatus, SkillLevel};

pub const PREDEFINED_CATEGORIES: [&str; 10] = [
    "Playing Cricket",
    "Watching Movie",
    "Football",
    "Gym",
    "Study Group",
    "Coffee Meetups",
    "Basketball",
    "Tennis",
    "Hiking",
    "Board Games",
];

#[derive(Debug, Deserialize)]
pub struct CreateActivityRequest {
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub required_skill_level: Option<String>,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    pub max_participants: Option<i64>,
    pub entry_fee: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateActivityRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub required_skill_level: Option<String>,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    pub max_participants: Option<i64>,
    pub entry_fee: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityView {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub required_skill_level: Option<String>,
    pub min_age: Option<i64>,
    pub max_age: Option<i64>,
    pub max_participants: Option<i64>,
    pub current_participants: i64,
    pub entry_fee: Option<f64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub creator_id: String,
    pub creator_name: Option<String>,
    pub creator_photo_url: Option<String>,
    pub creator_rating: f64,
}

pub fn build_view(row: ActivityRow) -> ActivityView {
    ActivityView {
        id: row.activity_id,
        name: row.name,
        category: row.category,
        description: row.description,
        location: row.location,
        scheduled_at: row.scheduled_at,
        required_skill_level: row.required_skill_level,
        min_age: row.min_age,
        max_age: row.max_age,
        max_participants: row.max_participants,
        current_participants: row.current_participants,
        entry_fee: row.entry_fee,
        status: row.status,
        created_at: row.created_at,
        creator_id: row.creator_id,
        creator_name: row.creator_name,
        creator_photo_url: row.creator_photo_url,
        creator_rating: row.creator_rating.unwrap_or(0.0),
    }
}

/// Loads an activity, treating soft-deleted rows as absent.
pub(crate) async fn load_active_activity(
    pool: &SqlitePool,
    activity_id: &str,
) -> Result<ActivityRow, AppError> {
    let row = activity_repo::load_by_id(pool, activity_id)
        .await?
        .ok_or_else(|| AppError::not_found("Activity", activity_id))?;
    if row.is_deleted != 0 {
        return Err(AppError::not_found("Activity", activity_id));
    }
    Ok(row)
}

fn validate_skill_level(input: Option<&str>) -> Result<(), AppError> {
    if let Some(skill) = input {
        if SkillLevel::parse(skill).is_none() {
            return Err(AppError::BadRequest(format!(
                "Unknown skill level: {}",
                skill
            )));
        }
    }
    Ok(())
}

pub async fn create_activity(
    pool: &SqlitePool,
    creator_id: &str,
    request: &CreateActivityRequest,
) -> Result<ActivityView, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("Activity name is required".to_string()));
    }
    validate_skill_level(request.required_skill_level.as_deref())?;

    let activity_id = Uuid::new_v4().to_string();
    let now = Utc::now();

    // Activity row and the creator's implicit approved slot commit together.
    let mut tx = pool.begin().await?;
    activity_repo::insert(
        &mut *tx,
        &activity_repo::NewActivity {
            activity_id: &activity_id,
            name: request.name.trim(),
            category: request.category.as_deref(),
            description: request.description.as_deref(),
            location: request.location.as_deref(),
            scheduled_at: request.scheduled_at,
            required_skill_level: request.required_skill_level.as_deref(),
            min_age: request.min_age,
            max_age: request.max_age,
            max_participants: request.max_participants,
            entry_fee: request.entry_fee,
            creator_id,
            created_at: now,
        },
    )
    .await?;

    let participant_id = Uuid::new_v4().to_string();
    participant_repo::insert(
        &mut *tx,
        &participant_repo::NewParticipant {
            participant_id: &participant_id,
            activity_id: &activity_id,
            user_id: creator_id,
            status: ParticipationStatus::Approved.as_str(),
            requested_at: now,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(activity_id = %activity_id, creator_id = %creator_id, "activity created");

    get_activity(pool, &activity_id).await
}

pub async fn get_activity(pool: &SqlitePool, activity_id: &str) -> Result<ActivityView, AppError> {
    let row = load_active_activity(pool, activity_id).await?;
    Ok(build_view(row))
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivitiesQuery {
    pub category: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_activities(
    pool: &SqlitePool,
    query: &ActivitiesQuery,
) -> Result<Vec<ActivityView>, AppError> {
    if let Some(status) = query.status.as_deref() {
        if ActivityStatus::parse(status).is_none() {
            return Err(AppError::BadRequest(format!(
                "Unknown activity status: {}",
                status
            )));
        }
    }

    let filter = activity_repo::ActivityListFilter {
        category: query.category.as_deref(),
        location: query.location.as_deref(),
        status: query.status.as_deref(),
        limit: query.limit.unwrap_or(20).clamp(1, 100),
        offset: query.offset.unwrap_or(0).max(0),
    };

    let rows = activity_repo::list(pool, &filter).await?;
    Ok(rows.into_iter().map(build_view).collect())
}

pub async fn update_activity(
    pool: &SqlitePool,
    activity_id: &str,
    actor_id: &str,
    request: &UpdateActivityRequest,
) -> Result<ActivityView, AppError> {
    let activity = load_active_activity(pool, activity_id).await?;
    if activity.creator_id != actor_id {
        return Err(AppError::BadRequest(
            "Only the creator can update this activity".to_string(),
        ));
    }
    validate_skill_level(request.required_skill_level.as_deref())?;

    activity_repo::update_fields(
        pool,
        activity_id,
        &activity_repo::ActivityChanges {
            name: request.name.as_deref(),
            category: request.category.as_deref(),
            description: request.description.as_deref(),
            location: request.location.as_deref(),
            scheduled_at: request.scheduled_at,
            required_skill_level: request.required_skill_level.as_deref(),
            min_age: request.min_age,
            max_age: request.max_age,
            max_participants: request.max_participants,
            entry_fee: request.entry_fee,
        },
    )
    .await?;

    get_activity(pool, activity_id).await
}

pub async fn get_my_created_activities(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<ActivityView>, AppError> {
    let rows = activity_repo::list_by_creator(pool, user_id).await?;
    Ok(rows.into_iter().map(build_view).collect())
}

pub async fn get_my_joined_activities(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<ActivityView>, AppError> {
    let rows = activity_repo::list_joined_by_user(pool, user_id).await?;
    Ok(rows.into_iter().map(build_view).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::test_support::{insert_user, setup_test_db};

    fn new_activity_request(name: &str) -> CreateActivityRequest {
        CreateActivityRequest {
            name: name.to_string(),
            category: Some("Football".to_string()),
            description: None,
            location: Some("Rotterdam".to_string()),
            scheduled_at: None,
            required_skill_level: None,
            min_age: None,
            max_age: None,
            max_participants: Some(4),
            entry_fee: None,
        }
    }

    #[tokio::test]
    async fn create_activity_seeds_creator_slot() {
        let (pool, _tmp) = setup_test_db().await;
        insert_user(&pool, "u1", "Anna", Some(30)).await;

        let view = create_activity(&pool, "u1", &new_activity_request("Friday five-a-side"))
            .await
            .unwrap();

        assert_eq!(view.status, "OPEN");
        assert_eq!(view.current_participants, 1);
        assert_eq!(view.creator_id, "u1");
        assert_eq!(view.creator_name.as_deref(), Some("Anna"));

        let creator = participant_repo::load_for_user(&pool, &view.id, "u1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creator.status, "APPROVED");
        assert!(creator.responded_at.is_none());
    }

    #[tokio::test]
    async fn create_activity_rejects_unknown_skill_level() {
        let (pool, _tmp) = setup_test_db().await;
        insert_user(&pool, "u1", "Anna", None).await;

        let mut request = new_activity_request("Padel");
        request.required_skill_level = Some("WIZARD".to_string());

        let err = create_activity(&pool, "u1", &request).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn update_activity_is_creator_only() {
        let (pool, _tmp) = setup_test_db().await;
        insert_user(&pool, "u1", "Anna", None).await;
        insert_user(&pool, "u2", "Bram", None).await;

        let view = create_activity(&pool, "u1", &new_activity_request("Chess night"))
            .await
            .unwrap();

        let request = UpdateActivityRequest {
            name: Some("Chess evening".to_string()),
            ..Default::default()
        };

        let err = update_activity(&pool, &view.id, "u2", &request)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let updated = update_activity(&pool, &view.id, "u1", &request).await.unwrap();
        assert_eq!(updated.name, "Chess evening");
        assert_eq!(updated.category.as_deref(), Some("Football"));
    }

    #[tokio::test]
    async fn list_activities_filters_by_category() {
        let (pool, _tmp) = setup_test_db().await;
        insert_user(&pool, "u1", "Anna", None).await;

        create_activity(&pool, "u1", &new_activity_request("Friday five-a-side"))
            .await
            .unwrap();
        let mut other = new_activity_request("Chess night");
        other.category = Some("Board Games".to_string());
        create_activity(&pool, "u1", &other).await.unwrap();

        let query = ActivitiesQuery {
            category: Some("Board Games".to_string()),
            ..Default::default()
        };
        let views = list_activities(&pool, &query).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].name, "Chess night");
    }

    #[tokio::test]
    async fn list_activities_rejects_unknown_status() {
        let (pool, _tmp) = setup_test_db().await;

        let query = ActivitiesQuery {
            status: Some("ARCHIVED".to_string()),
            ..Default::default()
        };
        let err = list_activities(&pool, &query).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
