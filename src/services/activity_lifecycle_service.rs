use sqlx::SqlitePool;

use crate::database::{activity_repo, participant_repo, profile_repo};
use crate::error::AppError;
use crate::models::{ActivityStatus, ParticipationStatus};
use crate::services::activity_service::{self, load_active_activity, ActivityView};

/// Marks an activity COMPLETED and credits every approved participant
/// (the creator's implicit slot included) with one lifetime activity.
///
/// The status flip is conditional on OPEN/FULL, so repeating the call
/// conflicts instead of crediting participants a second time.
pub async fn complete_activity(
    pool: &SqlitePool,
    activity_id: &str,
    actor_id: &str,
) -> Result<ActivityView, AppError> {
    let activity = load_active_activity(pool, activity_id).await?;
    if activity.creator_id != actor_id {
        return Err(AppError::BadRequest(
            "Only the creator can complete this activity".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;
    let flipped = activity_repo::mark_completed(&mut *tx, activity_id).await?;
    if flipped == 0 {
        return Err(AppError::Conflict(
            "This activity has already been completed or cancelled".to_string(),
        ));
    }

    let approved_user_ids = participant_repo::list_user_ids_for_activity_by_status(
        &mut *tx,
        activity_id,
        ParticipationStatus::Approved.as_str(),
    )
    .await?;
    for user_id in &approved_user_ids {
        // Zero rows means the user has no profile; nothing to credit.
        profile_repo::increment_total_activities(&mut *tx, user_id).await?;
    }
    tx.commit().await?;

    tracing::info!(
        activity_id = %activity_id,
        participants = approved_user_ids.len(),
        "activity completed"
    );

    activity_service::get_activity(pool, activity_id).await
}

/// Soft delete; the cancelled activity disappears from listings and
/// joinability while its participant history stays readable.
pub async fn delete_activity(
    pool: &SqlitePool,
    activity_id: &str,
    actor_id: &str,
) -> Result<(), AppError> {
    let activity = load_active_activity(pool, activity_id).await?;
    if activity.creator_id != actor_id {
        return Err(AppError::BadRequest(
            "Only the creator can delete this activity".to_string(),
        ));
    }
    if activity.status == ActivityStatus::Completed.as_str() {
        return Err(AppError::Conflict(
            "A completed activity cannot be cancelled".to_string(),
        ));
    }

    let deleted = activity_repo::soft_delete(pool, activity_id).await?;
    if deleted == 0 {
        return Err(AppError::not_found("Activity", activity_id));
    }

    tracing::info!(activity_id = %activity_id, "activity deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::test_support::{insert_profile, insert_user, setup_test_db};
    use crate::services::activity_service::CreateActivityRequest;
    use crate::services::participation_service;

    async fn create_activity(pool: &SqlitePool, creator_id: &str) -> String {
        let request = CreateActivityRequest {
            name: "Harbour hike".to_string(),
            category: Some("Hiking".to_string()),
            description: None,
            location: None,
            scheduled_at: None,
            required_skill_level: None,
            min_age: None,
            max_age: None,
            max_participants: None,
            entry_fee: None,
        };
        activity_service::create_activity(pool, creator_id, &request)
            .await
            .unwrap()
            .id
    }

    async fn total_activities(pool: &SqlitePool, user_id: &str) -> i64 {
        crate::database::profile_repo::load_profile(pool, user_id)
            .await
            .unwrap()
            .unwrap()
            .total_activities
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn completion_credits_approved_participants_once() {
        let (pool, _tmp) = setup_test_db().await;
        insert_user(&pool, "creator", "Anna", None).await;
        insert_user(&pool, "bram", "Bram", None).await;
        insert_user(&pool, "cas", "Cas", None).await;
        insert_profile(&pool, "creator", None, None, None, 0.0, 3).await;
        insert_profile(&pool, "bram", None, None, None, 0.0, 0).await;
        // cas has no profile row; the credit is skipped for him.

        let activity_id = create_activity(&pool, "creator").await;
        let bram = participation_service::request_to_join(&pool, &activity_id, "bram")
            .await
            .unwrap();
        let cas = participation_service::request_to_join(&pool, &activity_id, "cas")
            .await
            .unwrap();
        participation_service::approve(&pool, &bram.id, "creator")
            .await
            .unwrap();
        participation_service::reject(&pool, &cas.id, "creator")
            .await
            .unwrap();

        let view = complete_activity(&pool, &activity_id, "creator").await.unwrap();
        assert_eq!(view.status, "COMPLETED");

        assert_eq!(total_activities(&pool, "creator").await, 4);
        assert_eq!(total_activities(&pool, "bram").await, 1);

        // Re-completing conflicts and must not credit anyone again.
        let err = complete_activity(&pool, &activity_id, "creator")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(total_activities(&pool, "creator").await, 4);
        assert_eq!(total_activities(&pool, "bram").await, 1);
    }

    #[tokio::test]
    async fn completion_is_creator_only() {
        let (pool, _tmp) = setup_test_db().await;
        insert_user(&pool, "creator", "Anna", None).await;
        insert_user(&pool, "bram", "Bram", None).await;
        let activity_id = create_activity(&pool, "creator").await;

        let err = complete_activity(&pool, &activity_id, "bram")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn completed_activity_rejects_new_joins() {
        let (pool, _tmp) = setup_test_db().await;
        insert_user(&pool, "creator", "Anna", None).await;
        insert_user(&pool, "bram", "Bram", None).await;
        let activity_id = create_activity(&pool, "creator").await;

        complete_activity(&pool, &activity_id, "creator").await.unwrap();

        let err = participation_service::request_to_join(&pool, &activity_id, "bram")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn delete_hides_activity_but_keeps_history() {
        let (pool, _tmp) = setup_test_db().await;
        insert_user(&pool, "creator", "Anna", None).await;
        insert_user(&pool, "bram", "Bram", None).await;
        let activity_id = create_activity(&pool, "creator").await;
        participation_service::request_to_join(&pool, &activity_id, "bram")
            .await
            .unwrap();

        delete_activity(&pool, &activity_id, "creator").await.unwrap();

        let err = activity_service::get_activity(&pool, &activity_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = complete_activity(&pool, &activity_id, "creator")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let mine = participation_service::get_my_participation(&pool, &activity_id, "bram")
            .await
            .unwrap();
        assert!(mine.is_some());
    }

    #[tokio::test]
    async fn completed_activity_cannot_be_cancelled() {
        let (pool, _tmp) = setup_test_db().await;
        insert_user(&pool, "creator", "Anna", None).await;
        let activity_id = create_activity(&pool, "creator").await;

        complete_activity(&pool, &activity_id, "creator").await.unwrap();

        let err = delete_activity(&pool, &activity_id, "creator")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn delete_is_creator_only() {
        let (pool, _tmp) = setup_test_db().await;
        insert_user(&pool, "creator", "Anna", None).await;
        insert_user(&pool, "bram", "Bram", None).await;
        let activity_id = create_activity(&pool, "creator").await;

        let err = delete_activity(&pool, &activity_id, "bram").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
