use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{activity_repo, participant_repo, user_repo};
use crate::error::AppError;
use crate::models::{ActivityStatus, ParticipantRow, ParticipationStatus};
use crate::services::activity_service::load_active_activity;

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantView {
    pub id: String,
    pub activity_id: String,
    pub user_id: String,
    pub user_name: Option<String>,
    pub user_photo_url: Option<String>,
    pub user_rating: f64,
    pub status: String,
    pub requested_at: DateTime<Utc>,
}

pub fn build_view(row: ParticipantRow) -> ParticipantView {
    ParticipantView {
        id: row.participant_id,
        activity_id: row.activity_id,
        user_id: row.user_id,
        user_name: row.user_name,
        user_photo_url: row.user_photo_url,
        user_rating: row.user_rating.unwrap_or(0.0),
        status: row.status,
        requested_at: row.requested_at,
    }
}

async fn load_participant_view(
    pool: &SqlitePool,
    participant_id: &str,
) -> Result<ParticipantView, AppError> {
    let row = participant_repo::load_by_id(pool, participant_id)
        .await?
        .ok_or_else(|| AppError::not_found("Participant", participant_id))?;
    Ok(build_view(row))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

pub async fn request_to_join(
    pool: &SqlitePool,
    activity_id: &str,
    requester_id: &str,
) -> Result<ParticipantView, AppError> {
    let activity = load_active_activity(pool, activity_id).await?;

    if activity.status != ActivityStatus::Open.as_str() {
        return Err(AppError::BadRequest(
            "This activity is not open for joining".to_string(),
        ));
    }
    if activity.creator_id == requester_id {
        return Err(AppError::BadRequest(
            "You are already the creator of this activity".to_string(),
        ));
    }
    if participant_repo::exists_for_user(pool, activity_id, requester_id).await? {
        return Err(AppError::BadRequest(
            "You have already requested to join this activity".to_string(),
        ));
    }

    let requester = user_repo::load_user(pool, requester_id)
        .await?
        .ok_or_else(|| AppError::not_found("User", requester_id))?;
    if let Some(age) = requester.age {
        if let Some(min_age) = activity.min_age {
            if age < min_age {
                return Err(AppError::BadRequest(
                    "You do not meet the minimum age requirement".to_string(),
                ));
            }
        }
        if let Some(max_age) = activity.max_age {
            if age > max_age {
                return Err(AppError::BadRequest(
                    "You exceed the maximum age limit".to_string(),
                ));
            }
        }
    }

    if let Some(max_participants) = activity.max_participants {
        if activity.current_participants >= max_participants {
            return Err(AppError::BadRequest(
                "This activity has reached maximum capacity".to_string(),
            ));
        }
    }

    let participant_id = Uuid::new_v4().to_string();
    let insert_result = participant_repo::insert(
        pool,
        &participant_repo::NewParticipant {
            participant_id: &participant_id,
            activity_id,
            user_id: requester_id,
            status: ParticipationStatus::Pending.as_str(),
            requested_at: Utc::now(),
        },
    )
    .await;

    // The existence check above raced a concurrent join; the UNIQUE
    // constraint on (activity_id, user_id) is the authoritative gate.
    if let Err(e) = insert_result {
        if is_unique_violation(&e) {
            return Err(AppError::BadRequest(
                "You have already requested to join this activity".to_string(),
            ));
        }
        return Err(e.into());
    }

    load_participant_view(pool, &participant_id).await
}

pub async fn approve(
    pool: &SqlitePool,
    participant_id: &str,
    actor_id: &str,
) -> Result<ParticipantView, AppError> {
    respond(pool, participant_id, actor_id, ParticipationStatus::Approved).await
}

pub async fn reject(
    pool: &SqlitePool,
    participant_id: &str,
    actor_id: &str,
) -> Result<ParticipantView, AppError> {
    respond(pool, participant_id, actor_id, ParticipationStatus::Rejected).await
}

async fn respond(
    pool: &SqlitePool,
    participant_id: &str,
    actor_id: &str,
    decision: ParticipationStatus,
) -> Result<ParticipantView, AppError> {
    let participant = participant_repo::load_by_id(pool, participant_id)
        .await?
        .ok_or_else(|| AppError::not_found("Participant", participant_id))?;

    let activity = load_active_activity(pool, &participant.activity_id).await?;

    if activity.creator_id != actor_id {
        let action = match decision {
            ParticipationStatus::Approved => "approve",
            _ => "reject",
        };
        return Err(AppError::BadRequest(format!(
            "Only the creator can {} requests",
            action
        )));
    }
    if participant.status != ParticipationStatus::Pending.as_str() {
        return Err(AppError::Conflict(
            "This request has already been processed".to_string(),
        ));
    }
    if decision == ParticipationStatus::Approved {
        if let Some(max_participants) = activity.max_participants {
            if activity.current_participants >= max_participants {
                return Err(AppError::BadRequest(
                    "Activity has reached maximum capacity".to_string(),
                ));
            }
        }
    }

    // Both conditional updates commit as a unit: the participant claim
    // serializes competing approve/reject calls on this request, the slot
    // claim serializes competing approvals on this activity's capacity.
    let mut tx = pool.begin().await?;
    let claimed =
        participant_repo::mark_responded(&mut *tx, participant_id, decision.as_str(), Utc::now())
            .await?;
    if claimed == 0 {
        tracing::warn!(participant_id = %participant_id, "request already processed");
        return Err(AppError::Conflict(
            "This request has already been processed".to_string(),
        ));
    }
    if decision == ParticipationStatus::Approved {
        let slot = activity_repo::claim_capacity_slot(&mut *tx, &participant.activity_id).await?;
        if slot == 0 {
            tracing::warn!(
                activity_id = %participant.activity_id,
                "approval lost the last capacity slot"
            );
            return Err(AppError::BadRequest(
                "Activity has reached maximum capacity".to_string(),
            ));
        }
    }
    tx.commit().await?;

    load_participant_view(pool, participant_id).await
}

pub async fn get_pending_requests(
    pool: &SqlitePool,
    activity_id: &str,
    actor_id: &str,
) -> Result<Vec<ParticipantView>, AppError> {
    let activity = load_active_activity(pool, activity_id).await?;
    if activity.creator_id != actor_id {
        return Err(AppError::BadRequest(
            "Only the creator can view pending requests".to_string(),
        ));
    }

    let rows = participant_repo::list_for_activity_by_status(
        pool,
        activity_id,
        ParticipationStatus::Pending.as_str(),
    )
    .await?;
    Ok(rows.into_iter().map(build_view).collect())
}

pub async fn get_approved_participants(
    pool: &SqlitePool,
    activity_id: &str,
) -> Result<Vec<ParticipantView>, AppError> {
    let rows = participant_repo::list_for_activity_by_status(
        pool,
        activity_id,
        ParticipationStatus::Approved.as_str(),
    )
    .await?;
    Ok(rows.into_iter().map(build_view).collect())
}

/// Participation history stays readable even for deleted activities.
pub async fn get_my_participation(
    pool: &SqlitePool,
    activity_id: &str,
    user_id: &str,
) -> Result<Option<ParticipantView>, AppError> {
    let row = participant_repo::load_for_user(pool, activity_id, user_id).await?;
    Ok(row.map(build_view))
}

/// Authorization gate for chat and feedback collaborators.
pub async fn is_approved_participant(
    pool: &SqlitePool,
    activity_id: &str,
    user_id: &str,
) -> Result<bool, AppError> {
    let row = participant_repo::load_for_user(pool, activity_id, user_id).await?;
    Ok(row
        .map(|p| p.status == ParticipationStatus::Approved.as_str())
        .unwrap_or(false))
}
