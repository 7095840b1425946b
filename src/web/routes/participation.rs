use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::services::participation_service::{self, ParticipantView};
use crate::web::middleware::auth::AuthenticatedUser;

pub async fn join_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<Json<ParticipantView>, AppError> {
    participation_service::request_to_join(&pool, &activity_id, &auth_user.id)
        .await
        .map(Json)
}

pub async fn pending_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<ParticipantView>>, AppError> {
    participation_service::get_pending_requests(&pool, &activity_id, &auth_user.id)
        .await
        .map(Json)
}

pub async fn approved_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<ParticipantView>>, AppError> {
    participation_service::get_approved_participants(&pool, &activity_id)
        .await
        .map(Json)
}

pub async fn my_status_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<Response, AppError> {
    let participation =
        participation_service::get_my_participation(&pool, &activity_id, &auth_user.id).await?;
    Ok(match participation {
        Some(view) => Json(view).into_response(),
        None => Json(json!({ "status": "NOT_JOINED" })).into_response(),
    })
}

pub async fn approve_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path((_activity_id, participant_id)): Path<(String, String)>,
    State(pool): State<SqlitePool>,
) -> Result<Json<ParticipantView>, AppError> {
    participation_service::approve(&pool, &participant_id, &auth_user.id)
        .await
        .map(Json)
}

pub async fn reject_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path((_activity_id, participant_id)): Path<(String, String)>,
    State(pool): State<SqlitePool>,
) -> Result<Json<ParticipantView>, AppError> {
    participation_service::reject(&pool, &participant_id, &auth_user.id)
        .await
        .map(Json)
}
