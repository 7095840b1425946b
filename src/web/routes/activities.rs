use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::services::activity_lifecycle_service;
use crate::services::activity_service::{
    self, ActivitiesQuery, ActivityView, CreateActivityRequest, UpdateActivityRequest,
};
use crate::web::middleware::auth::AuthenticatedUser;

pub async fn create_activity_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(body): Json<CreateActivityRequest>,
) -> Result<(StatusCode, Json<ActivityView>), AppError> {
    let view = activity_service::create_activity(&pool, &auth_user.id, &body).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn list_activities_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Query(query): Query<ActivitiesQuery>,
) -> Result<Json<Vec<ActivityView>>, AppError> {
    activity_service::list_activities(&pool, &query).await.map(Json)
}

pub async fn categories_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
) -> Json<Vec<&'static str>> {
    Json(activity_service::PREDEFINED_CATEGORIES.to_vec())
}

pub async fn my_created_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<ActivityView>>, AppError> {
    activity_service::get_my_created_activities(&pool, &auth_user.id)
        .await
        .map(Json)
}

pub async fn my_joined_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<ActivityView>>, AppError> {
    activity_service::get_my_joined_activities(&pool, &auth_user.id)
        .await
        .map(Json)
}

pub async fn get_activity_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<Json<ActivityView>, AppError> {
    activity_service::get_activity(&pool, &activity_id).await.map(Json)
}

pub async fn update_activity_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
    Json(body): Json<UpdateActivityRequest>,
) -> Result<Json<ActivityView>, AppError> {
    activity_service::update_activity(&pool, &activity_id, &auth_user.id, &body)
        .await
        .map(Json)
}

pub async fn complete_activity_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<Json<ActivityView>, AppError> {
    activity_lifecycle_service::complete_activity(&pool, &activity_id, &auth_user.id)
        .await
        .map(Json)
}

pub async fn delete_activity_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Value>, AppError> {
    activity_lifecycle_service::delete_activity(&pool, &activity_id, &auth_user.id).await?;
    Ok(Json(json!({ "message": "Activity deleted successfully" })))
}
