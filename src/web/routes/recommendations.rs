use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::services::activity_service::ActivityView;
use crate::services::recommendation_service;
use crate::web::middleware::auth::AuthenticatedUser;

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationsQuery {
    pub limit: Option<i64>,
}

pub async fn recommendations_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<RecommendationsQuery>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<ActivityView>>, AppError> {
    let limit = query.limit.unwrap_or(10).clamp(1, 50);
    recommendation_service::get_recommendations(&pool, &auth_user.id, limit)
        .await
        .map(Json)
}
