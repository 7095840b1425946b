// Profile collaborator read model. `total_activities` is the only column
// this service touches, via the completion side effect.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserProfilesRow {
    pub user_id: String,
    pub skill_level: Option<String>,
    pub location: Option<String>,
    pub interests: Option<String>,
    pub average_rating: Option<f64>,
    pub total_activities: Option<i64>,
}
