// Identity collaborator read model; this service never writes users.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UsersRow {
    pub user_id: String,
    pub full_name: Option<String>,
    pub photo_url: Option<String>,
    pub age: Option<i64>,
}
