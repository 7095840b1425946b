use chrono::{DateTime, Utc};

/// Activity state. FULL is entered automatically when an approval consumes
/// the last capacity slot; COMPLETED and soft-delete are creator actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityStatus {
    Open,
    Full,
    Completed,
    Cancelled,
}

impl ActivityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityStatus::Open => "OPEN",
            ActivityStatus::Full => "FULL",
            ActivityStatus::Completed => "COMPLETED",
            ActivityStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "OPEN" => Some(ActivityStatus::Open),
            "FULL" => Some(ActivityStatus::Full),
            "COMPLETED" => Some(ActivityStatus::Completed),
            "CANCELLED" => Some(ActivityStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            SkillLevel::Beginner => "BEGINNER",
            SkillLevel::Intermediate => "INTERMEDIATE",
            SkillLevel::Advanced => "ADVANCED",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "BEGINNER" => Some(SkillLevel::Beginner),
            "INTERMEDIATE" => Some(SkillLevel::Intermediate),
            "ADVANCED" => Some(SkillLevel::Advanced),
            _ => None,
        }
    }
}

// Read model for activities; creator display columns come along via the
// joins in activity_repo so views never chase extra lookups.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityRow {
    pub activity_id: String,
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
    pub creator_id: String,
    pub is_deleted: i64,
    pub created_at: DateTime<Utc>,
    pub creator_name: Option<String>,
    pub creator_photo_url: Option<String>,
    pub creator_rating: Option<f64>,
}
