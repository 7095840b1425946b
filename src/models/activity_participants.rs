use chrono::{DateTime, Utc};

/// Participation state machine: PENDING is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ParticipationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ParticipationStatus::Pending => "PENDING",
            ParticipationStatus::Approved => "APPROVED",
            ParticipationStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "PENDING" => Some(ParticipationStatus::Pending),
            "APPROVED" => Some(ParticipationStatus::Approved),
            "REJECTED" => Some(ParticipationStatus::Rejected),
            _ => None,
        }
    }
}

// One row per (activity, user) pair, enforced by a UNIQUE constraint.
// User display columns are joined in by participant_repo.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ParticipantRow {
    pub participant_id: String,
    pub activity_id: String,
    pub user_id: String,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub user_name: Option<String>,
    pub user_photo_url: Option<String>,
    pub user_rating: Option<f64>,
}
