pub mod activities;
pub mod activity_participants;
pub mod user_profiles;
pub mod users;

pub use activities::{ActivityRow, ActivityStatus, SkillLevel};
pub use activity_participants::{ParticipantRow, ParticipationStatus};
pub use user_profiles::UserProfilesRow;
pub use users::UsersRow;
