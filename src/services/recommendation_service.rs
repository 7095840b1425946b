use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::database::{activity_repo, participant_repo, profile_repo, user_repo};
use crate::error::AppError;
use crate::models::{ActivityRow, ParticipationStatus};
use crate::services::activity_service::{build_view, ActivityView};

/// Scoring inputs for one user, assembled once per request.
pub struct UserContext {
    pub age: Option<i64>,
    pub skill_level: Option<String>,
    pub location: Option<String>,
}

const CATEGORY_MATCH_BONUS: f64 = 30.0;
const SKILL_MATCH_BONUS: f64 = 20.0;
const LOCATION_MATCH_BONUS: f64 = 25.0;
const CREATOR_RATING_WEIGHT: f64 = 5.0;
const AGE_FIT_BONUS: f64 = 10.0;
const URGENCY_WEEK_BONUS: f64 = 15.0;
const URGENCY_FORTNIGHT_BONUS: f64 = 10.0;

/// Relevance of one candidate activity for one user. Pure: same inputs,
/// same score.
pub fn relevance_score(
    activity: &ActivityRow,
    user: &UserContext,
    preferred_categories: &HashSet<String>,
    now: DateTime<Utc>,
) -> f64 {
    let mut score = 0.0;

    if activity
        .category
        .as_deref()
        .map(|c| preferred_categories.contains(c))
        .unwrap_or(false)
    {
        score += CATEGORY_MATCH_BONUS;
    }

    if let (Some(user_skill), Some(required_skill)) = (
        user.skill_level.as_deref(),
        activity.required_skill_level.as_deref(),
    ) {
        if user_skill == required_skill {
            score += SKILL_MATCH_BONUS;
        }
    }

    if let (Some(user_location), Some(activity_location)) =
        (user.location.as_deref(), activity.location.as_deref())
    {
        if activity_location
            .to_lowercase()
            .contains(&user_location.to_lowercase())
        {
            score += LOCATION_MATCH_BONUS;
        }
    }

    score += activity.creator_rating.unwrap_or(0.0) * CREATOR_RATING_WEIGHT;

    if let Some(age) = user.age {
        let above_min = activity.min_age.map_or(true, |min_age| age >= min_age);
        let below_max = activity.max_age.map_or(true, |max_age| age <= max_age);
        if above_min && below_max {
            score += AGE_FIT_BONUS;
        }
    }

    if let Some(scheduled_at) = activity.scheduled_at {
        let days_until = (scheduled_at - now).num_days();
        if days_until <= 7 {
            score += URGENCY_WEEK_BONUS;
        } else if days_until <= 14 {
            score += URGENCY_FORTNIGHT_BONUS;
        }
    }

    score
}

pub fn split_interests(interests: &str) -> HashSet<String> {
    interests
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn get_recommendations(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<ActivityView>, AppError> {
    let user = user_repo::load_user(pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User", user_id))?;
    let profile = profile_repo::load_profile(pool, user_id).await?;

    // Declared interests plus categories of past approved participations.
    let mut preferred_categories: HashSet<String> = profile
        .as_ref()
        .and_then(|p| p.interests.as_deref())
        .map(split_interests)
        .unwrap_or_default();
    let past_participations = participant_repo::list_joined_activity_refs(
        pool,
        user_id,
        ParticipationStatus::Approved.as_str(),
    )
    .await?;
    preferred_categories.extend(
        past_participations
            .iter()
            .filter_map(|p| p.category.clone()),
    );

    let limit = limit.max(0);
    let candidates = if !preferred_categories.is_empty() {
        let categories: Vec<String> = preferred_categories.iter().cloned().collect();
        activity_repo::list_open_by_categories(pool, &categories).await?
    } else {
        // New users with no history still get something to look at.
        activity_repo::list_recent_open(pool, limit * 2).await?
    };

    let already_requested: HashSet<String> = participant_repo::list_activity_ids_for_user(pool, user_id)
        .await?
        .into_iter()
        .collect();

    let context = UserContext {
        age: user.age,
        skill_level: profile.as_ref().and_then(|p| p.skill_level.clone()),
        location: profile.as_ref().and_then(|p| p.location.clone()),
    };
    let now = Utc::now();

    let mut scored: Vec<(ActivityRow, f64)> = candidates
        .into_iter()
        .filter(|a| a.creator_id != user_id)
        .filter(|a| !already_requested.contains(&a.activity_id))
        .map(|a| {
            let score = relevance_score(&a, &context, &preferred_categories, now);
            (a, score)
        })
        .collect();

    // Stable sort: ties keep the candidate pool's order.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    Ok(scored
        .into_iter()
        .take(limit as usize)
        .map(|(activity, _)| build_view(activity))
        .collect())
}
