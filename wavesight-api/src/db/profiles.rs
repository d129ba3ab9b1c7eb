//! User profile access
//!
//! Profiles are denormalized snapshots. The API keeps them current
//! incrementally; the reconciliation job recomputes them from the ledgers.

use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;
use wavesight_common::db::models::UserProfile;
use wavesight_common::tier::{evaluate_tier, PerformanceTier};
use wavesight_common::{Error, Result};

const PROFILE_COLUMNS: &str = "user_guid, performance_tier, session_streak, daily_streak, \
     last_submission_at, last_active_date, approved_count, rejected_count, \
     total_earned, pending_earnings, paid_earnings, total_xp, current_level";

/// Fetch a user's profile
pub async fn get_profile(db: &SqlitePool, user_guid: Uuid) -> Result<UserProfile> {
    let query = format!("SELECT {} FROM user_profiles WHERE user_guid = ?", PROFILE_COLUMNS);
    sqlx::query_as::<_, UserProfile>(&query)
        .bind(user_guid.to_string())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| Error::NotFound(format!("profile for user {}", user_guid)))
}

/// Parse the stored tier string, falling back to the default for unknown values
pub fn tier_of(profile: &UserProfile) -> PerformanceTier {
    profile.performance_tier.parse().unwrap_or_default()
}

/// Record a decided submission against the author and re-evaluate their tier
///
/// Returns Some((old, new)) when the tier changed.
pub async fn record_decision(
    conn: &mut SqliteConnection,
    author_guid: Uuid,
    approved: bool,
) -> Result<Option<(String, String)>> {
    let column = if approved { "approved_count" } else { "rejected_count" };
    let query = format!(
        "UPDATE user_profiles SET {} = {} + 1 WHERE user_guid = ?",
        column, column
    );
    sqlx::query(&query)
        .bind(author_guid.to_string())
        .execute(&mut *conn)
        .await?;

    let (old_tier, approved_count, rejected_count): (String, i64, i64) = sqlx::query_as(
        "SELECT performance_tier, approved_count, rejected_count FROM user_profiles WHERE user_guid = ?",
    )
    .bind(author_guid.to_string())
    .fetch_one(&mut *conn)
    .await?;

    let new_tier = evaluate_tier(approved_count, rejected_count);
    if new_tier.as_str() == old_tier {
        return Ok(None);
    }

    sqlx::query("UPDATE user_profiles SET performance_tier = ? WHERE user_guid = ?")
        .bind(new_tier.as_str())
        .bind(author_guid.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(Some((old_tier, new_tier.as_str().to_string())))
}
