//! Trend submission creation and queries
//!
//! Creating a submission is a single transaction covering the submission
//! row, the spotter's earnings ledger row, their XP event and the streak
//! update on their profile. Either all of it lands or none of it does.

use crate::db::{ledger, profiles, xp_events};
use chrono::{Duration, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;
use wavesight_common::category::map_category;
use wavesight_common::db::models::Submission;
use wavesight_common::earnings::{self, EarningsBreakdown, EntryStatus, EntryType};
use wavesight_common::rewards::RewardsConfig;
use wavesight_common::{Error, Result};

/// Description length bounds, in characters
pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

const SUBMISSION_COLUMNS: &str = "guid, spotter_guid, category, description, evidence, status, \
     approve_count, reject_count, validation_count, payment_amount, created_at";

/// Payload for a new trend submission
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubmission {
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Result of an accepted submission
#[derive(Debug)]
pub struct CreatedSubmission {
    pub submission: Submission,
    pub breakdown: EarningsBreakdown,
    pub session_streak: i64,
    pub daily_streak: i64,
}

/// Validate, rate-limit and insert a submission, accruing earnings and XP
pub async fn create_submission(
    db: &SqlitePool,
    rewards: &RewardsConfig,
    spotter_guid: Uuid,
    new: NewSubmission,
) -> Result<CreatedSubmission> {
    let description = new.description.trim();
    let chars = description.chars().count();
    if !(DESCRIPTION_MIN_CHARS..=DESCRIPTION_MAX_CHARS).contains(&chars) {
        return Err(Error::InvalidInput(format!(
            "description must be {}..={} characters, got {}",
            DESCRIPTION_MIN_CHARS, DESCRIPTION_MAX_CHARS, chars
        )));
    }
    let category = map_category(&new.category);

    let recent: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM trend_submissions
        WHERE spotter_guid = ? AND created_at > datetime('now', '-1 hour')
        "#,
    )
    .bind(spotter_guid.to_string())
    .fetch_one(db)
    .await?;
    if recent >= rewards.rate_limit_per_hour {
        return Err(Error::RateLimited {
            count: recent,
            limit: rewards.rate_limit_per_hour,
        });
    }

    let profile = profiles::get_profile(db, spotter_guid).await?;
    let tier = profiles::tier_of(&profile);
    let now = Utc::now();

    // The session position counts the current submission; the daily streak
    // counts consecutive active days before today, so a first active day
    // reads the 1.0x entry of the daily table.
    let in_window = profile
        .last_submission_at
        .map(|last| now - last <= Duration::minutes(rewards.session_window_minutes))
        .unwrap_or(false);
    let session_streak = if in_window { profile.session_streak + 1 } else { 1 };

    let today = now.date_naive();
    let yesterday = (today - Duration::days(1)).to_string();
    let today = today.to_string();
    let daily_streak = match profile.last_active_date.as_deref() {
        Some(d) if d == today => profile.daily_streak,
        Some(d) if d == yesterday => profile.daily_streak + 1,
        _ => 0,
    };

    let breakdown = earnings::submission_earnings(
        rewards,
        tier,
        session_streak.max(1) as u32,
        daily_streak.max(0) as u32,
    );

    let guid = Uuid::new_v4();
    let evidence = serde_json::json!({
        "url": new.url,
        "platform": new.platform,
        "title": new.title,
    });

    let mut tx = db.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO trend_submissions (guid, spotter_guid, category, description, evidence, status, payment_amount)
        VALUES (?, ?, ?, ?, ?, 'submitted', ?)
        "#,
    )
    .bind(guid.to_string())
    .bind(spotter_guid.to_string())
    .bind(&category)
    .bind(description)
    .bind(evidence.to_string())
    .bind(breakdown.final_amount)
    .execute(&mut *tx)
    .await?;

    ledger::append_entry(
        &mut *tx,
        spotter_guid,
        EntryType::Submission,
        EntryStatus::Pending,
        &breakdown,
        Some(guid),
    )
    .await?;

    xp_events::append_event(&mut *tx, spotter_guid, rewards.submission_xp, "submission", Some(guid))
        .await?;

    sqlx::query(
        r#"
        UPDATE user_profiles
        SET session_streak = ?, daily_streak = ?, last_submission_at = ?, last_active_date = ?
        WHERE user_guid = ?
        "#,
    )
    .bind(session_streak)
    .bind(daily_streak)
    .bind(now)
    .bind(&today)
    .bind(spotter_guid.to_string())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "✓ Submission {} accepted: category {}, ${:.4} accrued (session {}, daily {})",
        guid, category, breakdown.final_amount, session_streak, daily_streak
    );

    let submission = get_submission(db, guid).await?;
    Ok(CreatedSubmission {
        submission,
        breakdown,
        session_streak,
        daily_streak,
    })
}

/// Fetch a submission by guid
pub async fn get_submission(db: &SqlitePool, guid: Uuid) -> Result<Submission> {
    let query = format!(
        "SELECT {} FROM trend_submissions WHERE guid = ?",
        SUBMISSION_COLUMNS
    );
    sqlx::query_as::<_, Submission>(&query)
        .bind(guid.to_string())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| Error::NotFound(format!("submission {}", guid)))
}

/// List submissions, newest first, optionally filtered by status
pub async fn list_submissions(
    db: &SqlitePool,
    status: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Submission>> {
    let submissions = match status {
        Some(status) => {
            let query = format!(
                "SELECT {} FROM trend_submissions WHERE status = ? \
                 ORDER BY created_at DESC, guid DESC LIMIT ? OFFSET ?",
                SUBMISSION_COLUMNS
            );
            sqlx::query_as::<_, Submission>(&query)
                .bind(status)
                .bind(limit)
                .bind(offset)
                .fetch_all(db)
                .await?
        }
        None => {
            let query = format!(
                "SELECT {} FROM trend_submissions \
                 ORDER BY created_at DESC, guid DESC LIMIT ? OFFSET ?",
                SUBMISSION_COLUMNS
            );
            sqlx::query_as::<_, Submission>(&query)
                .bind(limit)
                .bind(offset)
                .fetch_all(db)
                .await?
        }
    };

    Ok(submissions)
}
