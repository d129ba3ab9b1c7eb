//! Database models

use serde::{Deserialize, Serialize};

/// Denormalized per-user snapshot maintained by the reconciliation job
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub user_guid: String,
    pub performance_tier: String,
    pub session_streak: i64,
    pub daily_streak: i64,
    pub last_submission_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_active_date: Option<String>,
    pub approved_count: i64,
    pub rejected_count: i64,
    pub total_earned: f64,
    pub pending_earnings: f64,
    pub paid_earnings: f64,
    pub total_xp: i64,
    pub current_level: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Submission {
    pub guid: String,
    pub spotter_guid: String,
    pub category: String,
    pub description: String,
    /// Evidence blob (source URL, platform, title, thumbnail) as JSON text
    pub evidence: String,
    pub status: String,
    pub approve_count: i64,
    pub reject_count: i64,
    pub validation_count: i64,
    pub payment_amount: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vote {
    pub guid: String,
    pub submission_guid: String,
    pub voter_guid: String,
    pub vote: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Append-only earnings ledger row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LedgerEntry {
    pub guid: String,
    pub user_guid: String,
    pub amount: f64,
    pub entry_type: String,
    pub status: String,
    pub submission_guid: Option<String>,
    /// Multiplier breakdown as JSON text
    pub metadata: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Append-only XP event row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct XpEvent {
    pub guid: String,
    pub user_guid: String,
    pub amount: i64,
    pub event_type: String,
    pub submission_guid: Option<String>,
    pub metadata: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
