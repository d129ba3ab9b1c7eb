//! Typed rewards configuration
//!
//! Single source of truth for every tunable in the earnings and XP flows:
//! base dollar rates, streak multiplier tables, XP award sizes, level
//! thresholds, the validation vote threshold and the submission rate limit.
//! Values were historically hard-coded and re-derived across scripts; here
//! they live in one struct, with selected values overridable through the
//! settings table.

use crate::db::settings::get_setting;
use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Session streak multiplier table (position within a 5-minute window)
///
/// Index by streak position: 1 -> 1.0x .. 5+ -> 2.5x (cap).
const SESSION_STREAK_MULTIPLIERS: [(u32, f64); 5] =
    [(1, 1.0), (2, 1.2), (3, 1.5), (4, 2.0), (5, 2.5)];

/// Daily streak multiplier table (consecutive active days before today,
/// cap 2.5x)
const DAILY_STREAK_MULTIPLIERS: [(u32, f64); 5] =
    [(0, 1.0), (1, 1.2), (3, 1.5), (7, 2.0), (14, 2.5)];

/// XP thresholds for the 15-level progression, ascending
///
/// Level n (1-indexed) is reached at XP_LEVEL_THRESHOLDS[n - 1].
pub const XP_LEVEL_THRESHOLDS: [i64; 15] = [
    0, 100, 300, 600, 1000, 1500, 2200, 3000, 4000, 5200, 6600, 8200, 10000, 12500, 15000,
];

/// Rewards configuration shared across services
///
/// Loaded once at startup; read-only afterwards.
#[derive(Debug, Clone)]
pub struct RewardsConfig {
    /// Dollars accrued per accepted trend submission (before multipliers)
    pub submission_base: f64,
    /// Dollars accrued per validation vote (before multipliers)
    pub validation_base: f64,
    /// Dollars accrued by the author when a submission is validated
    pub approval_bonus: f64,

    /// XP per accepted trend submission
    pub submission_xp: i64,
    /// XP per validation vote
    pub validation_xp: i64,
    /// XP bonus to the author when a submission is validated
    pub approval_xp: i64,
    /// XP penalty (negative) to the author when a submission is rejected
    pub rejection_xp: i64,

    /// Votes required to finalize a submission
    pub validation_threshold: i64,
    /// Maximum submissions per user per rolling hour
    pub rate_limit_per_hour: i64,
    /// Session streak window in minutes
    pub session_window_minutes: i64,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            submission_base: 0.25,
            validation_base: 0.02,
            approval_bonus: 0.50,
            submission_xp: 25,
            validation_xp: 5,
            approval_xp: 50,
            rejection_xp: -10,
            validation_threshold: 3,
            rate_limit_per_hour: 20,
            session_window_minutes: 5,
        }
    }
}

impl RewardsConfig {
    /// Load configuration, applying any overrides present in settings
    ///
    /// Recognized keys: `earnings_submission_base`, `earnings_validation_base`,
    /// `earnings_approval_bonus`, `validation_threshold`,
    /// `submission_rate_limit_per_hour`.
    pub async fn load(db: &SqlitePool) -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = get_setting::<f64>(db, "earnings_submission_base").await? {
            config.submission_base = v;
        }
        if let Some(v) = get_setting::<f64>(db, "earnings_validation_base").await? {
            config.validation_base = v;
        }
        if let Some(v) = get_setting::<f64>(db, "earnings_approval_bonus").await? {
            config.approval_bonus = v;
        }
        if let Some(v) = get_setting::<i64>(db, "validation_threshold").await? {
            config.validation_threshold = v.max(1);
        }
        if let Some(v) = get_setting::<i64>(db, "submission_rate_limit_per_hour").await? {
            config.rate_limit_per_hour = v.max(1);
        }

        info!(
            "Rewards config loaded: submission ${:.2}, validation ${:.2}, threshold {}",
            config.submission_base, config.validation_base, config.validation_threshold
        );
        Ok(config)
    }

    /// Multiplier for a session streak position (1-based)
    pub fn session_multiplier(&self, streak_position: u32) -> f64 {
        let mut multiplier = 1.0;
        for (position, value) in SESSION_STREAK_MULTIPLIERS {
            if streak_position >= position {
                multiplier = value;
            }
        }
        multiplier
    }

    /// Multiplier for a daily streak length in days
    pub fn daily_multiplier(&self, streak_days: u32) -> f64 {
        let mut multiplier = 1.0;
        for (days, value) in DAILY_STREAK_MULTIPLIERS {
            if streak_days >= days {
                multiplier = value;
            }
        }
        multiplier
    }
}
