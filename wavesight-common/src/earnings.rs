//! Earnings calculation
//!
//! Every accrual is `base x tier x session x daily` in floating-point
//! dollars, with the full multiplier breakdown recorded alongside the
//! amount so ledger rows can be audited and recomputed later.

use crate::rewards::RewardsConfig;
use crate::tier::PerformanceTier;
use serde::{Deserialize, Serialize};

/// What a ledger entry was accrued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Submission,
    Validation,
    Bonus,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Submission => "submission",
            EntryType::Validation => "validation",
            EntryType::Bonus => "bonus",
        }
    }
}

/// Lifecycle status of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Pending,
    Approved,
    Paid,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Approved => "approved",
            EntryStatus::Paid => "paid",
        }
    }
}

/// Multiplier breakdown stored as ledger metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EarningsBreakdown {
    pub base_amount: f64,
    pub tier_multiplier: f64,
    pub session_multiplier: f64,
    pub daily_multiplier: f64,
    pub final_amount: f64,
}

impl EarningsBreakdown {
    /// Serialize the breakdown for the ledger metadata column
    pub fn to_metadata(&self) -> serde_json::Value {
        serde_json::json!({
            "base_amount": self.base_amount,
            "tier_multiplier": self.tier_multiplier,
            "session_multiplier": self.session_multiplier,
            "daily_multiplier": self.daily_multiplier,
        })
    }
}

/// Calculate a submission accrual for the given tier and streak state
///
/// `session_position` is the 1-based position of this submission within the
/// current session window; `daily_streak` the consecutive active days
/// including today.
pub fn submission_earnings(
    config: &RewardsConfig,
    tier: PerformanceTier,
    session_position: u32,
    daily_streak: u32,
) -> EarningsBreakdown {
    calculate(config.submission_base, tier, config.session_multiplier(session_position), config.daily_multiplier(daily_streak))
}

/// Calculate a validation-vote accrual
///
/// Validation votes scale with tier only; streak multipliers apply to
/// submission activity.
pub fn validation_earnings(config: &RewardsConfig, tier: PerformanceTier) -> EarningsBreakdown {
    calculate(config.validation_base, tier, 1.0, 1.0)
}

/// Calculate the author's approval bonus when a submission is validated
pub fn approval_bonus(config: &RewardsConfig, tier: PerformanceTier) -> EarningsBreakdown {
    calculate(config.approval_bonus, tier, 1.0, 1.0)
}

fn calculate(
    base: f64,
    tier: PerformanceTier,
    session_multiplier: f64,
    daily_multiplier: f64,
) -> EarningsBreakdown {
    let tier_multiplier = tier.multiplier();
    EarningsBreakdown {
        base_amount: base,
        tier_multiplier,
        session_multiplier,
        daily_multiplier,
        final_amount: base * tier_multiplier * session_multiplier * daily_multiplier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn master_tier_max_streaks() {
        // $0.25 x 3.0 x 2.5 x 2.5 = $4.6875
        let config = RewardsConfig::default();
        let breakdown = submission_earnings(&config, PerformanceTier::Master, 5, 30);
        assert!((breakdown.final_amount - 4.6875).abs() < EPSILON);
        assert_eq!(breakdown.tier_multiplier, 3.0);
        assert_eq!(breakdown.session_multiplier, 2.5);
        assert_eq!(breakdown.daily_multiplier, 2.5);
    }

    #[test]
    fn learning_tier_no_streaks() {
        let config = RewardsConfig::default();
        let breakdown = submission_earnings(&config, PerformanceTier::Learning, 1, 0);
        assert!((breakdown.final_amount - 0.25).abs() < EPSILON);
    }

    #[test]
    fn amount_equals_product_of_factors() {
        let config = RewardsConfig::default();
        for tier in [
            PerformanceTier::Restricted,
            PerformanceTier::Learning,
            PerformanceTier::Verified,
            PerformanceTier::Elite,
            PerformanceTier::Master,
        ] {
            for session in 1..=6 {
                for daily in [0, 1, 3, 7, 14, 20] {
                    let b = submission_earnings(&config, tier, session, daily);
                    let product = b.base_amount
                        * b.tier_multiplier
                        * b.session_multiplier
                        * b.daily_multiplier;
                    assert!((b.final_amount - product).abs() < EPSILON);
                }
            }
        }
    }

    #[test]
    fn validation_scales_with_tier_only() {
        let config = RewardsConfig::default();
        let breakdown = validation_earnings(&config, PerformanceTier::Verified);
        assert!((breakdown.final_amount - 0.03).abs() < EPSILON);
        assert_eq!(breakdown.session_multiplier, 1.0);
        assert_eq!(breakdown.daily_multiplier, 1.0);
    }

    #[test]
    fn metadata_records_all_multipliers() {
        let config = RewardsConfig::default();
        let breakdown = submission_earnings(&config, PerformanceTier::Elite, 3, 7);
        let metadata = breakdown.to_metadata();
        assert_eq!(metadata["base_amount"], 0.25);
        assert_eq!(metadata["tier_multiplier"], 2.0);
        assert_eq!(metadata["session_multiplier"], 1.5);
        assert_eq!(metadata["daily_multiplier"], 2.0);
    }
}
