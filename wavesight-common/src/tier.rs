//! Spotter performance tiers
//!
//! A user's tier scales their earnings. Tiers are stored as labels on the
//! user profile and re-evaluated by the reconciliation job from decided
//! submissions; the hot path only reads the label.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Performance tier labels, ordered from most to least restricted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    Restricted,
    Learning,
    Verified,
    Elite,
    Master,
}

impl PerformanceTier {
    /// Earnings multiplier for this tier
    pub fn multiplier(&self) -> f64 {
        match self {
            PerformanceTier::Restricted => 0.5,
            PerformanceTier::Learning => 1.0,
            PerformanceTier::Verified => 1.5,
            PerformanceTier::Elite => 2.0,
            PerformanceTier::Master => 3.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceTier::Restricted => "restricted",
            PerformanceTier::Learning => "learning",
            PerformanceTier::Verified => "verified",
            PerformanceTier::Elite => "elite",
            PerformanceTier::Master => "master",
        }
    }
}

impl Default for PerformanceTier {
    fn default() -> Self {
        PerformanceTier::Learning
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PerformanceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "restricted" => Ok(PerformanceTier::Restricted),
            "learning" => Ok(PerformanceTier::Learning),
            "verified" => Ok(PerformanceTier::Verified),
            "elite" => Ok(PerformanceTier::Elite),
            "master" => Ok(PerformanceTier::Master),
            other => Err(format!("unknown performance tier: {}", other)),
        }
    }
}

/// Evaluate the tier a user qualifies for from decided submissions
///
/// Promotion thresholds: verified at >=10 approved with >=70% accuracy,
/// elite at >=50 with >=80%, master at >=100 with >=90%. Users with at
/// least 10 decided submissions and accuracy below 30% are restricted.
/// Everyone else stays learning.
pub fn evaluate_tier(approved: i64, rejected: i64) -> PerformanceTier {
    let decided = approved + rejected;
    if decided == 0 {
        return PerformanceTier::Learning;
    }
    let accuracy = approved as f64 / decided as f64;

    if decided >= 10 && accuracy < 0.30 {
        return PerformanceTier::Restricted;
    }
    if approved >= 100 && accuracy >= 0.90 {
        return PerformanceTier::Master;
    }
    if approved >= 50 && accuracy >= 0.80 {
        return PerformanceTier::Elite;
    }
    if approved >= 10 && accuracy >= 0.70 {
        return PerformanceTier::Verified;
    }
    PerformanceTier::Learning
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multipliers_match_tier_table() {
        assert_eq!(PerformanceTier::Learning.multiplier(), 1.0);
        assert_eq!(PerformanceTier::Verified.multiplier(), 1.5);
        assert_eq!(PerformanceTier::Elite.multiplier(), 2.0);
        assert_eq!(PerformanceTier::Master.multiplier(), 3.0);
        assert_eq!(PerformanceTier::Restricted.multiplier(), 0.5);
    }

    #[test]
    fn round_trips_through_str() {
        for tier in [
            PerformanceTier::Restricted,
            PerformanceTier::Learning,
            PerformanceTier::Verified,
            PerformanceTier::Elite,
            PerformanceTier::Master,
        ] {
            assert_eq!(tier.as_str().parse::<PerformanceTier>().unwrap(), tier);
        }
    }

    #[test]
    fn new_user_is_learning() {
        assert_eq!(evaluate_tier(0, 0), PerformanceTier::Learning);
    }

    #[test]
    fn promotion_thresholds() {
        assert_eq!(evaluate_tier(9, 0), PerformanceTier::Learning);
        assert_eq!(evaluate_tier(10, 4), PerformanceTier::Verified);
        assert_eq!(evaluate_tier(50, 12), PerformanceTier::Elite);
        assert_eq!(evaluate_tier(100, 11), PerformanceTier::Master);
    }

    #[test]
    fn accuracy_gates_promotion() {
        // 10 approved out of 25 decided is 40% - not verified
        assert_eq!(evaluate_tier(10, 15), PerformanceTier::Learning);
        // 100 approved at 85% accuracy qualifies for elite, not master
        assert_eq!(evaluate_tier(100, 18), PerformanceTier::Elite);
    }

    #[test]
    fn low_accuracy_restricts() {
        assert_eq!(evaluate_tier(2, 10), PerformanceTier::Restricted);
        // Under 10 decided never restricts
        assert_eq!(evaluate_tier(1, 8), PerformanceTier::Learning);
    }
}
