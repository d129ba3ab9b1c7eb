//! XP level derivation
//!
//! XP accrues as append-only events; a user's level is derived from their
//! summed total via a fixed ascending threshold table (15 levels). Totals
//! and levels stored on the profile are denormalized snapshots maintained
//! by the reconciliation job.

use crate::rewards::XP_LEVEL_THRESHOLDS;
use serde::{Deserialize, Serialize};

/// Level progress snapshot for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelProgress {
    pub total_xp: i64,
    pub current_level: i64,
    /// XP accumulated past the current level's threshold
    pub xp_into_level: i64,
    /// XP remaining to the next level; 0 at max level
    pub xp_to_next_level: i64,
}

/// Derive the 1-based level for an XP total
///
/// Highest level whose threshold is <= the total; totals below zero clamp
/// to level 1.
pub fn level_for_xp(total_xp: i64) -> i64 {
    let mut level = 1;
    for (index, threshold) in XP_LEVEL_THRESHOLDS.iter().enumerate() {
        if total_xp >= *threshold {
            level = index as i64 + 1;
        }
    }
    level
}

/// Compute level progress for an XP total
pub fn progress_for_xp(total_xp: i64) -> LevelProgress {
    let clamped = total_xp.max(0);
    let current_level = level_for_xp(clamped);
    let current_threshold = XP_LEVEL_THRESHOLDS[(current_level - 1) as usize];

    let xp_to_next_level = if (current_level as usize) < XP_LEVEL_THRESHOLDS.len() {
        XP_LEVEL_THRESHOLDS[current_level as usize] - clamped
    } else {
        0
    };

    LevelProgress {
        total_xp: clamped,
        current_level,
        xp_into_level: clamped - current_threshold,
        xp_to_next_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_boundaries() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(299), 2);
        assert_eq!(level_for_xp(300), 3);
        assert_eq!(level_for_xp(15000), 15);
        assert_eq!(level_for_xp(1_000_000), 15);
    }

    #[test]
    fn negative_totals_clamp_to_level_one() {
        assert_eq!(level_for_xp(-50), 1);
        let progress = progress_for_xp(-50);
        assert_eq!(progress.total_xp, 0);
        assert_eq!(progress.current_level, 1);
    }

    #[test]
    fn level_is_monotonic_in_xp() {
        let mut previous = 0;
        for xp in (0..20000).step_by(37) {
            let level = level_for_xp(xp);
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn progress_accounts_for_thresholds() {
        let progress = progress_for_xp(150);
        assert_eq!(progress.current_level, 2);
        assert_eq!(progress.xp_into_level, 50);
        assert_eq!(progress.xp_to_next_level, 150);

        let max = progress_for_xp(20000);
        assert_eq!(max.current_level, 15);
        assert_eq!(max.xp_to_next_level, 0);
    }
}
