//! wavesight-recon library - ledger reconciliation
//!
//! The API keeps denormalized profile snapshots current incrementally, but
//! a crash between a vote commit and its accruals, or any out-of-band edit,
//! leaves them stale. This job recomputes every snapshot from the
//! append-only ledgers and the vote table, which are the source of truth,
//! and logs whatever drift it repairs.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};
use wavesight_common::rewards::RewardsConfig;
use wavesight_common::tier::evaluate_tier;
use wavesight_common::xp::level_for_xp;
use wavesight_common::Result;

const EPSILON: f64 = 1e-9;

/// Summary of one reconciliation run
#[derive(Debug, Default, Clone, Serialize)]
pub struct ReconReport {
    pub profiles_checked: u64,
    pub earnings_repaired: u64,
    pub xp_repaired: u64,
    pub submissions_repaired: u64,
    pub tiers_changed: u64,
}

impl ReconReport {
    pub fn drift_found(&self) -> bool {
        self.earnings_repaired > 0
            || self.xp_repaired > 0
            || self.submissions_repaired > 0
            || self.tiers_changed > 0
    }
}

/// Run every reconciliation pass in order
///
/// Vote counters are repaired before tiers so tier evaluation sees the
/// corrected decision counts.
pub async fn reconcile(db: &SqlitePool, rewards: &RewardsConfig) -> Result<ReconReport> {
    let mut report = ReconReport::default();

    reconcile_submissions(db, rewards, &mut report).await?;
    reconcile_earnings(db, &mut report).await?;
    reconcile_xp(db, &mut report).await?;
    reconcile_tiers(db, &mut report).await?;

    if report.drift_found() {
        warn!(
            "Reconciliation repaired drift: {} earnings, {} xp, {} submissions, {} tiers",
            report.earnings_repaired,
            report.xp_repaired,
            report.submissions_repaired,
            report.tiers_changed
        );
    } else {
        info!("Reconciliation found no drift ({} profiles)", report.profiles_checked);
    }

    Ok(report)
}

/// Recompute per-user earnings totals by summing the ledger by status
async fn reconcile_earnings(db: &SqlitePool, report: &mut ReconReport) -> Result<()> {
    let rows: Vec<(String, f64, f64, f64)> = sqlx::query_as(
        r#"
        SELECT
            p.user_guid,
            p.total_earned,
            p.pending_earnings,
            p.paid_earnings
        FROM user_profiles p
        "#,
    )
    .fetch_all(db)
    .await?;

    report.profiles_checked = rows.len() as u64;

    for (user_guid, total, pending, paid) in rows {
        let (ledger_total, ledger_pending, ledger_paid): (f64, f64, f64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(amount), 0.0),
                COALESCE(SUM(CASE WHEN status = 'pending' THEN amount ELSE 0.0 END), 0.0),
                COALESCE(SUM(CASE WHEN status = 'paid' THEN amount ELSE 0.0 END), 0.0)
            FROM earnings_ledger
            WHERE user_guid = ?
            "#,
        )
        .bind(&user_guid)
        .fetch_one(db)
        .await?;

        let drifted = (total - ledger_total).abs() > EPSILON
            || (pending - ledger_pending).abs() > EPSILON
            || (paid - ledger_paid).abs() > EPSILON;
        if !drifted {
            continue;
        }

        warn!(
            "Earnings drift for {}: profile total {:.4} vs ledger {:.4}",
            user_guid, total, ledger_total
        );
        sqlx::query(
            r#"
            UPDATE user_profiles
            SET total_earned = ?, pending_earnings = ?, paid_earnings = ?
            WHERE user_guid = ?
            "#,
        )
        .bind(ledger_total)
        .bind(ledger_pending)
        .bind(ledger_paid)
        .bind(&user_guid)
        .execute(db)
        .await?;
        report.earnings_repaired += 1;
    }

    Ok(())
}

/// Recompute XP totals and levels from the event log, floored at zero
async fn reconcile_xp(db: &SqlitePool, report: &mut ReconReport) -> Result<()> {
    let rows: Vec<(String, i64, i64)> =
        sqlx::query_as("SELECT user_guid, total_xp, current_level FROM user_profiles")
            .fetch_all(db)
            .await?;

    for (user_guid, total_xp, current_level) in rows {
        let summed: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM xp_events WHERE user_guid = ?")
                .bind(&user_guid)
                .fetch_one(db)
                .await?;
        let summed = summed.max(0);
        let level = level_for_xp(summed);

        if summed == total_xp && level == current_level {
            continue;
        }

        warn!(
            "XP drift for {}: profile {} (level {}) vs events {} (level {})",
            user_guid, total_xp, current_level, summed, level
        );
        sqlx::query("UPDATE user_profiles SET total_xp = ?, current_level = ? WHERE user_guid = ?")
            .bind(summed)
            .bind(level)
            .bind(&user_guid)
            .execute(db)
            .await?;
        report.xp_repaired += 1;
    }

    Ok(())
}

/// Recompute submission counters from the vote table and re-derive status
///
/// Below the threshold a submission is 'submitted' with no votes and
/// 'validating' otherwise; at or above it, a strict approval majority
/// validates and anything else rejects.
async fn reconcile_submissions(
    db: &SqlitePool,
    rewards: &RewardsConfig,
    report: &mut ReconReport,
) -> Result<()> {
    let rows: Vec<(String, String, i64, i64, i64)> = sqlx::query_as(
        "SELECT guid, status, approve_count, reject_count, validation_count FROM trend_submissions",
    )
    .fetch_all(db)
    .await?;

    for (guid, status, approve_count, reject_count, validation_count) in rows {
        let (approves, rejects): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN vote = 'approve' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN vote = 'reject' THEN 1 ELSE 0 END), 0)
            FROM trend_votes
            WHERE submission_guid = ?
            "#,
        )
        .bind(&guid)
        .fetch_one(db)
        .await?;
        let total = approves + rejects;

        let expected_status = if total >= rewards.validation_threshold {
            if approves > rejects {
                "validated"
            } else {
                "rejected"
            }
        } else if total > 0 {
            "validating"
        } else {
            "submitted"
        };

        if approve_count == approves
            && reject_count == rejects
            && validation_count == total
            && status == expected_status
        {
            continue;
        }

        warn!(
            "Submission drift for {}: {}/{}/{} '{}' vs votes {}/{}/{} '{}'",
            guid,
            approve_count,
            reject_count,
            validation_count,
            status,
            approves,
            rejects,
            total,
            expected_status
        );
        sqlx::query(
            r#"
            UPDATE trend_submissions
            SET approve_count = ?, reject_count = ?, validation_count = ?,
                status = ?, updated_at = CURRENT_TIMESTAMP
            WHERE guid = ?
            "#,
        )
        .bind(approves)
        .bind(rejects)
        .bind(total)
        .bind(expected_status)
        .bind(&guid)
        .execute(db)
        .await?;
        report.submissions_repaired += 1;
    }

    Ok(())
}

/// Recompute decision counts from decided submissions and re-evaluate tiers
async fn reconcile_tiers(db: &SqlitePool, report: &mut ReconReport) -> Result<()> {
    let rows: Vec<(String, String, i64, i64)> = sqlx::query_as(
        "SELECT user_guid, performance_tier, approved_count, rejected_count FROM user_profiles",
    )
    .fetch_all(db)
    .await?;

    for (user_guid, tier, approved_count, rejected_count) in rows {
        let (approved, rejected): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN status = 'validated' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'rejected' THEN 1 ELSE 0 END), 0)
            FROM trend_submissions
            WHERE spotter_guid = ?
            "#,
        )
        .bind(&user_guid)
        .fetch_one(db)
        .await?;

        let expected_tier = evaluate_tier(approved, rejected);
        if approved == approved_count
            && rejected == rejected_count
            && expected_tier.as_str() == tier
        {
            continue;
        }

        if expected_tier.as_str() != tier {
            info!(
                "Tier change for {}: {} -> {} ({} approved / {} rejected)",
                user_guid,
                tier,
                expected_tier.as_str(),
                approved,
                rejected
            );
        }
        sqlx::query(
            r#"
            UPDATE user_profiles
            SET approved_count = ?, rejected_count = ?, performance_tier = ?
            WHERE user_guid = ?
            "#,
        )
        .bind(approved)
        .bind(rejected)
        .bind(expected_tier.as_str())
        .bind(&user_guid)
        .execute(db)
        .await?;
        report.tiers_changed += 1;
    }

    Ok(())
}
