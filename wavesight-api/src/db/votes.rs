//! Validation vote casting and submission finalization
//!
//! The vote row and the counters on the submission move in one transaction,
//! so `validation_count == approve_count + reject_count` holds at every
//! commit point and a duplicate vote rolls back without touching counters.
//! Accruals for the voter and the author land after the commit; the
//! reconciliation job repairs any gap left by a crash between the two.

use crate::db::{ledger, profiles, xp_events};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;
use wavesight_common::db::models::{Submission, Vote};
use wavesight_common::earnings::{self, EarningsBreakdown, EntryStatus, EntryType};
use wavesight_common::rewards::RewardsConfig;
use wavesight_common::{Error, Result};

/// A validation vote direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChoice {
    Approve,
    Reject,
}

impl VoteChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteChoice::Approve => "approve",
            VoteChoice::Reject => "reject",
        }
    }
}

impl FromStr for VoteChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "approve" => Ok(VoteChoice::Approve),
            "reject" => Ok(VoteChoice::Reject),
            other => Err(Error::InvalidInput(format!(
                "vote must be 'approve' or 'reject', got '{}'",
                other
            ))),
        }
    }
}

/// Result of a recorded vote
#[derive(Debug)]
pub struct VoteOutcome {
    /// Submission state after the vote
    pub submission: Submission,
    /// Terminal status reached by this vote, if any
    pub finalized: Option<String>,
    /// Voter's validation accrual
    pub voter_breakdown: EarningsBreakdown,
    /// Author tier change triggered by finalization, as (old, new)
    pub tier_change: Option<(String, String)>,
}

/// Record a validation vote and finalize the submission at the threshold
pub async fn cast_vote(
    db: &SqlitePool,
    rewards: &RewardsConfig,
    submission_guid: Uuid,
    voter_guid: Uuid,
    choice: VoteChoice,
) -> Result<VoteOutcome> {
    let mut tx = db.begin().await?;

    let row: Option<(String, String)> =
        sqlx::query_as("SELECT spotter_guid, status FROM trend_submissions WHERE guid = ?")
            .bind(submission_guid.to_string())
            .fetch_optional(&mut *tx)
            .await?;
    let (spotter_guid, status) =
        row.ok_or_else(|| Error::NotFound(format!("submission {}", submission_guid)))?;
    let spotter_guid = Uuid::parse_str(&spotter_guid)
        .map_err(|e| Error::Internal(format!("invalid spotter guid: {}", e)))?;

    if spotter_guid == voter_guid {
        return Err(Error::SelfVote(submission_guid));
    }
    if status == "validated" || status == "rejected" {
        return Err(Error::AlreadyFinalized {
            submission: submission_guid,
            status,
        });
    }

    let insert = sqlx::query(
        "INSERT INTO trend_votes (guid, submission_guid, voter_guid, vote) VALUES (?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(submission_guid.to_string())
    .bind(voter_guid.to_string())
    .bind(choice.as_str())
    .execute(&mut *tx)
    .await;
    if let Err(e) = insert {
        if e.as_database_error()
            .map(|d| d.is_unique_violation())
            .unwrap_or(false)
        {
            return Err(Error::DuplicateVote {
                submission: submission_guid,
                voter: voter_guid,
            });
        }
        return Err(e.into());
    }

    let (approve_delta, reject_delta) = match choice {
        VoteChoice::Approve => (1, 0),
        VoteChoice::Reject => (0, 1),
    };
    sqlx::query(
        r#"
        UPDATE trend_submissions
        SET approve_count = approve_count + ?,
            reject_count = reject_count + ?,
            validation_count = validation_count + 1,
            status = CASE WHEN status = 'submitted' THEN 'validating' ELSE status END,
            updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(approve_delta)
    .bind(reject_delta)
    .bind(submission_guid.to_string())
    .execute(&mut *tx)
    .await?;

    let (approve_count, reject_count, validation_count): (i64, i64, i64) = sqlx::query_as(
        "SELECT approve_count, reject_count, validation_count FROM trend_submissions WHERE guid = ?",
    )
    .bind(submission_guid.to_string())
    .fetch_one(&mut *tx)
    .await?;

    // Strict majority of approvals validates; ties and minorities reject.
    let finalized = if validation_count >= rewards.validation_threshold {
        let final_status = if approve_count > reject_count {
            "validated"
        } else {
            "rejected"
        };
        sqlx::query(
            "UPDATE trend_submissions SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
        )
        .bind(final_status)
        .bind(submission_guid.to_string())
        .execute(&mut *tx)
        .await?;
        Some(final_status.to_string())
    } else {
        None
    };

    tx.commit().await?;

    let (voter_breakdown, tier_change) =
        accrue_vote_rewards(db, rewards, submission_guid, voter_guid, spotter_guid, &finalized)
            .await?;

    if let Some(status) = &finalized {
        info!(
            "✓ Submission {} finalized as {} ({} approve / {} reject)",
            submission_guid, status, approve_count, reject_count
        );
    }

    let submission = super::submissions::get_submission(db, submission_guid).await?;
    Ok(VoteOutcome {
        submission,
        finalized,
        voter_breakdown,
        tier_change,
    })
}

/// List the votes recorded against a submission, oldest first
pub async fn votes_for_submission(db: &SqlitePool, submission_guid: Uuid) -> Result<Vec<Vote>> {
    let votes = sqlx::query_as::<_, Vote>(
        r#"
        SELECT guid, submission_guid, voter_guid, vote, created_at
        FROM trend_votes
        WHERE submission_guid = ?
        ORDER BY created_at ASC, guid ASC
        "#,
    )
    .bind(submission_guid.to_string())
    .fetch_all(db)
    .await?;

    Ok(votes)
}

/// Append the voter's accrual and, on finalization, the author's bonus or
/// penalty and their decision counters
async fn accrue_vote_rewards(
    db: &SqlitePool,
    rewards: &RewardsConfig,
    submission_guid: Uuid,
    voter_guid: Uuid,
    spotter_guid: Uuid,
    finalized: &Option<String>,
) -> Result<(EarningsBreakdown, Option<(String, String)>)> {
    let voter_tier = profiles::tier_of(&profiles::get_profile(db, voter_guid).await?);
    let voter_breakdown = earnings::validation_earnings(rewards, voter_tier);

    let mut tx = db.begin().await?;
    ledger::append_entry(
        &mut *tx,
        voter_guid,
        EntryType::Validation,
        EntryStatus::Pending,
        &voter_breakdown,
        Some(submission_guid),
    )
    .await?;
    xp_events::append_event(
        &mut *tx,
        voter_guid,
        rewards.validation_xp,
        "validation",
        Some(submission_guid),
    )
    .await?;

    let mut tier_change = None;
    match finalized.as_deref() {
        Some("validated") => {
            let author_tier = profiles::tier_of(&profiles::get_profile(db, spotter_guid).await?);
            let bonus = earnings::approval_bonus(rewards, author_tier);
            ledger::append_entry(
                &mut *tx,
                spotter_guid,
                EntryType::Bonus,
                EntryStatus::Pending,
                &bonus,
                Some(submission_guid),
            )
            .await?;
            xp_events::append_event(
                &mut *tx,
                spotter_guid,
                rewards.approval_xp,
                "approval_bonus",
                Some(submission_guid),
            )
            .await?;
            tier_change = profiles::record_decision(&mut *tx, spotter_guid, true).await?;
        }
        Some("rejected") => {
            xp_events::append_event(
                &mut *tx,
                spotter_guid,
                rewards.rejection_xp,
                "rejection",
                Some(submission_guid),
            )
            .await?;
            tier_change = profiles::record_decision(&mut *tx, spotter_guid, false).await?;
        }
        _ => {}
    }
    tx.commit().await?;

    Ok((voter_breakdown, tier_change))
}
