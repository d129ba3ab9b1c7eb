//! Earnings ledger access
//!
//! The ledger is append-only: rows are inserted and never updated by the
//! API. Profile earnings columns are bumped alongside each append so reads
//! stay cheap; the reconciliation job recomputes them from the ledger when
//! drift occurs.

use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;
use wavesight_common::db::models::LedgerEntry;
use wavesight_common::earnings::{EarningsBreakdown, EntryStatus, EntryType};
use wavesight_common::Result;

/// Derived per-status earnings totals
#[derive(Debug, Clone, Serialize)]
pub struct EarningsTotals {
    pub total_earned: f64,
    pub pending: f64,
    pub approved: f64,
    pub paid: f64,
}

/// Append a ledger row and bump the user's profile earnings columns
pub async fn append_entry(
    conn: &mut SqliteConnection,
    user_guid: Uuid,
    entry_type: EntryType,
    status: EntryStatus,
    breakdown: &EarningsBreakdown,
    submission_guid: Option<Uuid>,
) -> Result<Uuid> {
    let guid = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO earnings_ledger (guid, user_guid, amount, entry_type, status, submission_guid, metadata)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(guid.to_string())
    .bind(user_guid.to_string())
    .bind(breakdown.final_amount)
    .bind(entry_type.as_str())
    .bind(status.as_str())
    .bind(submission_guid.map(|g| g.to_string()))
    .bind(breakdown.to_metadata().to_string())
    .execute(&mut *conn)
    .await?;

    let pending_delta = if status == EntryStatus::Pending {
        breakdown.final_amount
    } else {
        0.0
    };
    let paid_delta = if status == EntryStatus::Paid {
        breakdown.final_amount
    } else {
        0.0
    };
    sqlx::query(
        r#"
        UPDATE user_profiles
        SET total_earned = total_earned + ?,
            pending_earnings = pending_earnings + ?,
            paid_earnings = paid_earnings + ?
        WHERE user_guid = ?
        "#,
    )
    .bind(breakdown.final_amount)
    .bind(pending_delta)
    .bind(paid_delta)
    .bind(user_guid.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(guid)
}

/// List a user's ledger rows, newest first
pub async fn entries_for_user(
    db: &SqlitePool,
    user_guid: Uuid,
    limit: i64,
) -> Result<Vec<LedgerEntry>> {
    let entries = sqlx::query_as::<_, LedgerEntry>(
        r#"
        SELECT guid, user_guid, amount, entry_type, status, submission_guid, metadata, created_at
        FROM earnings_ledger
        WHERE user_guid = ?
        ORDER BY created_at DESC, guid DESC
        LIMIT ?
        "#,
    )
    .bind(user_guid.to_string())
    .bind(limit)
    .fetch_all(db)
    .await?;

    Ok(entries)
}

/// Sum a user's ledger by status
pub async fn totals_for_user(db: &SqlitePool, user_guid: Uuid) -> Result<EarningsTotals> {
    let (total, pending, approved, paid): (f64, f64, f64, f64) = sqlx::query_as(
        r#"
        SELECT
            COALESCE(SUM(amount), 0.0),
            COALESCE(SUM(CASE WHEN status = 'pending' THEN amount ELSE 0.0 END), 0.0),
            COALESCE(SUM(CASE WHEN status = 'approved' THEN amount ELSE 0.0 END), 0.0),
            COALESCE(SUM(CASE WHEN status = 'paid' THEN amount ELSE 0.0 END), 0.0)
        FROM earnings_ledger
        WHERE user_guid = ?
        "#,
    )
    .bind(user_guid.to_string())
    .fetch_one(db)
    .await?;

    Ok(EarningsTotals {
        total_earned: total,
        pending,
        approved,
        paid,
    })
}
