//! Earnings endpoint

use crate::api::middleware::CurrentUser;
use crate::db::ledger;
use crate::error::ApiResult;
use crate::AppState;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;
use wavesight_common::db::models::LedgerEntry;

const LEDGER_PAGE_SIZE: i64 = 100;

#[derive(Debug, Serialize)]
pub struct EarningsResponse {
    pub totals: ledger::EarningsTotals,
    pub entries: Vec<LedgerEntry>,
}

/// GET /api/v1/earnings - caller's ledger rows and derived totals
///
/// Totals are summed from the ledger on each read rather than taken from
/// the profile snapshot, so this endpoint never shows drift.
pub async fn get_earnings(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<EarningsResponse>> {
    let totals = ledger::totals_for_user(&state.db, user).await?;
    let entries = ledger::entries_for_user(&state.db, user, LEDGER_PAGE_SIZE).await?;
    Ok(Json(EarningsResponse { totals, entries }))
}
