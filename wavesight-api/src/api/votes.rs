//! Validation vote endpoint

use crate::api::middleware::CurrentUser;
use crate::db;
use crate::db::votes::VoteChoice;
use crate::error::ApiResult;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wavesight_common::db::models::{Submission, Vote};
use wavesight_common::earnings::EarningsBreakdown;
use wavesight_common::events::WaveEvent;

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    /// "approve" or "reject"
    pub vote: String,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub submission: Submission,
    pub finalized: Option<String>,
    pub earnings: EarningsBreakdown,
}

/// POST /api/v1/submissions/:id/votes
pub async fn cast_vote(
    State(state): State<AppState>,
    Extension(CurrentUser(voter)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<VoteRequest>,
) -> ApiResult<(StatusCode, Json<VoteResponse>)> {
    let choice: VoteChoice = req.vote.parse()?;
    let outcome = db::votes::cast_vote(&state.db, &state.rewards, id, voter, choice).await?;

    let spotter = Uuid::parse_str(&outcome.submission.spotter_guid)
        .map_err(|e| wavesight_common::Error::Internal(format!("invalid guid in row: {}", e)))?;
    let now = chrono::Utc::now();
    state.bus.emit_lossy(WaveEvent::VoteCast {
        submission_id: id,
        voter_id: voter,
        vote: choice.as_str().to_string(),
        approve_count: outcome.submission.approve_count,
        reject_count: outcome.submission.reject_count,
        timestamp: now,
    });
    state.bus.emit_lossy(WaveEvent::EarningsAccrued {
        user_id: voter,
        amount: outcome.voter_breakdown.final_amount,
        entry_type: "validation".to_string(),
        timestamp: now,
    });
    state.bus.emit_lossy(WaveEvent::XpAwarded {
        user_id: voter,
        amount: state.rewards.validation_xp,
        event_type: "validation".to_string(),
        timestamp: now,
    });
    if let Some(status) = &outcome.finalized {
        state.bus.emit_lossy(WaveEvent::SubmissionFinalized {
            submission_id: id,
            spotter_id: spotter,
            status: status.clone(),
            approve_count: outcome.submission.approve_count,
            reject_count: outcome.submission.reject_count,
            timestamp: now,
        });
        let (xp_amount, xp_event) = if status == "validated" {
            (state.rewards.approval_xp, "approval_bonus")
        } else {
            (state.rewards.rejection_xp, "rejection")
        };
        state.bus.emit_lossy(WaveEvent::XpAwarded {
            user_id: spotter,
            amount: xp_amount,
            event_type: xp_event.to_string(),
            timestamp: now,
        });
    }
    if let Some((old_tier, new_tier)) = &outcome.tier_change {
        state.bus.emit_lossy(WaveEvent::TierChanged {
            user_id: spotter,
            old_tier: old_tier.clone(),
            new_tier: new_tier.clone(),
            timestamp: now,
        });
    }

    Ok((
        StatusCode::CREATED,
        Json(VoteResponse {
            submission: outcome.submission,
            finalized: outcome.finalized,
            earnings: outcome.voter_breakdown,
        }),
    ))
}

/// GET /api/v1/submissions/:id/votes
pub async fn list_votes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Vote>>> {
    // 404 for unknown submissions rather than an empty list
    db::submissions::get_submission(&state.db, id).await?;
    let votes = db::votes::votes_for_submission(&state.db, id).await?;
    Ok(Json(votes))
}
