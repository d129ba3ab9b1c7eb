//! Trend submission endpoints

use crate::api::middleware::CurrentUser;
use crate::db;
use crate::db::submissions::NewSubmission;
use crate::error::ApiResult;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wavesight_common::db::models::Submission;
use wavesight_common::earnings::EarningsBreakdown;
use wavesight_common::events::WaveEvent;
use wavesight_common::{Error, Result};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    #[serde(flatten)]
    pub submission: Submission,
    pub earnings: EarningsBreakdown,
    pub session_streak: i64,
    pub daily_streak: i64,
}

/// POST /api/v1/submissions
pub async fn create_submission(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<NewSubmission>,
) -> ApiResult<(StatusCode, Json<SubmissionResponse>)> {
    let created =
        db::submissions::create_submission(&state.db, &state.rewards, user, payload).await?;

    let spotter = parse_guid(&created.submission.spotter_guid)?;
    let submission_id = parse_guid(&created.submission.guid)?;
    let now = chrono::Utc::now();
    state.bus.emit_lossy(WaveEvent::SubmissionReceived {
        submission_id,
        spotter_id: spotter,
        category: created.submission.category.clone(),
        timestamp: now,
    });
    state.bus.emit_lossy(WaveEvent::EarningsAccrued {
        user_id: spotter,
        amount: created.breakdown.final_amount,
        entry_type: "submission".to_string(),
        timestamp: now,
    });
    state.bus.emit_lossy(WaveEvent::XpAwarded {
        user_id: spotter,
        amount: state.rewards.submission_xp,
        event_type: "submission".to_string(),
        timestamp: now,
    });

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse {
            submission: created.submission,
            earnings: created.breakdown,
            session_streak: created.session_streak,
            daily_streak: created.daily_streak,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/submissions
pub async fn list_submissions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Submission>>> {
    if let Some(status) = &query.status {
        if !matches!(status.as_str(), "submitted" | "validating" | "validated" | "rejected") {
            return Err(Error::InvalidInput(format!("unknown status '{}'", status)).into());
        }
    }
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    let submissions =
        db::submissions::list_submissions(&state.db, query.status.as_deref(), limit, offset)
            .await?;
    Ok(Json(submissions))
}

/// GET /api/v1/submissions/:id
pub async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Submission>> {
    let submission = db::submissions::get_submission(&state.db, id).await?;
    Ok(Json(submission))
}

fn parse_guid(guid: &str) -> Result<Uuid> {
    Uuid::parse_str(guid).map_err(|e| Error::Internal(format!("invalid guid in row: {}", e)))
}
