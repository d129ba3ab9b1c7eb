//! XP endpoint

use crate::api::middleware::CurrentUser;
use crate::db::xp_events;
use crate::error::ApiResult;
use crate::AppState;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;
use wavesight_common::db::models::XpEvent;
use wavesight_common::xp::{progress_for_xp, LevelProgress};

const XP_PAGE_SIZE: i64 = 100;

#[derive(Debug, Serialize)]
pub struct XpResponse {
    pub progress: LevelProgress,
    pub events: Vec<XpEvent>,
}

/// GET /api/v1/xp - caller's XP events and level progress
pub async fn get_xp(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<XpResponse>> {
    let total = xp_events::total_for_user(&state.db, user).await?;
    let events = xp_events::events_for_user(&state.db, user, XP_PAGE_SIZE).await?;
    Ok(Json(XpResponse {
        progress: progress_for_xp(total),
        events,
    }))
}
