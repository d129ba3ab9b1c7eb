//! Profile endpoint

use crate::api::middleware::CurrentUser;
use crate::db::profiles;
use crate::error::ApiResult;
use crate::AppState;
use axum::extract::State;
use axum::{Extension, Json};
use wavesight_common::db::models::UserProfile;

/// GET /api/v1/profile - caller's denormalized profile snapshot
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<UserProfile>> {
    let profile = profiles::get_profile(&state.db, user).await?;
    Ok(Json(profile))
}
