//! Registration and login endpoints

use crate::error::ApiResult;
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use wavesight_common::auth;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub token: String,
}

/// POST /api/v1/auth/register - create a user and issue a session
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let user_id = auth::create_user(&state.db, &req.username, &req.password).await?;
    let token = auth::create_session(&state.db, user_id).await?;
    info!("✓ Registered user '{}' ({})", req.username.trim(), user_id);
    Ok((StatusCode::CREATED, Json(AuthResponse { user_id, token })))
}

/// POST /api/v1/auth/login - verify credentials and issue a session
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user_id = auth::verify_password(&state.db, &req.username, &req.password).await?;
    let token = auth::create_session(&state.db, user_id).await?;
    Ok(Json(AuthResponse { user_id, token }))
}
