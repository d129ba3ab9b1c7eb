//! Session authentication middleware
//!
//! Protected routes require `Authorization: Bearer <token>` where the token
//! is a session issued by login or register. The resolved user guid is
//! stored in request extensions for handlers to extract.

use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;
use uuid::Uuid;
use wavesight_common::auth::lookup_session;
use wavesight_common::Error;

/// Authenticated caller, inserted into request extensions
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

/// Reject requests without a valid session before any handler runs
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| Error::Unauthorized("missing bearer token".to_string()))?
        .to_string();

    let user_guid = lookup_session(&state.db, &token)
        .await?
        .ok_or_else(|| Error::Unauthorized("invalid or expired session".to_string()))?;

    debug!("Authenticated request for user {}", user_guid);
    request.extensions_mut().insert(CurrentUser(user_guid));
    Ok(next.run(request).await)
}
