//! HTTP error mapping for the API service
//!
//! Wraps the shared error type so handlers can use `?` on database and
//! domain operations and still produce the right status code and a JSON
//! `{"error": ...}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;
use wavesight_common::Error;

/// Result alias for HTTP handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Error wrapper carrying HTTP semantics
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError(Error::Database(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::DuplicateVote { .. } | Error::SelfVote(_) | Error::AlreadyFinalized { .. } => {
                StatusCode::CONFLICT
            }
            Error::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Error::Database(_) | Error::Io(_) | Error::Config(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status_for(e: Error) -> StatusCode {
        ApiError(e).into_response().status()
    }

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        assert_eq!(
            status_for(Error::NotFound("submission".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(Error::InvalidInput("too short".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(Error::Unauthorized("no token".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(Error::SelfVote(Uuid::new_v4())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(Error::DuplicateVote {
                submission: Uuid::new_v4(),
                voter: Uuid::new_v4(),
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(Error::RateLimited { count: 20, limit: 20 }),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_for(Error::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
