//! wavesight-api library - HTTP service for the WaveSight core
//!
//! Owns the authoritative submission state machine and the transactional
//! vote tally. Everything except the health endpoint and the auth routes
//! requires a session token.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use wavesight_common::events::EventBus;
use wavesight_common::rewards::RewardsConfig;

pub mod api;
pub mod db;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event bus feeding SSE clients
    pub bus: Arc<EventBus>,
    /// Typed rewards configuration, loaded at startup
    pub rewards: Arc<RewardsConfig>,
}

impl AppState {
    pub fn new(db: SqlitePool, bus: Arc<EventBus>, rewards: RewardsConfig) -> Self {
        Self {
            db,
            bus,
            rewards: Arc::new(rewards),
        }
    }
}

/// Build application router
///
/// Protected routes require a Bearer session token; unauthenticated
/// requests are rejected before any database write.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let protected = Router::new()
        .route("/api/v1/submissions", post(api::submissions::create_submission))
        .route("/api/v1/submissions", get(api::submissions::list_submissions))
        .route("/api/v1/submissions/:id", get(api::submissions::get_submission))
        .route("/api/v1/submissions/:id/votes", post(api::votes::cast_vote))
        .route("/api/v1/submissions/:id/votes", get(api::votes::list_votes))
        .route("/api/v1/earnings", get(api::earnings::get_earnings))
        .route("/api/v1/xp", get(api::xp::get_xp))
        .route("/api/v1/profile", get(api::profile::get_profile))
        .route("/api/v1/events", get(api::sse::event_stream))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::middleware::require_session,
        ));

    let public = Router::new()
        .route("/health", get(api::health::health))
        .route("/api/v1/auth/register", post(api::auth::register))
        .route("/api/v1/auth/login", post(api::auth::login));

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
