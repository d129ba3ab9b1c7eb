//! Event stream endpoint

use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use wavesight_common::sse::event_bus_sse_stream;

/// GET /api/v1/events - SSE stream of domain events
pub async fn event_stream(State(state): State<AppState>) -> impl IntoResponse {
    event_bus_sse_stream(state.bus.clone(), "wavesight-api")
}
