//! Health check endpoint

use axum::Json;
use serde_json::{json, Value};

/// GET /health - liveness probe, no authentication
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "module": "wavesight-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
