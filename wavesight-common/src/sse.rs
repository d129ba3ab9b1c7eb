//! Server-Sent Events (SSE) utilities
//!
//! Bridges the EventBus onto an axum SSE response with heartbeats.

use crate::events::EventBus;
use axum::response::sse::{Event, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Create an SSE stream relaying WaveEvents from the bus
///
/// Sends an initial `ConnectionStatus` event, then each domain event as a
/// JSON payload tagged with its variant name. Lagged receivers skip dropped
/// events and continue.
pub fn event_bus_sse_stream(
    bus: Arc<EventBus>,
    service_name: &'static str,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to {} events", service_name);
    let mut rx = bus.subscribe();

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        debug!("SSE: relaying event to {} client", service_name);
                        yield Ok(Event::default().event("WaveEvent").data(json));
                    }
                    Err(e) => warn!("SSE: failed to serialize event: {}", e),
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("SSE: client lagged, skipped {} events", skipped);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}
