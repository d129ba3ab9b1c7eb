//! Event types for the WaveSight event system
//!
//! Provides shared event definitions and the EventBus used by the API
//! service to notify SSE clients and background listeners.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// WaveSight event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WaveEvent {
    /// A new trend submission was accepted
    SubmissionReceived {
        submission_id: Uuid,
        spotter_id: Uuid,
        category: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A validation vote was recorded
    VoteCast {
        submission_id: Uuid,
        voter_id: Uuid,
        /// "approve" or "reject"
        vote: String,
        approve_count: i64,
        reject_count: i64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A submission crossed the vote threshold and reached a terminal status
    SubmissionFinalized {
        submission_id: Uuid,
        spotter_id: Uuid,
        /// "validated" or "rejected"
        status: String,
        approve_count: i64,
        reject_count: i64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A ledger row was appended for a user
    EarningsAccrued {
        user_id: Uuid,
        amount: f64,
        entry_type: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// An XP event was appended for a user
    XpAwarded {
        user_id: Uuid,
        amount: i64,
        event_type: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A user's performance tier changed during reconciliation
    TierChanged {
        user_id: Uuid,
        old_tier: String,
        new_tier: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Broadcast bus distributing WaveEvents to all subscribers
pub struct EventBus {
    tx: broadcast::Sender<WaveEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// Old events are dropped for lagging receivers once the buffer fills.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<WaveEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Domain events are advisory; the flows that emit them have already
    /// committed their database writes.
    pub fn emit_lossy(&self, event: WaveEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
