//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Only committed work is published: the lifecycle services send an
//! [`EventEnvelope`] after their transaction commits. The bus is shared via
//! `Arc<EventBus>`.

use chrono::{DateTime, Utc};
use errand_db::models::notification::Notification;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::event::DomainEvent;

// ---------------------------------------------------------------------------
// EventEnvelope
// ---------------------------------------------------------------------------

/// A committed domain event together with the notifications it created.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    pub event: DomainEvent,
    pub notifications: Vec<Notification>,
    pub occurred_at: DateTime<Utc>,
}

impl EventEnvelope {
    pub fn new(event: DomainEvent, notifications: Vec<Notification>) -> Self {
        Self {
            event,
            notifications,
            occurred_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use errand_events::bus::{EventBus, EventEnvelope};
/// use errand_events::event::DomainEvent;
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(EventEnvelope::new(
///     DomainEvent::RequestCreated {
///         request_id: 1,
///         requester_id: 2,
///         item_name: "Bread".into(),
///     },
///     Vec::new(),
/// ));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unconsumed envelopes are dropped
    /// and slow receivers observe `RecvError::Lagged`. Notifications remain
    /// in the database either way.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an envelope to all current subscribers.
    pub fn publish(&self, envelope: EventEnvelope) {
        tracing::debug!(
            event = envelope.event.event_type(),
            notifications = envelope.notifications.len(),
            "Publishing event"
        );
        // A send error only means there are no receivers.
        let _ = self.sender.send(envelope);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
