use std::sync::Arc;

use errand_events::EventEnvelope;
use tokio::sync::broadcast;

use crate::ws::{PresenceRegistry, ServerEvent};

/// Pushes committed notifications to their owners' open sockets.
///
/// Rows are already stored by the time an envelope reaches the bus, so an
/// offline user loses nothing: the push is best effort on top of the fetch
/// endpoints.
pub struct NotificationPushRouter {
    presence: Arc<PresenceRegistry>,
}

impl NotificationPushRouter {
    pub fn new(presence: Arc<PresenceRegistry>) -> Self {
        Self { presence }
    }

    /// Run the push loop.
    ///
    /// Exits when the channel is closed (i.e. the
    /// [`EventBus`](errand_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<EventEnvelope>) {
        loop {
            match receiver.recv().await {
                Ok(envelope) => {
                    self.route(&envelope);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification push router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification push router shutting down");
                    break;
                }
            }
        }
    }

    /// Push every notification in one envelope. Returns the number of
    /// socket deliveries.
    pub fn route(&self, envelope: &EventEnvelope) -> usize {
        let mut delivered = 0;
        for notification in &envelope.notifications {
            let user_id = notification.user_id;
            delivered += self.presence.send_to_user(
                user_id,
                ServerEvent::Notification(notification.clone()).to_frame(),
            );
        }
        tracing::debug!(
            event_type = envelope.event.event_type(),
            notifications = envelope.notifications.len(),
            delivered,
            "Routed event notifications"
        );
        delivered
    }
}
