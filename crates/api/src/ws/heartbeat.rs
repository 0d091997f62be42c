use std::sync::Arc;
use std::time::Duration;

use crate::ws::presence::PresenceRegistry;

/// Interval between heartbeat pings (in seconds).
const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Spawn a background task that pings every open socket.
///
/// Runs until aborted at shutdown.
pub fn start_heartbeat(presence: Arc<PresenceRegistry>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));

        loop {
            interval.tick().await;
            let count = presence.connection_count();
            let online = presence.online_count();
            tracing::debug!(count, online, "WebSocket heartbeat ping");
            presence.ping_all();
        }
    })
}
