//! Real-time layer: WebSocket transport, presence, relay and heartbeat.

mod handler;
mod heartbeat;
pub mod presence;
pub mod protocol;
pub mod relay;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use presence::{ConnId, PresenceRegistry, PresenceTransition};
pub use protocol::{ClientEvent, ServerEvent};
pub use relay::MessageRelay;
