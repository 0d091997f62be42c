use std::sync::Arc;

use errand_db::DbPool;
use errand_events::EventBus;
use errand_lifecycle::{ChatService, RatingService, RequestStore};

use crate::config::ServerConfig;
use crate::ws::{MessageRelay, PresenceRegistry};

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone: everything inside is an `Arc` or a pool handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
    pub event_bus: Arc<EventBus>,
    pub presence: Arc<PresenceRegistry>,
    pub requests: RequestStore,
    pub ratings: RatingService,
    pub relay: MessageRelay,
}

impl AppState {
    /// Wire the services around one pool, bus and presence registry.
    pub fn new(
        pool: DbPool,
        config: Arc<ServerConfig>,
        event_bus: Arc<EventBus>,
        presence: Arc<PresenceRegistry>,
    ) -> Self {
        let chat = ChatService::new(pool.clone(), Arc::clone(&event_bus));
        Self {
            requests: RequestStore::new(pool.clone(), Arc::clone(&event_bus)),
            ratings: RatingService::new(pool.clone(), Arc::clone(&event_bus)),
            relay: MessageRelay::new(chat, Arc::clone(&presence)),
            pool,
            config,
            event_bus,
            presence,
        }
    }
}
