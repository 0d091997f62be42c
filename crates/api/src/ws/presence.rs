use std::collections::{HashMap, HashSet};
use std::fmt;

use axum::body::Bytes;
use axum::extract::ws::Message;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use errand_core::types::DbId;
use tokio::sync::mpsc;

use crate::ws::protocol::ServerEvent;

/// Channel sender half for pushing frames to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Opaque handle for one open socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(uuid::Uuid);

impl ConnId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ConnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Effect of a register/unregister call on the user's presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTransition {
    /// First connection for the user.
    Online,
    /// Last connection for the user went away.
    Offline,
    Unchanged,
}

/// Tracks open sockets and which users they belong to.
///
/// A user is online while at least one of their connections is registered.
/// All maps are sharded, so registrations for unrelated users never contend
/// on a single lock. Created once per process, shared behind `Arc`, and torn
/// down with [`PresenceRegistry::shutdown_all`].
pub struct PresenceRegistry {
    connections: DashMap<ConnId, WsSender>,
    owners: DashMap<ConnId, DbId>,
    by_user: DashMap<DbId, HashSet<ConnId>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            owners: DashMap::new(),
            by_user: DashMap::new(),
        }
    }

    /// Track a freshly upgraded socket.
    ///
    /// Returns the receiver half so the caller can forward frames to the
    /// socket sink. The connection is anonymous until [`register`] binds it.
    ///
    /// [`register`]: PresenceRegistry::register
    pub fn connect(&self, conn: ConnId) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.insert(conn, tx);
        rx
    }

    /// Unregister and forget a socket.
    pub fn disconnect(&self, conn: ConnId) -> PresenceTransition {
        let transition = self.unregister(conn);
        self.connections.remove(&conn);
        transition
    }

    /// Bind `conn` to `user`, broadcasting `presence:online` when this is
    /// the user's first connection.
    pub fn register(&self, user: DbId, conn: ConnId) -> PresenceTransition {
        if !self.connections.contains_key(&conn) {
            tracing::warn!(%conn, user_id = user, "Register for unknown connection ignored");
            return PresenceTransition::Unchanged;
        }

        match self.owners.entry(conn) {
            Entry::Occupied(existing) => {
                let owner = *existing.get();
                if owner != user {
                    tracing::warn!(%conn, owner, user_id = user, "Connection already bound to another user");
                }
                return PresenceTransition::Unchanged;
            }
            Entry::Vacant(slot) => {
                slot.insert(user);
            }
        }

        let mut conns = self.by_user.entry(user).or_default();
        conns.insert(conn);
        if conns.len() == 1 {
            self.broadcast(ServerEvent::Online { user_id: user }.to_frame());
            tracing::debug!(user_id = user, "User online");
            PresenceTransition::Online
        } else {
            PresenceTransition::Unchanged
        }
    }

    /// Unbind `conn` from whichever user holds it.
    ///
    /// Unknown or never-registered handles are a no-op.
    pub fn unregister(&self, conn: ConnId) -> PresenceTransition {
        let Some((_, user)) = self.owners.remove(&conn) else {
            return PresenceTransition::Unchanged;
        };

        match self.by_user.entry(user) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().remove(&conn);
                if entry.get().is_empty() {
                    self.broadcast(ServerEvent::Offline { user_id: user }.to_frame());
                    entry.remove();
                    tracing::debug!(user_id = user, "User offline");
                    PresenceTransition::Offline
                } else {
                    PresenceTransition::Unchanged
                }
            }
            Entry::Vacant(_) => PresenceTransition::Unchanged,
        }
    }

    /// Online status for each requested user.
    pub fn query_batch(&self, users: &[DbId]) -> HashMap<DbId, bool> {
        users
            .iter()
            .map(|&user| (user, self.by_user.contains_key(&user)))
            .collect()
    }

    pub fn is_online(&self, user: DbId) -> bool {
        self.by_user.contains_key(&user)
    }

    /// User bound to a connection, if any.
    pub fn owner_of(&self, conn: ConnId) -> Option<DbId> {
        self.owners.get(&conn).map(|owner| *owner)
    }

    /// Push a frame to every registered connection of `user`.
    ///
    /// Returns the number of connections the frame was queued on.
    pub fn send_to_user(&self, user: DbId, message: Message) -> usize {
        let targets: Vec<ConnId> = match self.by_user.get(&user) {
            Some(conns) => conns.iter().copied().collect(),
            None => return 0,
        };

        targets
            .into_iter()
            .filter(|conn| self.send_to_connection(*conn, message.clone()))
            .count()
    }

    /// Push a frame to one connection. Returns `false` if it is gone.
    pub fn send_to_connection(&self, conn: ConnId, message: Message) -> bool {
        match self.connections.get(&conn) {
            Some(sender) => sender.send(message).is_ok(),
            None => false,
        }
    }

    /// Push a frame to every open connection, registered or not.
    ///
    /// Closed channels are skipped; their sockets clean up on the next
    /// receive loop iteration.
    pub fn broadcast(&self, message: Message) {
        for sender in self.connections.iter() {
            let _ = sender.send(message.clone());
        }
    }

    pub fn ping_all(&self) {
        self.broadcast(Message::Ping(Bytes::new()));
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn online_count(&self) -> usize {
        self.by_user.len()
    }

    /// Send a Close frame to every connection, then clear all state.
    pub fn shutdown_all(&self) {
        let count = self.connections.len();
        for sender in self.connections.iter() {
            let _ = sender.send(Message::Close(None));
        }
        self.connections.clear();
        self.owners.clear();
        self.by_user.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
