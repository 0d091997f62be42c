use std::sync::Arc;

use errand_core::roles::Actor;
use errand_core::types::DbId;
use errand_db::models::message::{Message, SendMessage};
use errand_lifecycle::{ChatService, LifecycleError};

use crate::ws::presence::{ConnId, PresenceRegistry};
use crate::ws::protocol::ServerEvent;

/// Live delivery of chat messages and typing signals.
///
/// Persistence and authorization live in [`ChatService`]; the relay adds
/// the push to whichever of the receiver's sockets are open.
#[derive(Clone)]
pub struct MessageRelay {
    chat: ChatService,
    presence: Arc<PresenceRegistry>,
}

impl MessageRelay {
    pub fn new(chat: ChatService, presence: Arc<PresenceRegistry>) -> Self {
        Self { chat, presence }
    }

    pub fn chat(&self) -> &ChatService {
        &self.chat
    }

    /// Store a message, push it to the receiver and acknowledge the sender.
    ///
    /// `origin` is the socket the message arrived on; the ack goes there
    /// only. Messages sent over HTTP have no origin, so every socket of the
    /// sender receives the ack.
    pub async fn send(
        &self,
        actor: Actor,
        origin: Option<ConnId>,
        input: &SendMessage,
    ) -> Result<Message, LifecycleError> {
        let message = self.chat.send(actor, input).await?;

        let delivered = self.presence.send_to_user(
            message.receiver_id,
            ServerEvent::MessageReceive(message.clone()).to_frame(),
        );
        tracing::debug!(
            message_id = message.id,
            receiver_id = message.receiver_id,
            delivered,
            "Relayed message"
        );

        let ack = ServerEvent::MessageSent(message.clone()).to_frame();
        match origin {
            Some(conn) => {
                self.presence.send_to_connection(conn, ack);
            }
            None => {
                self.presence.send_to_user(actor.user_id, ack);
            }
        }

        Ok(message)
    }

    /// Forward a typing indicator. Dropped when the receiver is offline.
    ///
    /// Returns whether the signal was forwarded.
    pub fn typing(&self, sender: DbId, receiver: DbId, started: bool) -> bool {
        if sender == receiver || !self.presence.is_online(receiver) {
            return false;
        }
        let event = if started {
            ServerEvent::TypingStart { sender_id: sender }
        } else {
            ServerEvent::TypingStop { sender_id: sender }
        };
        self.presence.send_to_user(receiver, event.to_frame()) > 0
    }
}
