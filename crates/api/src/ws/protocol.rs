//! Socket frames.
//!
//! Every frame is a JSON object `{ "event": "<name>", "data": ... }`. Inbound
//! text is decoded once into [`ClientEvent`]; outbound frames are built from
//! [`ServerEvent`].

use std::collections::HashMap;

use axum::extract::ws::Message as WsMessage;
use errand_core::types::DbId;
use errand_db::models::message::{Message, SendMessage};
use errand_db::models::notification::Notification;
use serde::{Deserialize, Serialize};

/// Frames a client may send.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Bind this connection to the authenticated user.
    #[serde(rename = "presence:register")]
    Register { user_id: DbId },
    /// Unbind this connection without closing it.
    #[serde(rename = "presence:unregister")]
    Unregister,
    #[serde(rename = "presence:query")]
    Query { user_ids: Vec<DbId> },
    #[serde(rename = "message:send")]
    SendMessage(SendMessage),
    #[serde(rename = "typing:start")]
    TypingStart { receiver_id: DbId },
    #[serde(rename = "typing:stop")]
    TypingStop { receiver_id: DbId },
}

impl ClientEvent {
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Frames the server sends.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "presence:online")]
    Online { user_id: DbId },
    #[serde(rename = "presence:offline")]
    Offline { user_id: DbId },
    #[serde(rename = "presence:status")]
    Status { statuses: HashMap<DbId, bool> },
    #[serde(rename = "message:receive")]
    MessageReceive(Message),
    /// Acknowledgement to the sender once the message is stored.
    #[serde(rename = "message:sent")]
    MessageSent(Message),
    #[serde(rename = "typing:start")]
    TypingStart { sender_id: DbId },
    #[serde(rename = "typing:stop")]
    TypingStop { sender_id: DbId },
    #[serde(rename = "notification")]
    Notification(Notification),
    #[serde(rename = "error")]
    Error { code: &'static str, message: String },
}

impl ServerEvent {
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        ServerEvent::Error {
            code,
            message: message.into(),
        }
    }

    /// Encode as a text frame.
    pub fn to_frame(&self) -> WsMessage {
        let text = serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to encode server event");
            r#"{"event":"error","data":{"code":"INTERNAL_ERROR","message":"encoding failed"}}"#
                .to_string()
        });
        WsMessage::Text(text.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_register() {
        let event = ClientEvent::decode(r#"{"event":"presence:register","data":{"user_id":7}}"#)
            .unwrap();
        assert!(matches!(event, ClientEvent::Register { user_id: 7 }));
    }

    #[test]
    fn decodes_unit_event_without_data() {
        let event = ClientEvent::decode(r#"{"event":"presence:unregister"}"#).unwrap();
        assert!(matches!(event, ClientEvent::Unregister));
    }

    #[test]
    fn decodes_message_send() {
        let event = ClientEvent::decode(
            r#"{"event":"message:send","data":{"receiver_id":3,"content":"hi","request_id":9}}"#,
        )
        .unwrap();
        match event {
            ClientEvent::SendMessage(msg) => {
                assert_eq!(msg.receiver_id, 3);
                assert_eq!(msg.content, "hi");
                assert_eq!(msg.request_id, Some(9));
                assert_eq!(msg.product_id, None);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_event() {
        assert!(ClientEvent::decode(r#"{"event":"user:login","data":7}"#).is_err());
    }

    #[test]
    fn server_event_uses_event_and_data_keys() {
        let json = serde_json::to_value(ServerEvent::TypingStart { sender_id: 4 }).unwrap();
        assert_eq!(json["event"], "typing:start");
        assert_eq!(json["data"]["sender_id"], 4);

        let json = serde_json::to_value(ServerEvent::error("FORBIDDEN", "nope")).unwrap();
        assert_eq!(json["event"], "error");
        assert_eq!(json["data"]["code"], "FORBIDDEN");
    }
}
