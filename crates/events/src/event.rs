//! Typed domain events emitted by lifecycle transitions, chat and ratings.

use errand_core::types::DbId;
use serde::Serialize;

/// Something that changed in the errand domain.
///
/// Each variant carries exactly the identifiers its subscribers need, so
/// neither the ledger nor the fan-out has to re-read the triggering row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    RequestCreated {
        request_id: DbId,
        requester_id: DbId,
        item_name: String,
    },
    RequestAccepted {
        request_id: DbId,
        requester_id: DbId,
        fulfiller_id: DbId,
        item_name: String,
    },
    RequestCompleted {
        request_id: DbId,
        requester_id: DbId,
        fulfiller_id: DbId,
        item_name: String,
    },
    /// Cancelled by the requester. `fulfiller_id` is the fulfiller that was
    /// assigned at the time, if any.
    RequestCancelled {
        request_id: DbId,
        requester_id: DbId,
        fulfiller_id: Option<DbId>,
        item_name: String,
    },
    /// The assigned fulfiller withdrew.
    DeliveryCancelled {
        request_id: DbId,
        requester_id: DbId,
        fulfiller_id: DbId,
        item_name: String,
    },
    MessageSent {
        message_id: DbId,
        sender_id: DbId,
        sender_name: String,
        receiver_id: DbId,
    },
    RatingSubmitted {
        rating_id: DbId,
        rater_id: DbId,
        rated_user_id: DbId,
        transaction_type: &'static str,
        transaction_id: DbId,
        score: i16,
    },
}

impl DomainEvent {
    /// Dot-separated event name used in logs.
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::RequestCreated { .. } => "request.created",
            DomainEvent::RequestAccepted { .. } => "request.accepted",
            DomainEvent::RequestCompleted { .. } => "request.completed",
            DomainEvent::RequestCancelled { .. } => "request.cancelled",
            DomainEvent::DeliveryCancelled { .. } => "request.delivery_cancelled",
            DomainEvent::MessageSent { .. } => "message.sent",
            DomainEvent::RatingSubmitted { .. } => "rating.submitted",
        }
    }

    /// The user whose action produced the event.
    pub fn actor_id(&self) -> DbId {
        match self {
            DomainEvent::RequestCreated { requester_id, .. }
            | DomainEvent::RequestCancelled { requester_id, .. } => *requester_id,
            DomainEvent::RequestAccepted { fulfiller_id, .. }
            | DomainEvent::RequestCompleted { fulfiller_id, .. }
            | DomainEvent::DeliveryCancelled { fulfiller_id, .. } => *fulfiller_id,
            DomainEvent::MessageSent { sender_id, .. } => *sender_id,
            DomainEvent::RatingSubmitted { rater_id, .. } => *rater_id,
        }
    }
}
