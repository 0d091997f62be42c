//! Notification fan-out.
//!
//! [`NotificationFanout::plan`] maps an event to the notifications it
//! produces; [`NotificationFanout::deliver`] writes them inside the caller's
//! transaction so they commit or roll back with the triggering change.

use errand_core::incentive::TRANSACTION_PRODUCT;
use errand_core::notification::{Audience, NotificationCategory};
use errand_core::roles::Role;
use errand_db::models::notification::{Notification, NotificationDraft};
use errand_db::repositories::{NotificationRepo, UserRepo};
use sqlx::PgConnection;

use crate::event::DomainEvent;

/// A notification addressed to an audience, not yet written.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedNotification {
    pub audience: Audience,
    pub draft: NotificationDraft,
}

impl PlannedNotification {
    fn new(
        audience: Audience,
        category: NotificationCategory,
        title: &str,
        message: String,
        related_id: i64,
    ) -> Self {
        Self {
            audience,
            draft: NotificationDraft {
                category,
                title: title.to_string(),
                message,
                related_id: Some(related_id),
            },
        }
    }
}

/// Writes one notification per interested party.
pub struct NotificationFanout;

impl NotificationFanout {
    /// Recipient rules for every event.
    pub fn plan(event: &DomainEvent) -> Vec<PlannedNotification> {
        use NotificationCategory::{Message, Product, Request};

        match event {
            DomainEvent::RequestCreated {
                request_id,
                item_name,
                ..
            } => vec![PlannedNotification::new(
                Audience::VerifiedRole(Role::DayScholar),
                Request,
                "New Item Request",
                format!("A new request for {item_name} has been posted."),
                *request_id,
            )],
            DomainEvent::RequestAccepted {
                request_id,
                requester_id,
                item_name,
                ..
            } => vec![PlannedNotification::new(
                Audience::User(*requester_id),
                Request,
                "Request Accepted",
                format!("Your request for {item_name} has been accepted by a day scholar."),
                *request_id,
            )],
            DomainEvent::RequestCompleted {
                request_id,
                requester_id,
                item_name,
                ..
            } => vec![PlannedNotification::new(
                Audience::User(*requester_id),
                Request,
                "Request Completed",
                format!("Your request for {item_name} has been completed."),
                *request_id,
            )],
            DomainEvent::RequestCancelled {
                request_id,
                fulfiller_id,
                item_name,
                ..
            } => fulfiller_id
                .map(|fulfiller_id| {
                    PlannedNotification::new(
                        Audience::User(fulfiller_id),
                        Request,
                        "Request Cancelled",
                        format!(
                            "The request for {item_name} has been cancelled by the requester."
                        ),
                        *request_id,
                    )
                })
                .into_iter()
                .collect(),
            DomainEvent::DeliveryCancelled {
                request_id,
                requester_id,
                item_name,
                ..
            } => vec![PlannedNotification::new(
                Audience::User(*requester_id),
                Request,
                "Delivery Cancelled",
                format!(
                    "The delivery for your request \"{item_name}\" has been cancelled by the \
                     day scholar. Your request has been cancelled."
                ),
                *request_id,
            )],
            DomainEvent::MessageSent {
                message_id,
                sender_name,
                receiver_id,
                ..
            } => vec![PlannedNotification::new(
                Audience::User(*receiver_id),
                Message,
                "New Message",
                format!("You have a new message from {sender_name}."),
                *message_id,
            )],
            DomainEvent::RatingSubmitted {
                rated_user_id,
                transaction_type,
                transaction_id,
                ..
            } => {
                let (category, subject) = if *transaction_type == TRANSACTION_PRODUCT {
                    (Product, "a product transaction")
                } else {
                    (Request, "a request")
                };
                vec![PlannedNotification::new(
                    Audience::User(*rated_user_id),
                    category,
                    "New Rating",
                    format!("You have received a new rating for {subject}."),
                    *transaction_id,
                )]
            }
        }
    }

    /// Resolve audiences and insert the planned notifications.
    pub async fn deliver(
        conn: &mut PgConnection,
        event: &DomainEvent,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let mut created = Vec::new();
        for planned in Self::plan(event) {
            match planned.audience {
                Audience::User(user_id) => {
                    created.push(NotificationRepo::create(&mut *conn, user_id, &planned.draft).await?);
                }
                Audience::VerifiedRole(role) => {
                    let user_ids = UserRepo::verified_ids_with_role(&mut *conn, role).await?;
                    let rows =
                        NotificationRepo::create_for_users(&mut *conn, &user_ids, &planned.draft)
                            .await?;
                    tracing::debug!(
                        event = event.event_type(),
                        role = %role,
                        recipients = rows.len(),
                        "Broadcast notification"
                    );
                    created.extend(rows);
                }
            }
        }
        Ok(created)
    }
}
