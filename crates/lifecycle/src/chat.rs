//! Chat persistence and authorization.

use std::sync::Arc;

use errand_core::error::CoreError;
use errand_core::roles::{Actor, Role};
use errand_core::types::DbId;
use errand_db::models::message::{ConversationScope, ConversationSummary, Message, SendMessage};
use errand_db::models::product::Product;
use errand_db::models::request::Request;
use errand_db::models::user::User;
use errand_db::repositories::{MessageRepo, ProductRepo, RequestRepo, UserRepo};
use errand_db::DbPool;
use errand_events::{DomainEvent, EventBus, EventDispatcher};
use sqlx::PgConnection;
use validator::Validate;

use crate::error::LifecycleError;

#[derive(Clone)]
pub struct ChatService {
    pool: DbPool,
    bus: Arc<EventBus>,
}

impl ChatService {
    pub fn new(pool: DbPool, bus: Arc<EventBus>) -> Self {
        Self { pool, bus }
    }

    /// Authorize and persist a message together with the receiver's
    /// notification, then publish.
    pub async fn send(&self, actor: Actor, input: &SendMessage) -> Result<Message, LifecycleError> {
        input.validate()?;
        if input.content.trim().is_empty() {
            return Err(CoreError::Validation("content must not be blank".into()).into());
        }
        if input.receiver_id == actor.user_id {
            return Err(CoreError::Validation("You cannot message yourself".into()).into());
        }

        let mut tx = self.pool.begin().await?;
        let sender = find_user(&mut tx, actor.user_id).await?;
        let receiver = find_user(&mut tx, input.receiver_id).await?;

        if let Some(request_id) = input.request_id {
            let request = find_request(&mut tx, request_id).await?;
            if !request.is_party(sender.id) {
                return Err(forbidden("You are not associated with this request"));
            }
            if !request.is_party(receiver.id) {
                return Err(forbidden("Receiver is not associated with this request"));
            }
        }
        if let Some(product_id) = input.product_id {
            let product = find_product(&mut tx, product_id).await?;
            if product.seller_id != sender.id && sender.role != Role::Hosteller {
                return Err(forbidden("You cannot send messages about this product"));
            }
            if product.seller_id != receiver.id && receiver.role != Role::Hosteller {
                return Err(forbidden("Receiver cannot receive messages about this product"));
            }
        }

        let message = MessageRepo::create(&mut *tx, sender.id, input).await?;
        let envelope = EventDispatcher::dispatch(
            &mut tx,
            DomainEvent::MessageSent {
                message_id: message.id,
                sender_id: sender.id,
                sender_name: sender.name,
                receiver_id: receiver.id,
            },
        )
        .await?;
        tx.commit().await?;

        tracing::debug!(
            message_id = message.id,
            sender_id = message.sender_id,
            receiver_id = message.receiver_id,
            "Message stored"
        );
        self.bus.publish(envelope);
        Ok(message)
    }

    /// History with one user, oldest first. Incoming messages in the
    /// returned scope are marked read.
    pub async fn conversation(
        &self,
        actor: Actor,
        other_id: DbId,
        scope: ConversationScope,
    ) -> Result<Vec<Message>, LifecycleError> {
        let mut tx = self.pool.begin().await?;
        find_user(&mut tx, other_id).await?;
        MessageRepo::mark_read(&mut *tx, actor.user_id, Some(other_id), scope).await?;
        let messages = MessageRepo::conversation(&mut *tx, actor.user_id, other_id, scope).await?;
        tx.commit().await?;
        Ok(messages)
    }

    /// Latest message and unread count per counterpart.
    pub async fn conversations(
        &self,
        actor: Actor,
    ) -> Result<Vec<ConversationSummary>, LifecycleError> {
        Ok(MessageRepo::conversations(&self.pool, actor.user_id).await?)
    }

    /// Every message attached to a request. Parties only.
    pub async fn request_messages(
        &self,
        actor: Actor,
        request_id: DbId,
    ) -> Result<Vec<Message>, LifecycleError> {
        let mut tx = self.pool.begin().await?;
        let request = find_request(&mut tx, request_id).await?;
        if !request.is_party(actor.user_id) {
            return Err(forbidden("You are not associated with this request"));
        }
        let scope = ConversationScope {
            request_id: Some(request_id),
            product_id: None,
        };
        MessageRepo::mark_read(&mut *tx, actor.user_id, None, scope).await?;
        let messages = MessageRepo::list_for_scope(&mut *tx, scope).await?;
        tx.commit().await?;
        Ok(messages)
    }

    /// Every message attached to a product. Seller only.
    pub async fn product_messages(
        &self,
        actor: Actor,
        product_id: DbId,
    ) -> Result<Vec<Message>, LifecycleError> {
        let mut tx = self.pool.begin().await?;
        let product = find_product(&mut tx, product_id).await?;
        if product.seller_id != actor.user_id {
            return Err(forbidden("You are not the seller of this product"));
        }
        let scope = ConversationScope {
            request_id: None,
            product_id: Some(product_id),
        };
        MessageRepo::mark_read(&mut *tx, actor.user_id, None, scope).await?;
        let messages = MessageRepo::list_for_scope(&mut *tx, scope).await?;
        tx.commit().await?;
        Ok(messages)
    }
}

fn forbidden(msg: &str) -> LifecycleError {
    CoreError::Forbidden(msg.to_string()).into()
}

async fn find_user(conn: &mut PgConnection, id: DbId) -> Result<User, LifecycleError> {
    UserRepo::find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "user", id }.into())
}

async fn find_request(conn: &mut PgConnection, id: DbId) -> Result<Request, LifecycleError> {
    RequestRepo::find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "request", id }.into())
}

async fn find_product(conn: &mut PgConnection, id: DbId) -> Result<Product, LifecycleError> {
    ProductRepo::find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "product", id }.into())
}
