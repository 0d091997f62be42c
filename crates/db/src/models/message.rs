//! Chat message entity model and DTOs.

use errand_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub sender_id: DbId,
    pub receiver_id: DbId,
    pub content: String,
    pub request_id: Option<DbId>,
    pub product_id: Option<DbId>,
    pub is_read: bool,
    pub sent_at: Timestamp,
}

/// DTO for sending a message.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SendMessage {
    pub receiver_id: DbId,
    #[validate(length(min = 1, max = 2000, message = "must be between 1 and 2000 characters"))]
    pub content: String,
    pub request_id: Option<DbId>,
    pub product_id: Option<DbId>,
}

/// Optional scoping of a conversation to a request or a product.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ConversationScope {
    pub request_id: Option<DbId>,
    pub product_id: Option<DbId>,
}

/// Latest message and unread count for one counterpart.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConversationSummary {
    pub counterpart_id: DbId,
    pub unread_count: i64,
    #[sqlx(flatten)]
    pub latest_message: Message,
}
