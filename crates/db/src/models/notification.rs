//! Notification entity model.

use errand_core::notification::NotificationCategory;
use errand_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub category: String,
    pub title: String,
    pub message: String,
    pub related_id: Option<DbId>,
    pub is_read: bool,
    pub created_at: Timestamp,
}

/// Content of a notification before it is addressed to a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDraft {
    pub category: NotificationCategory,
    pub title: String,
    pub message: String,
    pub related_id: Option<DbId>,
}
