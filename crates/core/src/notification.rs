//! Notification categories and recipient addressing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::roles::Role;
use crate::types::DbId;

pub const CATEGORY_REQUEST: &str = "request";
pub const CATEGORY_MESSAGE: &str = "message";
pub const CATEGORY_PRODUCT: &str = "product";

/// What a notification is about. Stored as text in `notifications.category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    Request,
    Message,
    Product,
}

impl NotificationCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationCategory::Request => CATEGORY_REQUEST,
            NotificationCategory::Message => CATEGORY_MESSAGE,
            NotificationCategory::Product => CATEGORY_PRODUCT,
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who receives a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// A single account.
    User(DbId),
    /// Every verified account holding the role.
    VerifiedRole(Role),
}
