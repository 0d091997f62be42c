//! Delivery request entity model and DTOs.

use errand_core::lifecycle::RequestStatus;
use errand_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Request {
    pub id: DbId,
    pub requester_id: DbId,
    pub fulfiller_id: Option<DbId>,
    pub cancelled_fulfiller_id: Option<DbId>,
    pub item_name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub expected_price: f64,
    pub deadline: Timestamp,
    pub delivery_location: String,
    pub is_urgent: bool,
    pub category: String,
    #[sqlx(rename = "status_id", try_from = "i16")]
    pub status: RequestStatus,
    pub completed_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Request {
    /// Whether `user_id` is the requester or the assigned fulfiller.
    pub fn is_party(&self, user_id: DbId) -> bool {
        self.requester_id == user_id || self.fulfiller_id == Some(user_id)
    }

    /// The other party of a two-sided request, if any.
    pub fn counterpart_of(&self, user_id: DbId) -> Option<DbId> {
        if self.requester_id == user_id {
            self.fulfiller_id
        } else if self.fulfiller_id == Some(user_id) {
            Some(self.requester_id)
        } else {
            None
        }
    }
}

/// DTO for creating a delivery request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRequest {
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub item_name: String,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 1000, message = "must be between 1 and 1000"))]
    pub quantity: Option<i32>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub expected_price: f64,
    pub deadline: Timestamp,
    #[validate(length(min = 1, max = 300, message = "must be between 1 and 300 characters"))]
    pub delivery_location: String,
    pub is_urgent: Option<bool>,
    pub category: Option<String>,
}

/// Filters for the open-request board.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenRequestFilter {
    pub category: Option<String>,
    pub urgent_only: Option<bool>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
