//! Rating entity model and DTOs.

use errand_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `ratings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Rating {
    pub id: DbId,
    pub rater_id: DbId,
    pub rated_user_id: DbId,
    pub transaction_type: String,
    pub transaction_id: DbId,
    pub score: i16,
    pub comment: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for rating the counterpart of a completed request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RateRequest {
    pub request_id: DbId,
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub score: i16,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub comment: Option<String>,
}

/// DTO for rating the counterpart of a sold product.
///
/// `buyer_id` is required when the seller rates the buyer.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RateProduct {
    pub product_id: DbId,
    pub buyer_id: Option<DbId>,
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub score: i16,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub comment: Option<String>,
}

/// Fully resolved rating ready for insertion.
#[derive(Debug, Clone)]
pub struct NewRating<'a> {
    pub rater_id: DbId,
    pub rated_user_id: DbId,
    pub transaction_type: &'static str,
    pub transaction_id: DbId,
    pub score: i16,
    pub comment: Option<&'a str>,
}
