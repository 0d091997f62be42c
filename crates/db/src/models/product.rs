//! Product entity model (read-only boundary with the marketplace).

use errand_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const PRODUCT_STATUS_AVAILABLE: &str = "available";
pub const PRODUCT_STATUS_SOLD: &str = "sold";

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub seller_id: DbId,
    pub name: String,
    pub status: String,
    pub created_at: Timestamp,
}

impl Product {
    pub fn is_sold(&self) -> bool {
        self.status == PRODUCT_STATUS_SOLD
    }
}

/// DTO for inserting a product (seeding and tests).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub seller_id: DbId,
    pub name: String,
    pub status: Option<String>,
}
