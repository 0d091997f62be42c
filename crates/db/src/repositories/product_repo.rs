//! Repository for the `products` table.

use errand_core::types::DbId;
use sqlx::postgres::PgExecutor;

use crate::models::product::{CreateProduct, Product, PRODUCT_STATUS_AVAILABLE};

/// Column list for `products` queries.
const COLUMNS: &str = "id, seller_id, name, status, created_at";

/// Read access to marketplace products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a product, returning the created row.
    pub async fn create<'e, E>(executor: E, input: &CreateProduct) -> Result<Product, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO products (seller_id, name, status) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(input.seller_id)
            .bind(&input.name)
            .bind(input.status.as_deref().unwrap_or(PRODUCT_STATUS_AVAILABLE))
            .fetch_one(executor)
            .await
    }

    /// Find a product by ID.
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<Product>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }
}
