//! User entity model.

use errand_core::roles::Role;
use errand_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub is_verified: bool,
    pub points: i32,
    pub average_rating: f64,
    pub created_at: Timestamp,
}

/// DTO for inserting a user. Accounts are provisioned by the identity
/// service; this is used by seeding and tests.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_verified: bool,
}
