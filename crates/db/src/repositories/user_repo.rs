//! Repository for the `users` table.

use errand_core::roles::Role;
use errand_core::types::DbId;
use sqlx::postgres::PgExecutor;

use crate::models::user::{CreateUser, User};

/// Column list for `users` queries.
const COLUMNS: &str =
    "id, name, email, role, is_verified, points, average_rating, created_at";

/// Reads accounts and maintains their points and reputation.
pub struct UserRepo;

impl UserRepo {
    /// Insert a user, returning the created row.
    pub async fn create<'e, E>(executor: E, input: &CreateUser) -> Result<User, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO users (name, email, role, is_verified) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.role.as_str())
            .bind(input.is_verified)
            .fetch_one(executor)
            .await
    }

    /// Find a user by ID.
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<User>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Take the row lock on a user until the surrounding transaction ends.
    ///
    /// Returns `false` when the user does not exist.
    pub async fn lock_for_update<'e, E>(executor: E, id: DbId) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(locked.is_some())
    }

    /// IDs of every verified account holding `role`.
    pub async fn verified_ids_with_role<'e, E>(
        executor: E,
        role: Role,
    ) -> Result<Vec<DbId>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT id FROM users WHERE role = $1 AND is_verified ORDER BY id")
            .bind(role.as_str())
            .fetch_all(executor)
            .await
    }

    /// Credit `delta` points to a user, returning the new balance.
    ///
    /// Returns `None` when the user does not exist.
    pub async fn add_points<'e, E>(
        executor: E,
        user_id: DbId,
        delta: i32,
    ) -> Result<Option<i32>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("UPDATE users SET points = points + $2 WHERE id = $1 RETURNING points")
            .bind(user_id)
            .bind(delta)
            .fetch_optional(executor)
            .await
    }

    /// Persist a recomputed average rating onto the user row.
    pub async fn set_average_rating<'e, E>(
        executor: E,
        user_id: DbId,
        average: f64,
    ) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query("UPDATE users SET average_rating = $2 WHERE id = $1")
            .bind(user_id)
            .bind(average)
            .execute(executor)
            .await?;
        Ok(())
    }
}
