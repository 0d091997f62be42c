//! Repository for the `notifications` table.

use errand_core::types::DbId;
use sqlx::postgres::PgExecutor;

use crate::models::notification::{Notification, NotificationDraft};

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, user_id, category, title, message, related_id, is_read, created_at";

/// Default number of notifications returned by a listing.
const DEFAULT_LIMIT: i64 = 50;

/// Maximum number of notifications returned by a listing.
const MAX_LIMIT: i64 = 100;

/// Per-user notification storage.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Record one notification for `user_id`.
    pub async fn create<'e, E>(
        executor: E,
        user_id: DbId,
        draft: &NotificationDraft,
    ) -> Result<Notification, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO notifications (user_id, category, title, message, related_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(draft.category.as_str())
            .bind(&draft.title)
            .bind(&draft.message)
            .bind(draft.related_id)
            .fetch_one(executor)
            .await
    }

    /// Record the same notification for every user in `user_ids` in one
    /// statement.
    pub async fn create_for_users<'e, E>(
        executor: E,
        user_ids: &[DbId],
        draft: &NotificationDraft,
    ) -> Result<Vec<Notification>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "INSERT INTO notifications (user_id, category, title, message, related_id) \
             SELECT u, $2, $3, $4, $5 FROM UNNEST($1::BIGINT[]) AS u \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_ids)
            .bind(draft.category.as_str())
            .bind(&draft.title)
            .bind(&draft.message)
            .bind(draft.related_id)
            .fetch_all(executor)
            .await
    }

    /// A user's notifications, newest first.
    pub async fn list_for_user<'e, E>(
        executor: E,
        user_id: DbId,
        unread_only: bool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Notification>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = offset.unwrap_or(0).max(0);
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE user_id = $1 AND (NOT $2 OR NOT is_read) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(unread_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(executor)
            .await
    }

    /// Number of unread notifications for a user.
    pub async fn unread_count<'e, E>(executor: E, user_id: DbId) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(executor)
        .await
    }

    /// Mark one of the user's notifications read. Returns `false` if the
    /// notification does not exist or belongs to someone else.
    pub async fn mark_read<'e, E>(executor: E, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result =
            sqlx::query("UPDATE notifications SET is_read = true WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(executor)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all of a user's notifications read, returning how many changed.
    pub async fn mark_all_read<'e, E>(executor: E, user_id: DbId) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete one of the user's notifications.
    pub async fn delete<'e, E>(executor: E, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
