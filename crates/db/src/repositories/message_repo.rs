//! Repository for the `messages` table.

use errand_core::types::DbId;
use sqlx::postgres::PgExecutor;

use crate::models::message::{ConversationScope, ConversationSummary, Message, SendMessage};

/// Column list for `messages` queries.
const COLUMNS: &str =
    "id, sender_id, receiver_id, content, request_id, product_id, is_read, sent_at";

/// Chat history storage.
pub struct MessageRepo;

impl MessageRepo {
    /// Persist a message from `sender_id`.
    pub async fn create<'e, E>(
        executor: E,
        sender_id: DbId,
        input: &SendMessage,
    ) -> Result<Message, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO messages (sender_id, receiver_id, content, request_id, product_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(sender_id)
            .bind(input.receiver_id)
            .bind(&input.content)
            .bind(input.request_id)
            .bind(input.product_id)
            .fetch_one(executor)
            .await
    }

    /// Messages exchanged between two users, oldest first, optionally scoped
    /// to a request or product.
    pub async fn conversation<'e, E>(
        executor: E,
        user_id: DbId,
        other_id: DbId,
        scope: ConversationScope,
    ) -> Result<Vec<Message>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM messages \
             WHERE ((sender_id = $1 AND receiver_id = $2) \
                 OR (sender_id = $2 AND receiver_id = $1)) \
               AND ($3::BIGINT IS NULL OR request_id = $3) \
               AND ($4::BIGINT IS NULL OR product_id = $4) \
             ORDER BY sent_at ASC, id ASC"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(user_id)
            .bind(other_id)
            .bind(scope.request_id)
            .bind(scope.product_id)
            .fetch_all(executor)
            .await
    }

    /// Every message attached to a request or product, oldest first.
    pub async fn list_for_scope<'e, E>(
        executor: E,
        scope: ConversationScope,
    ) -> Result<Vec<Message>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM messages \
             WHERE ($1::BIGINT IS NULL OR request_id = $1) \
               AND ($2::BIGINT IS NULL OR product_id = $2) \
             ORDER BY sent_at ASC, id ASC"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(scope.request_id)
            .bind(scope.product_id)
            .fetch_all(executor)
            .await
    }

    /// Mark messages addressed to `receiver_id` read, optionally only those
    /// from `sender_id` and within `scope`.
    pub async fn mark_read<'e, E>(
        executor: E,
        receiver_id: DbId,
        sender_id: Option<DbId>,
        scope: ConversationScope,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE messages SET is_read = true \
             WHERE receiver_id = $1 AND NOT is_read \
               AND ($2::BIGINT IS NULL OR sender_id = $2) \
               AND ($3::BIGINT IS NULL OR request_id = $3) \
               AND ($4::BIGINT IS NULL OR product_id = $4)",
        )
        .bind(receiver_id)
        .bind(sender_id)
        .bind(scope.request_id)
        .bind(scope.product_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// One summary per counterpart: the latest message and how many of the
    /// counterpart's messages are still unread. Most recent conversation first.
    pub async fn conversations<'e, E>(
        executor: E,
        user_id: DbId,
    ) -> Result<Vec<ConversationSummary>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "WITH latest AS ( \
                SELECT DISTINCT ON (counterpart_id) counterpart_id, {COLUMNS} \
                FROM ( \
                    SELECT CASE WHEN sender_id = $1 THEN receiver_id ELSE sender_id END \
                               AS counterpart_id, \
                           {COLUMNS} \
                    FROM messages \
                    WHERE sender_id = $1 OR receiver_id = $1 \
                ) m \
                ORDER BY counterpart_id, sent_at DESC, id DESC \
             ) \
             SELECT l.*, \
                    (SELECT COUNT(*) FROM messages u \
                     WHERE u.receiver_id = $1 AND u.sender_id = l.counterpart_id \
                       AND NOT u.is_read) AS unread_count \
             FROM latest l \
             ORDER BY l.sent_at DESC, l.id DESC"
        );
        sqlx::query_as::<_, ConversationSummary>(&query)
            .bind(user_id)
            .fetch_all(executor)
            .await
    }
}
