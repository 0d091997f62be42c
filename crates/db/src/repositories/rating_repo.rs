//! Repository for the `ratings` table.

use errand_core::types::DbId;
use sqlx::postgres::PgExecutor;

use crate::models::rating::{NewRating, Rating};

/// Column list for `ratings` queries.
const COLUMNS: &str = "\
    id, rater_id, rated_user_id, transaction_type, transaction_id, \
    score, comment, created_at";

/// Rating storage. Uniqueness per transaction is enforced by
/// `uq_ratings_transaction`.
pub struct RatingRepo;

impl RatingRepo {
    /// Insert a rating. Returns `None` when the rater has already rated this
    /// user for this transaction.
    pub async fn insert<'e, E>(
        executor: E,
        rating: &NewRating<'_>,
    ) -> Result<Option<Rating>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO ratings \
                (rater_id, rated_user_id, transaction_type, transaction_id, score, comment) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT ON CONSTRAINT uq_ratings_transaction DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Rating>(&query)
            .bind(rating.rater_id)
            .bind(rating.rated_user_id)
            .bind(rating.transaction_type)
            .bind(rating.transaction_id)
            .bind(rating.score)
            .bind(rating.comment)
            .fetch_optional(executor)
            .await
    }

    /// Every score a user has received.
    pub async fn scores_for_user<'e, E>(executor: E, user_id: DbId) -> Result<Vec<i16>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT score FROM ratings WHERE rated_user_id = $1")
            .bind(user_id)
            .fetch_all(executor)
            .await
    }

    /// Ratings received by a user, newest first.
    pub async fn list_for_user<'e, E>(executor: E, user_id: DbId) -> Result<Vec<Rating>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM ratings \
             WHERE rated_user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Rating>(&query)
            .bind(user_id)
            .fetch_all(executor)
            .await
    }
}
