//! Ratings between the two parties of a finished transaction.

use std::sync::Arc;

use errand_core::error::CoreError;
use errand_core::incentive::{TRANSACTION_PRODUCT, TRANSACTION_REQUEST};
use errand_core::lifecycle::RequestStatus;
use errand_core::roles::{Actor, Role};
use errand_core::types::DbId;
use errand_db::models::rating::{NewRating, RateProduct, RateRequest, Rating};
use errand_db::repositories::{ProductRepo, RatingRepo, RequestRepo, UserRepo};
use errand_db::DbPool;
use errand_events::{DomainEvent, EventBus, EventDispatcher};
use sqlx::PgConnection;
use validator::Validate;

use crate::error::LifecycleError;

#[derive(Clone)]
pub struct RatingService {
    pool: DbPool,
    bus: Arc<EventBus>,
}

impl RatingService {
    pub fn new(pool: DbPool, bus: Arc<EventBus>) -> Self {
        Self { pool, bus }
    }

    /// Rate the counterpart of a completed request.
    pub async fn rate_request(
        &self,
        actor: Actor,
        input: &RateRequest,
    ) -> Result<Rating, LifecycleError> {
        input.validate()?;
        let mut tx = self.pool.begin().await?;

        let request = RequestRepo::find_by_id(&mut *tx, input.request_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "request",
                id: input.request_id,
            })?;
        if request.status != RequestStatus::Completed {
            return Err(CoreError::InvalidState("You can only rate completed requests".into()).into());
        }
        let rated_user_id = request.counterpart_of(actor.user_id).ok_or_else(|| {
            CoreError::Forbidden("You are not associated with this request".into())
        })?;

        let rating = Self::record(
            &mut tx,
            NewRating {
                rater_id: actor.user_id,
                rated_user_id,
                transaction_type: TRANSACTION_REQUEST,
                transaction_id: request.id,
                score: input.score,
                comment: input.comment.as_deref(),
            },
        )
        .await?;

        let envelope = EventDispatcher::dispatch(&mut tx, Self::event(&rating)).await?;
        tx.commit().await?;
        self.bus.publish(envelope);
        Ok(rating)
    }

    /// Rate the counterpart of a sold product.
    ///
    /// The seller rates the buyer named in `buyer_id`; any hosteller who is
    /// not the seller rates the seller.
    pub async fn rate_product(
        &self,
        actor: Actor,
        input: &RateProduct,
    ) -> Result<Rating, LifecycleError> {
        input.validate()?;
        let mut tx = self.pool.begin().await?;

        let product = ProductRepo::find_by_id(&mut *tx, input.product_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "product",
                id: input.product_id,
            })?;
        if !product.is_sold() {
            return Err(CoreError::InvalidState("You can only rate sold products".into()).into());
        }

        let rated_user_id = if product.seller_id == actor.user_id {
            let buyer_id = input
                .buyer_id
                .ok_or_else(|| CoreError::Validation("buyer_id is required".into()))?;
            if UserRepo::find_by_id(&mut *tx, buyer_id).await?.is_none() {
                return Err(CoreError::NotFound {
                    entity: "user",
                    id: buyer_id,
                }
                .into());
            }
            buyer_id
        } else if actor.role == Role::Hosteller {
            product.seller_id
        } else {
            return Err(
                CoreError::Forbidden("You are not associated with this product".into()).into(),
            );
        };

        let rating = Self::record(
            &mut tx,
            NewRating {
                rater_id: actor.user_id,
                rated_user_id,
                transaction_type: TRANSACTION_PRODUCT,
                transaction_id: product.id,
                score: input.score,
                comment: input.comment.as_deref(),
            },
        )
        .await?;

        let envelope = EventDispatcher::dispatch(&mut tx, Self::event(&rating)).await?;
        tx.commit().await?;
        self.bus.publish(envelope);
        Ok(rating)
    }

    /// Ratings a user has received, newest first.
    pub async fn list_for_user(&self, user_id: DbId) -> Result<Vec<Rating>, LifecycleError> {
        if UserRepo::find_by_id(&self.pool, user_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "user",
                id: user_id,
            }
            .into());
        }
        Ok(RatingRepo::list_for_user(&self.pool, user_id).await?)
    }

    async fn record(
        conn: &mut PgConnection,
        rating: NewRating<'_>,
    ) -> Result<Rating, LifecycleError> {
        if rating.rater_id == rating.rated_user_id {
            return Err(CoreError::Validation("You cannot rate yourself".into()).into());
        }

        // Both user rows are written later in this transaction (points and
        // average). Lock them in id order so opposite-direction ratings queue.
        let (first, second) = if rating.rater_id < rating.rated_user_id {
            (rating.rater_id, rating.rated_user_id)
        } else {
            (rating.rated_user_id, rating.rater_id)
        };
        for user_id in [first, second] {
            if !UserRepo::lock_for_update(&mut *conn, user_id).await? {
                return Err(CoreError::NotFound {
                    entity: "user",
                    id: user_id,
                }
                .into());
            }
        }

        let inserted = RatingRepo::insert(&mut *conn, &rating).await?.ok_or_else(|| {
            CoreError::Conflict("You have already rated this transaction".into())
        })?;
        tracing::info!(
            rating_id = inserted.id,
            rater_id = inserted.rater_id,
            rated_user_id = inserted.rated_user_id,
            transaction_type = %inserted.transaction_type,
            "Rating recorded"
        );
        Ok(inserted)
    }

    fn event(rating: &Rating) -> DomainEvent {
        DomainEvent::RatingSubmitted {
            rating_id: rating.id,
            rater_id: rating.rater_id,
            rated_user_id: rating.rated_user_id,
            transaction_type: if rating.transaction_type == TRANSACTION_PRODUCT {
                TRANSACTION_PRODUCT
            } else {
                TRANSACTION_REQUEST
            },
            transaction_id: rating.transaction_id,
            score: rating.score,
        }
    }
}
