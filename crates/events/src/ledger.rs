//! Points and reputation bookkeeping.

use errand_core::incentive::{average_rating, ACCEPT_AWARD, COMPLETION_AWARD, RATING_AWARD};
use errand_core::types::DbId;
use errand_db::repositories::{RatingRepo, UserRepo};
use sqlx::PgConnection;

use crate::event::DomainEvent;

/// Applies point awards and rating averages inside the caller's transaction.
pub struct IncentiveLedger;

impl IncentiveLedger {
    /// Points credited for an event, and to whom.
    pub fn award_for(event: &DomainEvent) -> Option<(DbId, i32)> {
        match event {
            DomainEvent::RequestAccepted { fulfiller_id, .. } => Some((*fulfiller_id, ACCEPT_AWARD)),
            DomainEvent::RequestCompleted { fulfiller_id, .. } => {
                Some((*fulfiller_id, COMPLETION_AWARD))
            }
            DomainEvent::RatingSubmitted { rater_id, .. } => Some((*rater_id, RATING_AWARD)),
            _ => None,
        }
    }

    pub async fn apply(conn: &mut PgConnection, event: &DomainEvent) -> Result<(), sqlx::Error> {
        if let Some((user_id, points)) = Self::award_for(event) {
            let balance = UserRepo::add_points(&mut *conn, user_id, points).await?;
            tracing::debug!(
                event = event.event_type(),
                user_id,
                points,
                balance = ?balance,
                "Points credited"
            );
        }

        if let DomainEvent::RatingSubmitted { rated_user_id, .. } = event {
            Self::refresh_average(conn, *rated_user_id).await?;
        }
        Ok(())
    }

    /// Recompute a user's average from every rating they have received.
    ///
    /// The user row is locked before the scores are read, so concurrent
    /// raters of the same user recompute one after another and the last
    /// commit sees every rating.
    pub async fn refresh_average(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<f64, sqlx::Error> {
        UserRepo::lock_for_update(&mut *conn, user_id).await?;
        let scores = RatingRepo::scores_for_user(&mut *conn, user_id).await?;
        let average = average_rating(&scores);
        UserRepo::set_average_rating(&mut *conn, user_id, average).await?;
        Ok(average)
    }
}
