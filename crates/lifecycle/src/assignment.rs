//! Race-free claiming of pending requests.
//!
//! The precondition check and the assignment are a single conditional
//! `UPDATE`, so no interleaving of concurrent claims can assign two
//! fulfillers. Postgres serializes writers on the row lock; every claim
//! after the first re-evaluates the `WHERE` clause against the committed
//! row and matches nothing.

use errand_core::error::CoreError;
use errand_core::lifecycle::{next_status, RequestAction};
use errand_core::roles::{Actor, Role};
use errand_core::types::DbId;
use errand_db::models::request::Request;
use errand_db::repositories::RequestRepo;
use sqlx::PgConnection;

use crate::error::LifecycleError;

pub struct AssignmentCoordinator;

impl AssignmentCoordinator {
    /// Assign `request_id` to `actor`, who must be a fulfiller.
    ///
    /// Fails with `NotFound` for an unknown request and `Conflict` when the
    /// request is no longer pending (claimed by someone else or terminal).
    pub async fn claim(
        conn: &mut PgConnection,
        actor: Actor,
        request_id: DbId,
    ) -> Result<Request, LifecycleError> {
        actor.require_role(Role::DayScholar, "accept delivery requests")?;

        if let Some(request) = RequestRepo::claim(&mut *conn, request_id, actor.user_id).await? {
            tracing::info!(request_id, fulfiller_id = actor.user_id, "Request claimed");
            return Ok(request);
        }

        let current = RequestRepo::find_by_id(&mut *conn, request_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "request",
                id: request_id,
            })?;
        tracing::debug!(
            request_id,
            fulfiller_id = actor.user_id,
            status = %current.status,
            "Claim rejected"
        );
        match next_status(current.status, RequestAction::Accept) {
            Err(rejection) => Err(rejection.into()),
            // Still pending means another writer held the row when we tried.
            Ok(_) => Err(CoreError::Conflict("Request was claimed concurrently".into()).into()),
        }
    }
}
