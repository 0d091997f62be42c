//! Delivery request lifecycle.

use std::sync::Arc;

use errand_core::error::CoreError;
use errand_core::lifecycle::{
    rule_for, validate_category, Performer, RequestAction, RequestStatus,
};
use errand_core::roles::{Actor, Role};
use errand_core::types::DbId;
use errand_db::models::request::{CreateRequest, OpenRequestFilter, Request};
use errand_db::repositories::RequestRepo;
use errand_db::DbPool;
use errand_events::{DomainEvent, EventBus, EventDispatcher};
use sqlx::PgConnection;
use validator::Validate;

use crate::assignment::AssignmentCoordinator;
use crate::error::LifecycleError;

/// Owns every read and state change of delivery requests.
#[derive(Clone)]
pub struct RequestStore {
    pool: DbPool,
    bus: Arc<EventBus>,
}

impl RequestStore {
    pub fn new(pool: DbPool, bus: Arc<EventBus>) -> Self {
        Self { pool, bus }
    }

    // -----------------------------------------------------------------------
    // Create / read
    // -----------------------------------------------------------------------

    /// Post a new request. Only requesters may do this.
    pub async fn create(
        &self,
        actor: Actor,
        input: &CreateRequest,
    ) -> Result<Request, LifecycleError> {
        actor.require_role(Role::Hosteller, "create item requests")?;
        input.validate()?;
        if let Some(category) = input.category.as_deref() {
            validate_category(category)?;
        }
        if input.delivery_location.trim().is_empty() {
            return Err(CoreError::Validation("delivery_location must not be blank".into()).into());
        }

        let mut tx = self.pool.begin().await?;
        let request = RequestRepo::create(&mut *tx, actor.user_id, input).await?;
        let envelope = EventDispatcher::dispatch(
            &mut tx,
            DomainEvent::RequestCreated {
                request_id: request.id,
                requester_id: request.requester_id,
                item_name: request.item_name.clone(),
            },
        )
        .await?;
        tx.commit().await?;

        tracing::info!(
            request_id = request.id,
            user_id = actor.user_id,
            category = %request.category,
            "Request created"
        );
        self.bus.publish(envelope);
        Ok(request)
    }

    /// Read one request. Requesters may only read their own.
    pub async fn get(&self, actor: Actor, id: DbId) -> Result<Request, LifecycleError> {
        let request = RequestRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "request",
                id,
            })?;
        if actor.role == Role::Hosteller && request.requester_id != actor.user_id {
            return Err(CoreError::Forbidden("Access denied".into()).into());
        }
        Ok(request)
    }

    /// The board of claimable and in-progress requests.
    pub async fn list_open(
        &self,
        actor: Actor,
        filter: &OpenRequestFilter,
    ) -> Result<Vec<Request>, LifecycleError> {
        if actor.role == Role::Hosteller {
            return Err(CoreError::Forbidden("Access denied".into()).into());
        }
        if let Some(category) = filter.category.as_deref() {
            validate_category(category)?;
        }
        Ok(RequestRepo::list_open(&self.pool, filter).await?)
    }

    /// Requests posted by the acting requester.
    pub async fn list_mine(
        &self,
        actor: Actor,
        status: Option<RequestStatus>,
    ) -> Result<Vec<Request>, LifecycleError> {
        actor.require_role(Role::Hosteller, "list their requests")?;
        Ok(RequestRepo::list_for_requester(&self.pool, actor.user_id, status).await?)
    }

    /// Requests the acting fulfiller holds or has held.
    pub async fn list_deliveries(
        &self,
        actor: Actor,
        status: Option<RequestStatus>,
    ) -> Result<Vec<Request>, LifecycleError> {
        actor.require_role(Role::DayScholar, "list their deliveries")?;
        Ok(RequestRepo::list_for_fulfiller(&self.pool, actor.user_id, status).await?)
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    pub async fn accept(&self, actor: Actor, id: DbId) -> Result<Request, LifecycleError> {
        self.transition(actor, id, RequestAction::Accept).await
    }

    pub async fn deliver(&self, actor: Actor, id: DbId) -> Result<Request, LifecycleError> {
        self.transition(actor, id, RequestAction::Deliver).await
    }

    pub async fn cancel(&self, actor: Actor, id: DbId) -> Result<Request, LifecycleError> {
        self.transition(actor, id, RequestAction::Cancel).await
    }

    pub async fn cancel_delivery(&self, actor: Actor, id: DbId) -> Result<Request, LifecycleError> {
        self.transition(actor, id, RequestAction::CancelDelivery).await
    }

    /// Apply `action` together with its ledger and notification writes in
    /// one transaction, then publish.
    async fn transition(
        &self,
        actor: Actor,
        id: DbId,
        action: RequestAction,
    ) -> Result<Request, LifecycleError> {
        let mut tx = self.pool.begin().await?;

        let request = match action {
            RequestAction::Accept => AssignmentCoordinator::claim(&mut tx, actor, id).await?,
            RequestAction::Deliver => {
                actor.require_role(Role::DayScholar, "mark requests as delivered")?;
                let updated = RequestRepo::complete(&mut *tx, id, actor.user_id).await?;
                Self::settle(&mut tx, actor, id, action, updated).await?
            }
            RequestAction::Cancel => {
                actor.require_role(Role::Hosteller, "cancel requests")?;
                let updated = RequestRepo::cancel_by_requester(&mut *tx, id, actor.user_id).await?;
                Self::settle(&mut tx, actor, id, action, updated).await?
            }
            RequestAction::CancelDelivery => {
                actor.require_role(Role::DayScholar, "cancel deliveries")?;
                let updated = RequestRepo::release_by_fulfiller(&mut *tx, id, actor.user_id).await?;
                Self::settle(&mut tx, actor, id, action, updated).await?
            }
        };

        let envelope = EventDispatcher::dispatch(&mut tx, Self::event_for(action, &request)?).await?;
        tx.commit().await?;

        tracing::info!(
            request_id = id,
            user_id = actor.user_id,
            action = %action,
            status = %request.status,
            "Request transitioned"
        );
        self.bus.publish(envelope);
        Ok(request)
    }

    /// Turn a guarded update that matched no row into the right error.
    async fn settle(
        conn: &mut PgConnection,
        actor: Actor,
        id: DbId,
        action: RequestAction,
        updated: Option<Request>,
    ) -> Result<Request, LifecycleError> {
        if let Some(request) = updated {
            return Ok(request);
        }

        let current = RequestRepo::find_by_id(&mut *conn, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "request",
                id,
            })?;
        let rule = rule_for(action);
        let is_performer = match rule.performer {
            Performer::AnyFulfiller => true,
            Performer::AssignedFulfiller => current.fulfiller_id == Some(actor.user_id),
            Performer::OwningRequester => current.requester_id == actor.user_id,
        };

        let err = match rule.performer {
            Performer::OwningRequester if !is_performer => {
                CoreError::Forbidden("You can only cancel your own requests".into())
            }
            Performer::AssignedFulfiller if !is_performer && rule.allows(current.status) => {
                CoreError::Forbidden("You are not assigned to this request".into())
            }
            _ => rule.rejection(current.status),
        };
        Err(err.into())
    }

    fn event_for(action: RequestAction, request: &Request) -> Result<DomainEvent, CoreError> {
        let fulfiller_id = || {
            request
                .fulfiller_id
                .or(request.cancelled_fulfiller_id)
                .ok_or_else(|| {
                    CoreError::Internal(format!("Request {} has no fulfiller", request.id))
                })
        };
        let request_id = request.id;
        let requester_id = request.requester_id;
        let item_name = request.item_name.clone();

        Ok(match action {
            RequestAction::Accept => DomainEvent::RequestAccepted {
                request_id,
                requester_id,
                fulfiller_id: fulfiller_id()?,
                item_name,
            },
            RequestAction::Deliver => DomainEvent::RequestCompleted {
                request_id,
                requester_id,
                fulfiller_id: fulfiller_id()?,
                item_name,
            },
            RequestAction::Cancel => DomainEvent::RequestCancelled {
                request_id,
                requester_id,
                fulfiller_id: request.cancelled_fulfiller_id,
                item_name,
            },
            RequestAction::CancelDelivery => DomainEvent::DeliveryCancelled {
                request_id,
                requester_id,
                fulfiller_id: fulfiller_id()?,
                item_name,
            },
        })
    }
}
