//! Handlers for the `/requests` resource.
//!
//! Role checks happen twice: the extractors reject early, and
//! [`RequestStore`](errand_lifecycle::RequestStore) enforces ownership and
//! assignment against the row itself.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use errand_core::lifecycle::RequestStatus;
use errand_core::types::DbId;
use errand_db::models::request::{CreateRequest, OpenRequestFilter, Request};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireDayScholar, RequireHosteller};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for the per-user request lists.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<RequestStatus>,
}

/// POST /api/v1/requests
pub async fn create_request(
    RequireHosteller(user): RequireHosteller,
    State(state): State<AppState>,
    Json(input): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Request>>)> {
    let request = state.requests.create(user.actor(), &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/requests
///
/// Open board: pending and accepted requests, urgent first.
pub async fn list_open(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<OpenRequestFilter>,
) -> AppResult<Json<DataResponse<Vec<Request>>>> {
    let requests = state.requests.list_open(auth.actor(), &filter).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/requests/mine
pub async fn list_mine(
    RequireHosteller(user): RequireHosteller,
    State(state): State<AppState>,
    Query(params): Query<StatusQuery>,
) -> AppResult<Json<DataResponse<Vec<Request>>>> {
    let requests = state.requests.list_mine(user.actor(), params.status).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/requests/deliveries
pub async fn list_deliveries(
    RequireDayScholar(user): RequireDayScholar,
    State(state): State<AppState>,
    Query(params): Query<StatusQuery>,
) -> AppResult<Json<DataResponse<Vec<Request>>>> {
    let requests = state
        .requests
        .list_deliveries(user.actor(), params.status)
        .await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/requests/{id}
pub async fn get_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Request>>> {
    let request = state.requests.get(auth.actor(), id).await?;
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/requests/{id}/accept
///
/// Returns 409 when another day scholar claimed the request first.
pub async fn accept_request(
    RequireDayScholar(user): RequireDayScholar,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Request>>> {
    let request = state.requests.accept(user.actor(), id).await?;
    tracing::info!(request_id = id, user_id = user.user_id, "Request accepted");
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/requests/{id}/deliver
pub async fn deliver_request(
    RequireDayScholar(user): RequireDayScholar,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Request>>> {
    let request = state.requests.deliver(user.actor(), id).await?;
    tracing::info!(request_id = id, user_id = user.user_id, "Request delivered");
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/requests/{id}/cancel
pub async fn cancel_request(
    RequireHosteller(user): RequireHosteller,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Request>>> {
    let request = state.requests.cancel(user.actor(), id).await?;
    tracing::info!(request_id = id, user_id = user.user_id, "Request cancelled");
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/requests/{id}/cancel-delivery
///
/// The assigned day scholar backs out; the request ends cancelled.
pub async fn cancel_delivery(
    RequireDayScholar(user): RequireDayScholar,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Request>>> {
    let request = state.requests.cancel_delivery(user.actor(), id).await?;
    tracing::info!(request_id = id, user_id = user.user_id, "Delivery cancelled");
    Ok(Json(DataResponse { data: request }))
}
