use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use errand_core::types::DbId;
use errand_db::models::rating::{RateProduct, RateRequest, Rating};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/ratings/request
pub async fn rate_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<RateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Rating>>)> {
    let rating = state.ratings.rate_request(auth.actor(), &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: rating })))
}

/// POST /api/v1/ratings/product
pub async fn rate_product(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<RateProduct>,
) -> AppResult<(StatusCode, Json<DataResponse<Rating>>)> {
    let rating = state.ratings.rate_product(auth.actor(), &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: rating })))
}

/// GET /api/v1/ratings/user/{id}
///
/// Any signed-in user may read another user's ratings.
pub async fn list_for_user(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Rating>>>> {
    let ratings = state.ratings.list_for_user(user_id).await?;
    Ok(Json(DataResponse { data: ratings }))
}
