use axum::routing::{get, post};
use axum::Router;

use crate::handlers::ratings;
use crate::state::AppState;

/// Routes mounted at `/ratings`.
///
/// ```text
/// POST   /request        -> rate_request
/// POST   /product        -> rate_product
/// GET    /user/{id}      -> list_for_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request", post(ratings::rate_request))
        .route("/product", post(ratings::rate_product))
        .route("/user/{id}", get(ratings::list_for_user))
}
