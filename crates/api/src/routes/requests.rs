use axum::routing::{get, post};
use axum::Router;

use crate::handlers::requests;
use crate::state::AppState;

/// Routes mounted at `/requests`.
///
/// ```text
/// GET    /                        -> list_open (day scholars, admins)
/// POST   /                        -> create_request (hostellers)
/// GET    /mine                    -> list_mine
/// GET    /deliveries              -> list_deliveries
/// GET    /{id}                    -> get_request
/// POST   /{id}/accept             -> accept_request
/// POST   /{id}/deliver            -> deliver_request
/// POST   /{id}/cancel             -> cancel_request
/// POST   /{id}/cancel-delivery    -> cancel_delivery
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(requests::list_open).post(requests::create_request),
        )
        .route("/mine", get(requests::list_mine))
        .route("/deliveries", get(requests::list_deliveries))
        .route("/{id}", get(requests::get_request))
        .route("/{id}/accept", post(requests::accept_request))
        .route("/{id}/deliver", post(requests::deliver_request))
        .route("/{id}/cancel", post(requests::cancel_request))
        .route("/{id}/cancel-delivery", post(requests::cancel_delivery))
}
