use axum::routing::{get, post};
use axum::Router;

use crate::handlers::messages;
use crate::state::AppState;

/// Routes mounted at `/messages`.
///
/// ```text
/// POST   /                          -> send_message
/// GET    /conversations             -> list_conversations
/// GET    /conversation/{user_id}    -> get_conversation
/// GET    /request/{id}              -> request_messages
/// GET    /product/{id}              -> product_messages
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(messages::send_message))
        .route("/conversations", get(messages::list_conversations))
        .route("/conversation/{user_id}", get(messages::get_conversation))
        .route("/request/{id}", get(messages::request_messages))
        .route("/product/{id}", get(messages::product_messages))
}
