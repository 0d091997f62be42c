pub mod health;
pub mod messages;
pub mod notifications;
pub mod ratings;
pub mod requests;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws?token=JWT                  WebSocket (presence, chat, live notifications)
/// /requests                      request lifecycle
/// /ratings                       ratings after completed transactions
/// /notifications                 per-user notification inbox
/// /messages                      chat history and HTTP send
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/requests", requests::router())
        .nest("/ratings", ratings::router())
        .nest("/notifications", notifications::router())
        .nest("/messages", messages::router())
}
