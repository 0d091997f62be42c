//! Handlers for the `/messages` resource.
//!
//! Sends go through [`MessageRelay`](crate::ws::MessageRelay) so a message
//! posted over HTTP still reaches the receiver's open sockets.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use errand_core::types::DbId;
use errand_db::models::message::{ConversationScope, ConversationSummary, Message, SendMessage};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/messages
pub async fn send_message(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SendMessage>,
) -> AppResult<(StatusCode, Json<DataResponse<Message>>)> {
    let message = state.relay.send(auth.actor(), None, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: message })))
}

/// GET /api/v1/messages/conversations
pub async fn list_conversations(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ConversationSummary>>>> {
    let conversations = state.relay.chat().conversations(auth.actor()).await?;
    Ok(Json(DataResponse {
        data: conversations,
    }))
}

/// GET /api/v1/messages/conversation/{user_id}
///
/// Optional `request_id` / `product_id` narrow the thread.
pub async fn get_conversation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(other_id): Path<DbId>,
    Query(scope): Query<ConversationScope>,
) -> AppResult<Json<DataResponse<Vec<Message>>>> {
    let messages = state
        .relay
        .chat()
        .conversation(auth.actor(), other_id, scope)
        .await?;
    Ok(Json(DataResponse { data: messages }))
}

/// GET /api/v1/messages/request/{id}
pub async fn request_messages(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Message>>>> {
    let messages = state
        .relay
        .chat()
        .request_messages(auth.actor(), request_id)
        .await?;
    Ok(Json(DataResponse { data: messages }))
}

/// GET /api/v1/messages/product/{id}
pub async fn product_messages(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(product_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Message>>>> {
    let messages = state
        .relay
        .chat()
        .product_messages(auth.actor(), product_id)
        .await?;
    Ok(Json(DataResponse { data: messages }))
}
