use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use errand_core::error::CoreError;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::ws::presence::ConnId;
use crate::ws::protocol::{ClientEvent, ServerEvent};

#[derive(Debug, Deserialize)]
pub struct WsParams {
    token: Option<String>,
}

/// Upgrade to WebSocket after validating the `?token=` bearer token.
///
/// Browsers cannot set headers on a socket handshake, so the token travels
/// as a query parameter. An invalid token is rejected with 401 before the
/// upgrade.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> Response {
    let Some(token) = params.token else {
        return AppError::Core(CoreError::Unauthorized("Missing token".into())).into_response();
    };
    let user = match AuthUser::from_token(&token, &state.config.jwt) {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, user))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket, forwards queued frames to the sink on a spawned task,
/// and dispatches inbound frames on the current task. Disconnect always
/// unregisters the connection.
async fn handle_socket(socket: WebSocket, state: AppState, user: AuthUser) {
    let conn = ConnId::new();
    tracing::info!(%conn, user_id = user.user_id, "WebSocket connected");

    let mut rx = state.presence.connect(conn);
    let (mut sink, mut stream) = socket.split();

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(%conn, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => match ClientEvent::decode(text.as_str()) {
                Ok(event) => dispatch(&state, user, conn, event).await,
                Err(e) => {
                    tracing::debug!(%conn, error = %e, "Malformed client frame");
                    reply_error(&state, conn, AppError::BadRequest("Malformed frame".into()));
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(%conn, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(%conn, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    state.presence.disconnect(conn);
    send_task.abort();
    tracing::info!(%conn, user_id = user.user_id, "WebSocket disconnected");
}

async fn dispatch(state: &AppState, user: AuthUser, conn: ConnId, event: ClientEvent) {
    match event {
        ClientEvent::Register { user_id } => {
            if user_id != user.user_id {
                let denied =
                    CoreError::Forbidden("Cannot register presence for another user".into());
                reply_error(state, conn, denied.into());
                return;
            }
            state.presence.register(user_id, conn);
        }
        ClientEvent::Unregister => {
            state.presence.unregister(conn);
        }
        ClientEvent::Query { user_ids } => {
            let statuses = state.presence.query_batch(&user_ids);
            reply(state, conn, ServerEvent::Status { statuses });
        }
        ClientEvent::SendMessage(input) => {
            if let Err(e) = state.relay.send(user.actor(), Some(conn), &input).await {
                reply_error(state, conn, e.into());
            }
        }
        ClientEvent::TypingStart { receiver_id } => {
            state.relay.typing(user.user_id, receiver_id, true);
        }
        ClientEvent::TypingStop { receiver_id } => {
            state.relay.typing(user.user_id, receiver_id, false);
        }
    }
}

fn reply(state: &AppState, conn: ConnId, event: ServerEvent) {
    state.presence.send_to_connection(conn, event.to_frame());
}

/// Report a failure on the originating socket with the same code an HTTP
/// response would carry.
fn reply_error(state: &AppState, conn: ConnId, err: AppError) {
    let (_, code, message) = err.classify();
    reply(state, conn, ServerEvent::error(code, message));
}
