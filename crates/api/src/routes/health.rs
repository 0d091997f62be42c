use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Open WebSocket connections.
    pub connections: usize,
    /// Users with at least one registered connection.
    pub online_users: usize,
}

/// GET /health -- service, database and presence status.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = errand_db::health_check(&state.pool).await.is_ok();

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        connections: state.presence.connection_count(),
        online_users: state.presence.online_count(),
    })
}

/// Mount health check routes (root level, not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
