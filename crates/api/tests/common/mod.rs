#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use errand_api::auth::jwt::{generate_access_token, JwtConfig};
use errand_api::config::ServerConfig;
use errand_api::router::build_app_router;
use errand_api::state::AppState;
use errand_api::ws::PresenceRegistry;
use errand_core::roles::Role;
use errand_db::models::user::{CreateUser, User};
use errand_db::repositories::UserRepo;
use errand_events::EventBus;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-for-integration-tests";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        db_max_connections: 5,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

pub fn test_state(pool: PgPool) -> AppState {
    AppState::new(
        pool,
        Arc::new(test_config()),
        Arc::new(EventBus::default()),
        Arc::new(PresenceRegistry::new()),
    )
}

/// Full router with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(test_state(pool), &test_config())
}

pub async fn seed_user(pool: &PgPool, name: &str, role: Role) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: format!("{}@campus.edu", name.to_lowercase()),
            role,
            is_verified: true,
        },
    )
    .await
    .unwrap()
}

pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, user.role.as_str(), &test_config().jwt).unwrap()
}

/// Issue one request through the router.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn request_body(item: &str, price: f64) -> serde_json::Value {
    serde_json::json!({
        "item_name": item,
        "expected_price": price,
        "deadline": (chrono::Utc::now() + chrono::Duration::hours(2)).to_rfc3339(),
        "delivery_location": "Hostel B, Room 12",
    })
}
