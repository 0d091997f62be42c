//! HTTP-level integration tests for the request lifecycle and the
//! notification inbox.

mod common;

use axum::http::{Method, StatusCode};
use errand_core::roles::Role;
use sqlx::PgPool;

use common::{body_json, build_test_app, request_body, seed_user, send, token_for};

// ---------------------------------------------------------------------------
// Authentication and role checks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_or_bad_token_returns_401(pool: PgPool) {
    let app = build_test_app(pool);

    let response = send(&app, Method::GET, "/api/v1/requests", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, Method::GET, "/api/v1/requests", Some("not-a-jwt"), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn role_guards_reject_wrong_population(pool: PgPool) {
    let hosteller = seed_user(&pool, "Riya", Role::Hosteller).await;
    let scholar = seed_user(&pool, "Farhan", Role::DayScholar).await;
    let app = build_test_app(pool);

    let response = send(
        &app,
        Method::POST,
        "/api/v1/requests",
        Some(&token_for(&scholar)),
        Some(request_body("Bread", 40.0)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, Method::GET, "/api/v1/requests", Some(&token_for(&hosteller)), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_body_returns_validation_error(pool: PgPool) {
    let hosteller = seed_user(&pool, "Riya", Role::Hosteller).await;
    let app = build_test_app(pool);

    let response = send(
        &app,
        Method::POST,
        "/api/v1/requests",
        Some(&token_for(&hosteller)),
        Some(request_body("", 40.0)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Full lifecycle over HTTP
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_accept_deliver_round_trip(pool: PgPool) {
    let hosteller = seed_user(&pool, "Riya", Role::Hosteller).await;
    let first = seed_user(&pool, "Farhan", Role::DayScholar).await;
    let second = seed_user(&pool, "Gopal", Role::DayScholar).await;
    let app = build_test_app(pool);

    let response = send(
        &app,
        Method::POST,
        "/api/v1/requests",
        Some(&token_for(&hosteller)),
        Some(request_body("Bread", 500.0)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["data"]["status"], "pending");
    let id = created["data"]["id"].as_i64().unwrap();

    let response = send(&app, Method::GET, "/api/v1/requests", Some(&token_for(&first)), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    let accept = format!("/api/v1/requests/{id}/accept");
    let response = send(&app, Method::POST, &accept, Some(&token_for(&first)), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let accepted = body_json(response).await;
    assert_eq!(accepted["data"]["status"], "accepted");
    assert_eq!(accepted["data"]["fulfiller_id"], first.id);

    let response = send(&app, Method::POST, &accept, Some(&token_for(&second)), None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");

    let deliver = format!("/api/v1/requests/{id}/deliver");
    let response = send(&app, Method::POST, &deliver, Some(&token_for(&second)), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, Method::POST, &deliver, Some(&token_for(&first)), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let delivered = body_json(response).await;
    assert_eq!(delivered["data"]["status"], "completed");
    assert!(delivered["data"]["completed_at"].is_string());

    let response = send(
        &app,
        Method::GET,
        "/api/v1/requests/deliveries?status=completed",
        Some(&token_for(&first)),
        None,
    )
    .await;
    assert_eq!(body_json(response).await["data"][0]["id"], id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn accept_unknown_request_returns_404(pool: PgPool) {
    let scholar = seed_user(&pool, "Farhan", Role::DayScholar).await;
    let app = build_test_app(pool);

    let response = send(
        &app,
        Method::POST,
        "/api/v1/requests/9999/accept",
        Some(&token_for(&scholar)),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cancel_rules_over_http(pool: PgPool) {
    let owner = seed_user(&pool, "Riya", Role::Hosteller).await;
    let stranger = seed_user(&pool, "Meera", Role::Hosteller).await;
    let scholar = seed_user(&pool, "Farhan", Role::DayScholar).await;
    let app = build_test_app(pool);

    let response = send(
        &app,
        Method::POST,
        "/api/v1/requests",
        Some(&token_for(&owner)),
        Some(request_body("Notebook", 60.0)),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let cancel_delivery = format!("/api/v1/requests/{id}/cancel-delivery");
    let response = send(&app, Method::POST, &cancel_delivery, Some(&token_for(&scholar)), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_STATE");

    let cancel = format!("/api/v1/requests/{id}/cancel");
    let response = send(&app, Method::POST, &cancel, Some(&token_for(&stranger)), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, Method::POST, &cancel, Some(&token_for(&owner)), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "cancelled");

    let response = send(&app, Method::POST, &cancel, Some(&token_for(&owner)), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_STATE");
}

// ---------------------------------------------------------------------------
// Notification inbox
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn notification_inbox_is_owner_scoped(pool: PgPool) {
    let hosteller = seed_user(&pool, "Riya", Role::Hosteller).await;
    let scholar = seed_user(&pool, "Farhan", Role::DayScholar).await;
    let app = build_test_app(pool);
    let scholar_token = token_for(&scholar);
    let hosteller_token = token_for(&hosteller);

    send(
        &app,
        Method::POST,
        "/api/v1/requests",
        Some(&hosteller_token),
        Some(request_body("Bread", 40.0)),
    )
    .await;

    let response = send(&app, Method::GET, "/api/v1/notifications", Some(&scholar_token), None).await;
    let list = body_json(response).await;
    assert_eq!(list["data"][0]["title"], "New Item Request");
    let notification_id = list["data"][0]["id"].as_i64().unwrap();

    let response = send(
        &app,
        Method::GET,
        "/api/v1/notifications/unread-count",
        Some(&scholar_token),
        None,
    )
    .await;
    assert_eq!(body_json(response).await["data"]["count"], 1);

    let read = format!("/api/v1/notifications/{notification_id}/read");
    let response = send(&app, Method::POST, &read, Some(&hosteller_token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, Method::POST, &read, Some(&scholar_token), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        Method::GET,
        "/api/v1/notifications?unread_only=true",
        Some(&scholar_token),
        None,
    )
    .await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());

    let delete = format!("/api/v1/notifications/{notification_id}");
    let response = send(&app, Method::DELETE, &delete, Some(&hosteller_token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = send(&app, Method::DELETE, &delete, Some(&scholar_token), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn mark_all_read_reports_count(pool: PgPool) {
    let hosteller = seed_user(&pool, "Riya", Role::Hosteller).await;
    let scholar = seed_user(&pool, "Farhan", Role::DayScholar).await;
    let app = build_test_app(pool);

    for item in ["Bread", "Milk"] {
        send(
            &app,
            Method::POST,
            "/api/v1/requests",
            Some(&token_for(&hosteller)),
            Some(request_body(item, 40.0)),
        )
        .await;
    }

    let response = send(
        &app,
        Method::POST,
        "/api/v1/notifications/read-all",
        Some(&token_for(&scholar)),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["marked_read"], 2);
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn health_reports_database_and_presence(pool: PgPool) {
    let app = build_test_app(pool);

    let response = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["connections"], 0);
}
