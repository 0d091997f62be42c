//! HTTP-level tests for the ratings and message history endpoints.

mod common;

use axum::http::{Method, StatusCode};
use errand_core::roles::Role;
use errand_db::models::user::User;
use serde_json::json;
use sqlx::PgPool;

use common::{body_json, build_test_app, request_body, seed_user, send, token_for};

/// Create a request as `hosteller`, have `scholar` accept and deliver it.
async fn completed_request(app: &axum::Router, hosteller: &User, scholar: &User) -> i64 {
    let response = send(
        app,
        Method::POST,
        "/api/v1/requests",
        Some(&token_for(hosteller)),
        Some(request_body("Printer paper", 120.0)),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    for action in ["accept", "deliver"] {
        let response = send(
            app,
            Method::POST,
            &format!("/api/v1/requests/{id}/{action}"),
            Some(&token_for(scholar)),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK, "{action} failed");
    }
    id
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn rating_a_completed_request_once(pool: PgPool) {
    let hosteller = seed_user(&pool, "Riya", Role::Hosteller).await;
    let scholar = seed_user(&pool, "Farhan", Role::DayScholar).await;
    let app = build_test_app(pool);
    let request_id = completed_request(&app, &hosteller, &scholar).await;

    let body = json!({ "request_id": request_id, "score": 5, "comment": "Quick delivery" });
    let response = send(
        &app,
        Method::POST,
        "/api/v1/ratings/request",
        Some(&token_for(&hosteller)),
        Some(body.clone()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let rating = body_json(response).await;
    assert_eq!(rating["data"]["rated_user_id"], scholar.id);
    assert_eq!(rating["data"]["transaction_type"], "request");

    let response = send(
        &app,
        Method::POST,
        "/api/v1/ratings/request",
        Some(&token_for(&hosteller)),
        Some(body),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(
        &app,
        Method::GET,
        &format!("/api/v1/ratings/user/{}", scholar.id),
        Some(&token_for(&hosteller)),
        None,
    )
    .await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn rating_unknown_user_list_returns_404(pool: PgPool) {
    let hosteller = seed_user(&pool, "Riya", Role::Hosteller).await;
    let app = build_test_app(pool);

    let response = send(
        &app,
        Method::GET,
        "/api/v1/ratings/user/9999",
        Some(&token_for(&hosteller)),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Message history
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn request_thread_is_visible_to_parties_only(pool: PgPool) {
    let hosteller = seed_user(&pool, "Riya", Role::Hosteller).await;
    let scholar = seed_user(&pool, "Farhan", Role::DayScholar).await;
    let outsider = seed_user(&pool, "Gopal", Role::DayScholar).await;
    let app = build_test_app(pool);
    let request_id = completed_request(&app, &hosteller, &scholar).await;

    let response = send(
        &app,
        Method::POST,
        "/api/v1/messages",
        Some(&token_for(&scholar)),
        Some(json!({ "receiver_id": hosteller.id, "content": "Left it at the desk", "request_id": request_id })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let thread = format!("/api/v1/messages/request/{request_id}");
    let response = send(&app, Method::GET, &thread, Some(&token_for(&outsider)), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, Method::GET, &thread, Some(&token_for(&hosteller)), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let messages = body_json(response).await;
    assert_eq!(messages["data"][0]["content"], "Left it at the desk");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn conversation_summary_tracks_unread(pool: PgPool) {
    let hosteller = seed_user(&pool, "Riya", Role::Hosteller).await;
    let scholar = seed_user(&pool, "Farhan", Role::DayScholar).await;
    let app = build_test_app(pool);

    for content in ["Hi", "Are you near the gate?"] {
        send(
            &app,
            Method::POST,
            "/api/v1/messages",
            Some(&token_for(&hosteller)),
            Some(json!({ "receiver_id": scholar.id, "content": content })),
        )
        .await;
    }

    let response = send(
        &app,
        Method::GET,
        "/api/v1/messages/conversations",
        Some(&token_for(&scholar)),
        None,
    )
    .await;
    let summary = body_json(response).await;
    assert_eq!(summary["data"][0]["counterpart_id"], hosteller.id);
    assert_eq!(summary["data"][0]["unread_count"], 2);
    assert_eq!(summary["data"][0]["latest_message"]["content"], "Are you near the gate?");

    let response = send(
        &app,
        Method::GET,
        &format!("/api/v1/messages/conversation/{}", hosteller.id),
        Some(&token_for(&scholar)),
        None,
    )
    .await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);

    let response = send(
        &app,
        Method::GET,
        "/api/v1/messages/conversations",
        Some(&token_for(&scholar)),
        None,
    )
    .await;
    assert_eq!(body_json(response).await["data"][0]["unread_count"], 0);
}
