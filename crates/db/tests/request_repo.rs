//! Integration tests for request persistence and guarded transitions.

use chrono::{Duration, Utc};
use errand_core::lifecycle::RequestStatus;
use errand_core::roles::Role;
use errand_db::models::request::{CreateRequest, OpenRequestFilter};
use errand_db::models::user::CreateUser;
use errand_db::repositories::{RequestRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, email: &str, role: Role) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            role,
            is_verified: true,
        },
    )
    .await
    .unwrap()
    .id
}

fn new_request(item: &str, category: &str, urgent: bool) -> CreateRequest {
    CreateRequest {
        item_name: item.to_string(),
        description: None,
        quantity: None,
        expected_price: 40.0,
        deadline: Utc::now() + Duration::hours(4),
        delivery_location: "Hostel B, Room 12".to_string(),
        is_urgent: Some(urgent),
        category: Some(category.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Create / list
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn create_starts_pending_without_fulfiller(pool: PgPool) {
    let requester = seed_user(&pool, "h@campus.edu", Role::Hosteller).await;
    let request = RequestRepo::create(&pool, requester, &new_request("Bread", "groceries", false))
        .await
        .unwrap();

    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.fulfiller_id, None);
    assert_eq!(request.quantity, 1);
    assert_eq!(request.category, "groceries");
}

#[sqlx::test(migrations = "./migrations")]
async fn open_list_orders_urgent_first_and_hides_terminal(pool: PgPool) {
    let requester = seed_user(&pool, "h@campus.edu", Role::Hosteller).await;
    let fulfiller = seed_user(&pool, "d@campus.edu", Role::DayScholar).await;

    let plain = RequestRepo::create(&pool, requester, &new_request("Pens", "stationery", false))
        .await
        .unwrap();
    let urgent = RequestRepo::create(&pool, requester, &new_request("Paracetamol", "medicines", true))
        .await
        .unwrap();
    let cancelled = RequestRepo::create(&pool, requester, &new_request("Chips", "food", false))
        .await
        .unwrap();
    RequestRepo::cancel_by_requester(&pool, cancelled.id, requester)
        .await
        .unwrap()
        .unwrap();
    let accepted = RequestRepo::create(&pool, requester, &new_request("Milk", "groceries", false))
        .await
        .unwrap();
    RequestRepo::claim(&pool, accepted.id, fulfiller).await.unwrap().unwrap();

    let open = RequestRepo::list_open(&pool, &OpenRequestFilter::default())
        .await
        .unwrap();
    let ids: Vec<i64> = open.iter().map(|r| r.id).collect();

    assert_eq!(ids[0], urgent.id);
    assert!(ids.contains(&plain.id));
    assert!(ids.contains(&accepted.id));
    assert!(!ids.contains(&cancelled.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn open_list_filters_by_category_and_search(pool: PgPool) {
    let requester = seed_user(&pool, "h@campus.edu", Role::Hosteller).await;
    RequestRepo::create(&pool, requester, &new_request("Notebook", "stationery", false))
        .await
        .unwrap();
    let target = RequestRepo::create(&pool, requester, &new_request("Brown bread", "groceries", false))
        .await
        .unwrap();

    let by_category = RequestRepo::list_open(
        &pool,
        &OpenRequestFilter {
            category: Some("groceries".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].id, target.id);

    let by_search = RequestRepo::list_open(
        &pool,
        &OpenRequestFilter {
            search: Some("BREAD".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_search.len(), 1);
    assert_eq!(by_search[0].id, target.id);

    let wildcard = RequestRepo::list_open(
        &pool,
        &OpenRequestFilter {
            search: Some("%".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(wildcard.is_empty());
}

// ---------------------------------------------------------------------------
// Guarded transitions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn second_claim_matches_no_row(pool: PgPool) {
    let requester = seed_user(&pool, "h@campus.edu", Role::Hosteller).await;
    let first = seed_user(&pool, "d1@campus.edu", Role::DayScholar).await;
    let second = seed_user(&pool, "d2@campus.edu", Role::DayScholar).await;
    let request = RequestRepo::create(&pool, requester, &new_request("Eggs", "groceries", false))
        .await
        .unwrap();

    let won = RequestRepo::claim(&pool, request.id, first).await.unwrap();
    let lost = RequestRepo::claim(&pool, request.id, second).await.unwrap();

    let won = won.expect("first claim should succeed");
    assert_eq!(won.status, RequestStatus::Accepted);
    assert_eq!(won.fulfiller_id, Some(first));
    assert!(lost.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn complete_requires_assigned_fulfiller(pool: PgPool) {
    let requester = seed_user(&pool, "h@campus.edu", Role::Hosteller).await;
    let fulfiller = seed_user(&pool, "d1@campus.edu", Role::DayScholar).await;
    let stranger = seed_user(&pool, "d2@campus.edu", Role::DayScholar).await;
    let request = RequestRepo::create(&pool, requester, &new_request("Soap", "other", false))
        .await
        .unwrap();
    RequestRepo::claim(&pool, request.id, fulfiller).await.unwrap().unwrap();

    assert!(RequestRepo::complete(&pool, request.id, stranger)
        .await
        .unwrap()
        .is_none());

    let done = RequestRepo::complete(&pool, request.id, fulfiller)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done.status, RequestStatus::Completed);
    assert!(done.completed_at.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn release_moves_fulfiller_to_cancelled_column(pool: PgPool) {
    let requester = seed_user(&pool, "h@campus.edu", Role::Hosteller).await;
    let fulfiller = seed_user(&pool, "d@campus.edu", Role::DayScholar).await;
    let request = RequestRepo::create(&pool, requester, &new_request("Rice", "groceries", false))
        .await
        .unwrap();
    RequestRepo::claim(&pool, request.id, fulfiller).await.unwrap().unwrap();

    let released = RequestRepo::release_by_fulfiller(&pool, request.id, fulfiller)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(released.status, RequestStatus::Cancelled);
    assert_eq!(released.fulfiller_id, None);
    assert_eq!(released.cancelled_fulfiller_id, Some(fulfiller));

    let history = RequestRepo::list_for_fulfiller(&pool, fulfiller, None)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn terminal_requests_reject_further_transitions(pool: PgPool) {
    let requester = seed_user(&pool, "h@campus.edu", Role::Hosteller).await;
    let fulfiller = seed_user(&pool, "d@campus.edu", Role::DayScholar).await;
    let request = RequestRepo::create(&pool, requester, &new_request("Tea", "food", false))
        .await
        .unwrap();
    RequestRepo::cancel_by_requester(&pool, request.id, requester)
        .await
        .unwrap()
        .unwrap();

    assert!(RequestRepo::claim(&pool, request.id, fulfiller).await.unwrap().is_none());
    assert!(RequestRepo::cancel_by_requester(&pool, request.id, requester)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn fulfiller_status_check_rejects_inconsistent_rows(pool: PgPool) {
    let requester = seed_user(&pool, "h@campus.edu", Role::Hosteller).await;
    let request = RequestRepo::create(&pool, requester, &new_request("Jam", "food", false))
        .await
        .unwrap();

    let result = sqlx::query("UPDATE requests SET status_id = 2 WHERE id = $1")
        .bind(request.id)
        .execute(&pool)
        .await;
    assert!(result.is_err(), "accepted without fulfiller must violate the check");
}
