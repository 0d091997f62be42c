//! Integration tests for notification, message and rating storage.

use errand_core::notification::NotificationCategory;
use errand_core::roles::Role;
use errand_db::models::message::{ConversationScope, SendMessage};
use errand_db::models::notification::NotificationDraft;
use errand_db::models::rating::NewRating;
use errand_db::models::user::CreateUser;
use errand_db::repositories::{MessageRepo, NotificationRepo, RatingRepo, UserRepo};
use sqlx::PgPool;

async fn seed_user(pool: &PgPool, email: &str, role: Role, verified: bool) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            name: email.to_string(),
            email: email.to_string(),
            role,
            is_verified: verified,
        },
    )
    .await
    .unwrap()
    .id
}

fn draft(title: &str) -> NotificationDraft {
    NotificationDraft {
        category: NotificationCategory::Request,
        title: title.to_string(),
        message: format!("{title} body"),
        related_id: Some(7),
    }
}

fn message(receiver_id: i64, content: &str) -> SendMessage {
    SendMessage {
        receiver_id,
        content: content.to_string(),
        request_id: None,
        product_id: None,
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn broadcast_insert_creates_one_row_per_user(pool: PgPool) {
    let a = seed_user(&pool, "a@campus.edu", Role::DayScholar, true).await;
    let b = seed_user(&pool, "b@campus.edu", Role::DayScholar, true).await;
    seed_user(&pool, "c@campus.edu", Role::DayScholar, false).await;

    let audience = UserRepo::verified_ids_with_role(&pool, Role::DayScholar)
        .await
        .unwrap();
    assert_eq!(audience, vec![a, b]);

    let rows = NotificationRepo::create_for_users(&pool, &audience, &draft("New request"))
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|n| n.category == "request" && !n.is_read));

    let empty = NotificationRepo::create_for_users(&pool, &[], &draft("Nobody"))
        .await
        .unwrap();
    assert!(empty.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn read_state_is_scoped_to_owner(pool: PgPool) {
    let owner = seed_user(&pool, "o@campus.edu", Role::Hosteller, true).await;
    let other = seed_user(&pool, "x@campus.edu", Role::Hosteller, true).await;
    let first = NotificationRepo::create(&pool, owner, &draft("One")).await.unwrap();
    NotificationRepo::create(&pool, owner, &draft("Two")).await.unwrap();

    assert_eq!(NotificationRepo::unread_count(&pool, owner).await.unwrap(), 2);
    assert!(!NotificationRepo::mark_read(&pool, first.id, other).await.unwrap());
    assert!(NotificationRepo::mark_read(&pool, first.id, owner).await.unwrap());
    assert_eq!(NotificationRepo::unread_count(&pool, owner).await.unwrap(), 1);

    let unread = NotificationRepo::list_for_user(&pool, owner, true, None, None)
        .await
        .unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].title, "Two");

    assert_eq!(NotificationRepo::mark_all_read(&pool, owner).await.unwrap(), 1);
    assert!(!NotificationRepo::delete(&pool, first.id, other).await.unwrap());
    assert!(NotificationRepo::delete(&pool, first.id, owner).await.unwrap());
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn conversation_summaries_count_unread_per_counterpart(pool: PgPool) {
    let me = seed_user(&pool, "me@campus.edu", Role::Hosteller, true).await;
    let a = seed_user(&pool, "a@campus.edu", Role::DayScholar, true).await;
    let b = seed_user(&pool, "b@campus.edu", Role::DayScholar, true).await;

    MessageRepo::create(&pool, a, &message(me, "hi")).await.unwrap();
    MessageRepo::create(&pool, a, &message(me, "still there?")).await.unwrap();
    MessageRepo::create(&pool, me, &message(b, "on my way?")).await.unwrap();

    let summaries = MessageRepo::conversations(&pool, me).await.unwrap();
    assert_eq!(summaries.len(), 2);

    let with_a = summaries.iter().find(|s| s.counterpart_id == a).unwrap();
    assert_eq!(with_a.unread_count, 2);
    assert_eq!(with_a.latest_message.content, "still there?");

    let with_b = summaries.iter().find(|s| s.counterpart_id == b).unwrap();
    assert_eq!(with_b.unread_count, 0);

    let marked = MessageRepo::mark_read(&pool, me, Some(a), ConversationScope::default())
        .await
        .unwrap();
    assert_eq!(marked, 2);

    let history = MessageRepo::conversation(&pool, me, a, ConversationScope::default())
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|m| m.is_read));
    assert_eq!(history[0].content, "hi");
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_rating_insert_returns_none(pool: PgPool) {
    let rater = seed_user(&pool, "r@campus.edu", Role::Hosteller, true).await;
    let rated = seed_user(&pool, "d@campus.edu", Role::DayScholar, true).await;
    let rating = NewRating {
        rater_id: rater,
        rated_user_id: rated,
        transaction_type: "request",
        transaction_id: 42,
        score: 4,
        comment: Some("quick"),
    };

    assert!(RatingRepo::insert(&pool, &rating).await.unwrap().is_some());
    assert!(RatingRepo::insert(&pool, &rating).await.unwrap().is_none());
    assert_eq!(RatingRepo::scores_for_user(&pool, rated).await.unwrap(), vec![4]);
}
