//! Shared fixtures for lifecycle integration tests.

use std::sync::Arc;

use chrono::{Duration, Utc};
use errand_core::roles::{Actor, Role};
use errand_db::models::request::CreateRequest;
use errand_db::models::user::CreateUser;
use errand_db::repositories::UserRepo;
use errand_events::EventBus;
use errand_lifecycle::{ChatService, RatingService, RequestStore};
use sqlx::PgPool;

pub struct Services {
    pub bus: Arc<EventBus>,
    pub requests: RequestStore,
    pub ratings: RatingService,
    pub chat: ChatService,
}

pub fn services(pool: &PgPool) -> Services {
    let bus = Arc::new(EventBus::default());
    Services {
        requests: RequestStore::new(pool.clone(), Arc::clone(&bus)),
        ratings: RatingService::new(pool.clone(), Arc::clone(&bus)),
        chat: ChatService::new(pool.clone(), Arc::clone(&bus)),
        bus,
    }
}

pub async fn seed_actor(pool: &PgPool, name: &str, role: Role) -> Actor {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: format!("{}@campus.edu", name.to_lowercase()),
            role,
            is_verified: true,
        },
    )
    .await
    .unwrap();
    Actor::new(user.id, role)
}

pub fn new_request(item: &str, price: f64) -> CreateRequest {
    CreateRequest {
        item_name: item.to_string(),
        description: Some("from the main gate shop".to_string()),
        quantity: Some(1),
        expected_price: price,
        deadline: Utc::now() + Duration::hours(3),
        delivery_location: "Hostel C, Room 4".to_string(),
        is_urgent: None,
        category: None,
    }
}

pub async fn points_of(pool: &PgPool, user_id: i64) -> i32 {
    UserRepo::find_by_id(pool, user_id).await.unwrap().unwrap().points
}

pub async fn notification_titles(pool: &PgPool, user_id: i64) -> Vec<String> {
    sqlx::query_scalar("SELECT title FROM notifications WHERE user_id = $1 ORDER BY id")
        .bind(user_id)
        .fetch_all(pool)
        .await
        .unwrap()
}
