//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods whose
//! first argument is a Postgres executor: `&PgPool` for standalone calls or
//! `&mut *tx` to participate in a caller's transaction.

pub mod message_repo;
pub mod notification_repo;
pub mod product_repo;
pub mod rating_repo;
pub mod request_repo;
pub mod user_repo;

pub use message_repo::MessageRepo;
pub use notification_repo::NotificationRepo;
pub use product_repo::ProductRepo;
pub use rating_repo::RatingRepo;
pub use request_repo::RequestRepo;
pub use user_repo::UserRepo;
