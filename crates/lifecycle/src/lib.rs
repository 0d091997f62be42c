//! Transactional services for delivery requests, ratings and chat.
//!
//! Every mutating call follows the same shape: open a transaction, apply a
//! guarded write, run the [`EventDispatcher`](errand_events::EventDispatcher)
//! on the same transaction, commit, then publish the envelope on the
//! [`EventBus`](errand_events::EventBus).

pub mod assignment;
pub mod chat;
pub mod error;
pub mod ratings;
pub mod store;

pub use assignment::AssignmentCoordinator;
pub use chat::ChatService;
pub use error::LifecycleError;
pub use ratings::RatingService;
pub use store::RequestStore;
