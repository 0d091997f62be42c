pub mod messages;
pub mod notifications;
pub mod ratings;
pub mod requests;
