//! Live push of persisted notifications.

mod router;

pub use router::NotificationPushRouter;
