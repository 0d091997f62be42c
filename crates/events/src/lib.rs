//! Domain events and their side effects.
//!
//! - [`DomainEvent`]: what happened, as a closed enum.
//! - [`EventDispatcher`]: runs the in-transaction subscribers
//!   ([`IncentiveLedger`] then [`NotificationFanout`]) against the caller's
//!   open transaction and returns an [`EventEnvelope`].
//! - [`EventBus`]: in-process broadcast of committed envelopes, consumed by
//!   the real-time push layer.

pub mod bus;
pub mod dispatch;
pub mod event;
pub mod fanout;
pub mod ledger;

pub use bus::{EventBus, EventEnvelope};
pub use dispatch::EventDispatcher;
pub use event::DomainEvent;
pub use fanout::NotificationFanout;
pub use ledger::IncentiveLedger;
