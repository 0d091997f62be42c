//! Runs every in-transaction subscriber for an event.

use sqlx::PgConnection;

use crate::bus::EventEnvelope;
use crate::event::DomainEvent;
use crate::fanout::NotificationFanout;
use crate::ledger::IncentiveLedger;

/// Applies an event's durable side effects on the caller's connection.
///
/// The caller owns the transaction: it commits after `dispatch` returns and
/// only then publishes the returned envelope on the bus.
pub struct EventDispatcher;

impl EventDispatcher {
    pub async fn dispatch(
        conn: &mut PgConnection,
        event: DomainEvent,
    ) -> Result<EventEnvelope, sqlx::Error> {
        IncentiveLedger::apply(&mut *conn, &event).await?;
        let notifications = NotificationFanout::deliver(&mut *conn, &event).await?;
        Ok(EventEnvelope::new(event, notifications))
    }
}
