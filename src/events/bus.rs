//! # Event bus for broadcasting emitter events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from the dispatch engine.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls
//!   `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent events for all
//!   receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip
//!   `n` oldest items.
//! - **No persistence**: events are lost if there are no active receivers at
//!   send time.

use tokio::sync::broadcast;

use super::Event;

/// Broadcast channel for emitter events.
///
/// Thin wrapper over [`tokio::sync::broadcast`] that provides a
/// `publish`/`subscribe` API. Receivers get clones of each event.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// ### Notes
    /// - Capacity is **shared** across all receivers (not per-receiver).
    /// - When receivers lag, they will observe `RecvError::Lagged`.
    /// - The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped (this function still
    /// returns immediately).
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Publishes a borrowed event by cloning it.
    ///
    /// Shorthand for `publish(ev.clone())`, useful when you already have a
    /// reference.
    pub fn publish_ref(&self, ev: &Event) {
        let _ = self.tx.send(ev.clone());
    }

    /// Creates a new receiver that will observe subsequent events.
    ///
    /// - Each call creates an **independent** receiver.
    /// - A receiver only gets events **sent after** it subscribes.
    /// - Slow receivers get `RecvError::Lagged(n)` and skip over missed items.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn publish_reaches_subscriber() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::DispatchNoMatch).with_queued(0));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::DispatchNoMatch);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let bus = Bus::new(1);
        // Must not panic or block.
        bus.publish(Event::new(EventKind::DispatchCompleted));
    }
}
