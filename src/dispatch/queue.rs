//! # Admission state: in-flight counter plus FIFO overflow queue.
//!
//! One [`QueueState`] lives behind the emitter's mutex. All transitions
//! happen while the lock is held; dispatching itself (resolving listeners,
//! spawning futures, running callbacks) happens strictly outside it.
//!
//! ## Invariants
//! - `in_flight` never exceeds a positive ceiling (`try_admit` refuses).
//! - Pending submissions leave in exactly the order they arrived.
//! - A freed slot admits the queue front without touching `in_flight`;
//!   `in_flight` drops only when the queue is empty.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::message::Message;

/// Submitter completion callback, invoked once the dispatch fully completes.
pub(crate) type DoneFn = Box<dyn FnOnce() + Send + 'static>;

/// A (message, completion-callback) pair waiting for an admission slot.
///
/// Owned exclusively by the queue until dispatched.
pub(crate) struct Pending {
    pub message: Arc<Message>,
    pub done: DoneFn,
}

/// Mutable admission state.
#[derive(Default)]
pub(crate) struct QueueState {
    /// Messages currently occupying a dispatch slot.
    pub in_flight: usize,
    /// FIFO queue of submissions past the ceiling.
    pub pending: VecDeque<Pending>,
}

impl QueueState {
    /// Claims a slot if the ceiling allows it.
    ///
    /// Returns `false` when `limit` is set and already reached; the caller
    /// then queues (or refuses) the submission instead.
    pub fn try_admit(&mut self, limit: Option<usize>) -> bool {
        if let Some(limit) = limit {
            if self.in_flight >= limit {
                return false;
            }
        }
        self.in_flight += 1;
        true
    }

    /// Appends a submission to the overflow queue, returning the new depth.
    pub fn push(&mut self, pending: Pending) -> usize {
        self.pending.push_back(pending);
        self.pending.len()
    }

    /// Takes the next pending submission for the slot just freed.
    ///
    /// When the queue is empty the slot is released instead (`in_flight`
    /// decremented) and `None` is returned.
    pub fn take_next_or_release(&mut self) -> Option<Pending> {
        match self.pending.pop_front() {
            Some(p) => Some(p),
            None => {
                self.in_flight = self.in_flight.saturating_sub(1);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(tag: &str) -> Pending {
        Pending {
            message: Arc::new(Message::new().with("tag", tag)),
            done: Box::new(|| {}),
        }
    }

    #[test]
    fn unbounded_always_admits() {
        let mut q = QueueState::default();
        for _ in 0..100 {
            assert!(q.try_admit(None));
        }
        assert_eq!(q.in_flight, 100);
    }

    #[test]
    fn ceiling_refuses_at_limit() {
        let mut q = QueueState::default();
        assert!(q.try_admit(Some(2)));
        assert!(q.try_admit(Some(2)));
        assert!(!q.try_admit(Some(2)));
        assert_eq!(q.in_flight, 2);
    }

    #[test]
    fn overflow_is_fifo() {
        let mut q = QueueState::default();
        assert!(q.try_admit(Some(1)));
        q.push(pending("a"));
        q.push(pending("b"));

        let first = q.take_next_or_release().unwrap();
        assert_eq!(
            first.message.get("tag"),
            Some(&serde_json::json!("a")),
            "queue front must leave first"
        );
        // Slot was reused, not released.
        assert_eq!(q.in_flight, 1);

        let second = q.take_next_or_release().unwrap();
        assert_eq!(second.message.get("tag"), Some(&serde_json::json!("b")));
        assert_eq!(q.in_flight, 1);
    }

    #[test]
    fn empty_queue_releases_the_slot() {
        let mut q = QueueState::default();
        assert!(q.try_admit(Some(1)));
        assert!(q.take_next_or_release().is_none());
        assert_eq!(q.in_flight, 0);
    }
}
