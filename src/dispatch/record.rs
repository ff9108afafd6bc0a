//! # Per-dispatch completion barrier.
//!
//! A [`DispatchRecord`] is created for every message that matched at least
//! one listener and destroyed when the fan-out completes. It counts the
//! completion signals still outstanding; the last one runs the submitter's
//! callback and admits the next queued message. Records are never pooled or
//! reused.
//!
//! Each listener holds its own [`Ack`] bound to the shared record.
//! `Ack::done` consumes the handle, so one listener cannot signal twice; an
//! `Ack` dropped unconsumed publishes
//! [`EventKind::AckAbandoned`](crate::EventKind::AckAbandoned) and leaves
//! the dispatch incomplete — the slot stays occupied and the queue behind it
//! stalls.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::emitter::Shared;
use crate::events::{Event, EventKind};

use super::queue::DoneFn;

/// Counting barrier for one dispatched message.
pub(crate) struct DispatchRecord {
    /// Listeners invoked but not yet signaled done.
    remaining: AtomicUsize,
    /// Submitter's callback; taken exactly once.
    on_done: Mutex<Option<DoneFn>>,
    /// Fan-out width, kept for the completion event.
    matched: usize,
    shared: Arc<Shared>,
}

impl DispatchRecord {
    pub(crate) fn new(matched: usize, on_done: DoneFn, shared: Arc<Shared>) -> Arc<Self> {
        Arc::new(Self {
            remaining: AtomicUsize::new(matched),
            on_done: Mutex::new(Some(on_done)),
            matched,
            shared,
        })
    }

    /// One listener finished. The last signal completes the dispatch:
    /// run the submitter's callback, publish, admit the next queued message.
    fn settle(&self) {
        if self.remaining.fetch_sub(1, Ordering::AcqRel) != 1 {
            return;
        }
        if let Some(done) = self.on_done.lock().take() {
            done();
        }
        self.shared.publish(
            Event::new(EventKind::DispatchCompleted).with_matched(self.matched),
        );
        self.shared.admit_next();
    }

    /// A listener dropped its ack without signaling. The count is left
    /// untouched: the dispatch never completes and the slot stays occupied.
    fn abandon(&self, listener: &str) {
        self.shared.publish(
            Event::new(EventKind::AckAbandoned)
                .with_listener(listener)
                .with_note(format!("listener '{listener}' dropped its ack")),
        );
    }
}

/// Completion signal handed to one listener of one dispatch.
///
/// Consume with [`Ack::done`] when processing is finished — on the same turn
/// or arbitrarily later. Move semantics make a second signal from the same
/// listener unrepresentable.
pub struct Ack {
    record: Option<Arc<DispatchRecord>>,
    listener: Arc<str>,
}

impl Ack {
    pub(crate) fn new(record: Arc<DispatchRecord>, listener: impl Into<Arc<str>>) -> Self {
        Self {
            record: Some(record),
            listener: listener.into(),
        }
    }

    /// Signals that this listener has finished processing the message.
    pub fn done(mut self) {
        if let Some(record) = self.record.take() {
            record.settle();
        }
    }
}

impl Drop for Ack {
    fn drop(&mut self) {
        if let Some(record) = self.record.take() {
            record.abandon(&self.listener);
        }
    }
}

impl fmt::Debug for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ack")
            .field("listener", &self.listener)
            .field("consumed", &self.record.is_none())
            .finish()
    }
}
