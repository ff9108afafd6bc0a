//! # Lifecycle events published by the emitter.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Registry events**: listener registration and removal
//! - **Dispatch events**: admission, fan-out, and completion of messages
//! - **Contract events**: misbehaving listeners (abandoned acks, panics)
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! fan-out width, queue depth, and listener names.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use patbus::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::DispatchStarted)
//!     .with_matched(2)
//!     .with_queued(0);
//!
//! assert_eq!(ev.kind, EventKind::DispatchStarted);
//! assert_eq!(ev.matched, Some(2));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of emitter events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Registry events ===
    /// A listener was registered under a pattern.
    ///
    /// Sets:
    /// - `listener`: listener name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ListenerRegistered,

    /// A listener was removed from a pattern.
    ///
    /// Sets:
    /// - `listener`: listener name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ListenerRemoved,

    // === Dispatch events ===
    /// The concurrency ceiling was reached; the message joined the FIFO queue.
    ///
    /// Sets:
    /// - `queued`: pending-queue depth after the push
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    MessageQueued,

    /// A message was admitted and its fan-out began.
    ///
    /// Sets:
    /// - `matched`: number of listeners invoked
    /// - `queued`: pending-queue depth at admission
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    DispatchStarted,

    /// A message matched no listeners; its callback ran and the slot was
    /// freed immediately.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    DispatchNoMatch,

    /// Every listener of a dispatch signaled completion and the submitter's
    /// callback ran.
    ///
    /// Sets:
    /// - `matched`: number of listeners that were invoked
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    DispatchCompleted,

    // === Contract events ===
    /// A listener dropped its ack without signaling; the dispatch will never
    /// complete and its slot stays occupied.
    ///
    /// Sets:
    /// - `note`: diagnostic detail
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    AckAbandoned,

    /// A listener panicked during delivery.
    ///
    /// Sets:
    /// - `listener`: listener name
    /// - `note`: panic info/message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ListenerPanicked,
}

/// Emitter event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Number of listeners involved in a fan-out.
    pub matched: Option<usize>,
    /// Pending-queue depth at the time of the event.
    pub queued: Option<usize>,
    /// Name of the listener, if applicable.
    pub listener: Option<Arc<str>>,
    /// Human-readable detail (panics, abandoned acks).
    pub note: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            matched: None,
            queued: None,
            listener: None,
            note: None,
        }
    }

    /// Attaches a fan-out width.
    #[inline]
    pub fn with_matched(mut self, n: usize) -> Self {
        self.matched = Some(n);
        self
    }

    /// Attaches a pending-queue depth.
    #[inline]
    pub fn with_queued(mut self, n: usize) -> Self {
        self.queued = Some(n);
        self
    }

    /// Attaches a listener name.
    #[inline]
    pub fn with_listener(mut self, name: impl Into<Arc<str>>) -> Self {
        self.listener = Some(name.into());
        self
    }

    /// Attaches a human-readable detail.
    #[inline]
    pub fn with_note(mut self, note: impl Into<Arc<str>>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// True for events that indicate a listener contract violation.
    #[inline]
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self.kind,
            EventKind::AckAbandoned | EventKind::ListenerPanicked
        )
    }
}
