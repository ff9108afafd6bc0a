//! # Simple logging consumer for debugging and demos.
//!
//! [`LogWriter`] prints bus events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [registered] listener=audit
//! [queued] depth=3
//! [dispatch] matched=2
//! [no-match]
//! [completed] matched=2
//! [ack-abandoned] note="listener 'audit' dropped its ack"
//! [panicked] listener=audit
//! ```

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::{Bus, Event, EventKind};

/// Simple stdout logging consumer.
///
/// Enabled via the `logging` feature. Prints human-readable event lines for
/// debugging and demonstration purposes. Not intended for production use —
/// subscribe to the [`Bus`] directly for structured logging or metrics.
pub struct LogWriter;

impl LogWriter {
    /// Subscribes to the bus and spawns a worker that prints every event.
    ///
    /// The worker exits when the bus is dropped; on lag it skips the missed
    /// events and keeps going.
    pub fn attach(bus: &Bus) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => Self::write(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    fn write(ev: &Event) {
        match ev.kind {
            EventKind::ListenerRegistered => {
                println!("[registered] listener={:?}", ev.listener.as_deref());
            }
            EventKind::ListenerRemoved => {
                println!("[removed] listener={:?}", ev.listener.as_deref());
            }
            EventKind::MessageQueued => {
                println!("[queued] depth={:?}", ev.queued);
            }
            EventKind::DispatchStarted => {
                println!("[dispatch] matched={:?}", ev.matched);
            }
            EventKind::DispatchNoMatch => {
                println!("[no-match]");
            }
            EventKind::DispatchCompleted => {
                println!("[completed] matched={:?}", ev.matched);
            }
            EventKind::AckAbandoned => {
                println!("[ack-abandoned] note={:?}", ev.note.as_deref());
            }
            EventKind::ListenerPanicked => {
                println!("[panicked] listener={:?}", ev.listener.as_deref());
            }
        }
    }
}
