//! # Core listener trait.
//!
//! `Listener` is the delivery target for dispatched messages. Each listener
//! of a matched pattern receives the shared message and its own [`Ack`],
//! bound to that dispatch's completion barrier.
//!
//! ## Contract
//! - Consume the [`Ack`] exactly when processing is finished — on the same
//!   turn or arbitrarily later (after timers, I/O, a spawned task).
//! - An `Ack` that is dropped unconsumed leaves the dispatch incomplete
//!   forever: the in-flight slot stays occupied and queued messages behind
//!   it never run. The emitter publishes
//!   [`EventKind::AckAbandoned`](crate::EventKind::AckAbandoned) when it
//!   sees this, but does not repair it.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use patbus::{Ack, Listener, Message};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Listener for Audit {
//!     async fn notify(&self, message: Arc<Message>, ack: Ack) {
//!         // write audit record...
//!         let _ = message;
//!         ack.done();
//!     }
//!
//!     fn name(&self) -> &str {
//!         "audit"
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::dispatch::Ack;
use crate::message::Message;

/// Contract for message listeners.
///
/// `notify` futures are spawned in registration order within one dispatch
/// turn; implementations run concurrently with each other and with the
/// emitter. Completion is reported through the [`Ack`], not through the
/// future's return.
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    /// Handles one dispatched message.
    ///
    /// # Parameters
    /// - `message`: the shared message (one allocation per dispatch)
    /// - `ack`: this listener's completion signal; consume exactly once
    async fn notify(&self, message: Arc<Message>, ack: Ack);

    /// Human-readable name (for diagnostics).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared listener handle stored by the registry.
///
/// Removal matches by handle identity (`Arc::ptr_eq`), so keep the clone you
/// registered if you intend to remove it later.
pub type ListenerRef = Arc<dyn Listener>;

/// Ordered listener list registered under one exact pattern — the value type
/// the pattern store holds. Never stored empty: removing the last listener
/// removes the pattern entry itself.
pub type Listeners = Vec<ListenerRef>;
