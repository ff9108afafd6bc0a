//! Emitter lifecycle events and the broadcast bus that carries them.
//!
//! Every observable transition of the dispatch engine (queuing, dispatch
//! start, fan-out completion, registry changes, misbehaving listeners) is
//! published as an [`Event`] on the [`Bus`]. Subscribe for metrics, tracing,
//! or tests; delivery is fire-and-forget and never blocks dispatch.

mod bus;
mod event;

#[cfg(feature = "logging")]
mod log;

pub use bus::Bus;
pub use event::{Event, EventKind};

#[cfg(feature = "logging")]
pub use log::LogWriter;
