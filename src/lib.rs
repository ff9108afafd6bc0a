//! # patbus
//!
//! **patbus** is a pattern-routed message emitter with bounded dispatch
//! concurrency for Rust.
//!
//! Listeners register interest in structured messages using partial-match
//! patterns; submitted messages fan out to every listener of the closest
//! matching pattern, and a per-dispatch counting barrier decides when a
//! message is fully processed so the next queued one can run. The crate is
//! designed as a building block for routers, brokers, and in-process
//! pipelines.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Listener   │   │   Listener   │   │   Listener   │
//!     │ (pattern P1) │   │ (pattern P1) │   │ (pattern P2) │
//!     └──────▲───────┘   └──────▲───────┘   └──────▲───────┘
//!            │ notify(msg, ack) │                  │
//! ┌──────────┴──────────────────┴──────────────────┴─────────────────┐
//! │  Emitter                                                         │
//! │  - Registry (listener lists, best-match lookup via PatternStore) │
//! │  - QueueState (in-flight count + FIFO overflow queue)            │
//! │  - DispatchRecord (per-message completion barrier)               │
//! │  - Bus (broadcast lifecycle events)                              │
//! └──────┬───────────────────────────────────────────────────┬───────┘
//!        │ emit(msg, done)                                   │
//!        ▼                                                   ▼
//!   slot free ─► fan-out to all matched listeners       saturated ─►
//!   (spawned in registration order, one shared          pending queue
//!   Arc<Message>, one Ack each)                         (strict FIFO)
//!        │
//!        └─ last ack ─► done() ─► admit next queued message
//! ```
//!
//! ### Dispatch lifecycle
//! ```text
//! emit(message, done)
//!   ├─► ceiling reached ──► pending.push_back          (returns at once)
//!   └─► slot claimed ──► resolve(message)
//!           ├─ no match ──► done()                      ─► admit next
//!           └─ N listeners ──► record { remaining: N }
//!                 ├─► listener 1 ... ack.done() ──► remaining -= 1
//!                 ├─► listener 2 ... ack.done() ──► remaining -= 1
//!                 └─► listener N ... ack.done() ──► remaining -= 1
//!                                    remaining == 0 ──► done() ─► admit next
//!
//! admit next:
//!   pending front ──► dispatch (slot reused, count unchanged)
//!   queue empty  ──► in-flight count -= 1
//! ```
//!
//! ## Features
//! | Area            | Description                                                  | Key types / traits                  |
//! |-----------------|--------------------------------------------------------------|-------------------------------------|
//! | **Routing**     | Superset pattern matching, most-specific-wins.               | [`Pattern`], [`PatternStore`]       |
//! | **Dispatch**    | Bounded concurrency, FIFO overflow, fan-out completion.      | [`Emitter`], [`Ack`]                |
//! | **Listeners**   | Async delivery targets, closure adapters.                    | [`Listener`], [`ListenerFn`]        |
//! | **Messages**    | Immutable attribute maps with arbitrary-depth JSON values.   | [`Message`]                         |
//! | **Events**      | Broadcast lifecycle events for metrics/debugging.            | [`Bus`], [`Event`], [`EventKind`]   |
//! | **Errors**      | Typed refusals and conversion failures.                      | [`EmitError`], [`AttrError`]        |
//! | **Configuration** | Concurrency ceiling and bus sizing.                        | [`EmitterConfig`]                   |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use patbus::{Ack, Emitter, EmitterConfig, ListenerFn, Message, Pattern};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut cfg = EmitterConfig::default();
//!     cfg.concurrency = 2;
//!
//!     let emitter = Emitter::new(cfg);
//!
//!     // Register a listener for every "orders" message.
//!     emitter.on(
//!         Pattern::new().with("topic", "orders"),
//!         ListenerFn::arc("order-log", |msg: Arc<Message>, ack: Ack| async move {
//!             println!("order: {:?}", msg.get("id"));
//!             ack.done();
//!         }),
//!     );
//!
//!     // Submit a matching message and wait for the fan-out to finish.
//!     emitter
//!         .emit_and_wait(Message::new().with("topic", "orders").with("id", 42))
//!         .await;
//! }
//! ```

mod config;
mod core;
mod dispatch;
mod error;
mod events;
mod listeners;
mod matcher;
mod message;

// ---- Public re-exports ----

pub use config::EmitterConfig;
pub use core::{Emitter, EmitterBuilder};
pub use dispatch::Ack;
pub use error::{AttrError, EmitError};
pub use events::{Bus, Event, EventKind};
pub use listeners::{Listener, ListenerFn, ListenerRef, Listeners};
pub use matcher::{LinearStore, PatternStore};
pub use message::{Message, Pattern};

// Optional: expose a simple built-in event logger (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use events::LogWriter;
