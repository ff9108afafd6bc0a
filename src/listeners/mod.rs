//! Listener abstractions.
//!
//! - [`Listener`]: async, ack-carrying delivery target;
//! - [`ListenerFn`]: closure-backed implementation;
//! - [`ListenerRef`]: the shared handle the registry stores.

mod listener;
mod listener_fn;

pub use listener::{Listener, ListenerRef, Listeners};
pub use listener_fn::ListenerFn;
