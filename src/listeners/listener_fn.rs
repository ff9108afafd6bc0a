//! # Closure-backed listener (`ListenerFn`)
//!
//! [`ListenerFn`] wraps a closure `F: Fn(Arc<Message>, Ack) -> Fut`,
//! producing a fresh future per delivery. No shared mutable state is implied;
//! if deliveries need common state, put an `Arc<...>` inside the closure
//! explicitly.
//!
//! ## Example
//! ```rust
//! use patbus::{Ack, ListenerFn, ListenerRef, Message};
//! use std::sync::Arc;
//!
//! let l: ListenerRef = ListenerFn::arc("printer", |msg: Arc<Message>, ack: Ack| async move {
//!     println!("got {:?}", msg.get("topic"));
//!     ack.done();
//! });
//!
//! assert_eq!(l.name(), "printer");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::dispatch::Ack;
use crate::message::Message;

use super::Listener;

/// Function-backed listener implementation.
///
/// Wraps a closure that *creates* a new future per delivery.
pub struct ListenerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ListenerFn<F> {
    /// Creates a new function-backed listener.
    ///
    /// Prefer [`ListenerFn::arc`] when you immediately need a
    /// [`ListenerRef`](crate::ListenerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the listener and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Listener for ListenerFn<F>
where
    F: Fn(Arc<Message>, Ack) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn notify(&self, message: Arc<Message>, ack: Ack) {
        (self.f)(message, ack).await;
    }

    fn name(&self) -> &str {
        &self.name
    }
}
