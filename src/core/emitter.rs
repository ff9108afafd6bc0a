//! # Emitter: admission control, fan-out, and the public surface.
//!
//! The [`Emitter`] owns the listener registry, the admission state, and the
//! event bus. `emit` never blocks: when the concurrency ceiling is reached
//! the submission joins a FIFO queue and is dispatched as in-flight messages
//! complete.
//!
//! ## Message flow
//! ```text
//! emit(msg, done)
//!     │
//!     ├─ slot free ──► dispatch:
//!     │                  resolve(msg) ──► no match ─► done(), admit next
//!     │                        │
//!     │                        └► matched ─► DispatchRecord(remaining = N)
//!     │                              │
//!     │                              ├──► spawn listener 1 ── ack ─┐
//!     │                              ├──► spawn listener 2 ── ack ─┤
//!     │                              └──► spawn listener N ── ack ─┤
//!     │                                                            ▼
//!     │                                   last ack ─► done() ─► admit next
//!     │
//!     └─ saturated ──► pending.push_back(msg, done)   (FIFO, unbounded)
//! ```
//!
//! ## Rules
//! - `emit`/`emit_with`/`try_emit` return immediately; the wait for a
//!   message is the delayed invocation of its callback.
//! - Pending submissions are serviced strictly FIFO; a freed slot is reused
//!   without touching the in-flight count.
//! - No lock is held while resolving, spawning, or running a callback.
//! - There is no cancellation or timeout: a listener that never consumes its
//!   ack occupies its slot forever and stalls the queue behind it (surfaced
//!   as [`EventKind::AckAbandoned`] when the ack is dropped).

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::config::EmitterConfig;
use crate::dispatch::queue::{DoneFn, Pending, QueueState};
use crate::dispatch::record::DispatchRecord;
use crate::dispatch::Ack;
use crate::error::EmitError;
use crate::events::{Bus, Event, EventKind};
use crate::listeners::ListenerRef;
use crate::message::{Message, Pattern};

use super::registry::Registry;

/// Outcome of the admission check, resolved under the state lock.
enum Admission {
    Dispatch(Arc<Message>, DoneFn),
    Queued(usize),
}

/// State shared by emitter handles, dispatch records, and spawned fan-outs.
pub(crate) struct Shared {
    pub(super) cfg: EmitterConfig,
    pub(super) registry: Registry,
    pub(super) state: Mutex<QueueState>,
    pub(super) bus: Bus,
}

impl Shared {
    pub(crate) fn publish(&self, ev: Event) {
        self.bus.publish(ev);
    }

    /// Admission gate: dispatch immediately or queue FIFO.
    fn submit(self: &Arc<Self>, message: Arc<Message>, done: DoneFn) {
        let admission = {
            let mut state = self.state.lock();
            if state.try_admit(self.cfg.concurrency_limit()) {
                Admission::Dispatch(message, done)
            } else {
                Admission::Queued(state.push(Pending { message, done }))
            }
        };

        match admission {
            Admission::Queued(depth) => {
                self.publish(Event::new(EventKind::MessageQueued).with_queued(depth));
            }
            Admission::Dispatch(message, done) => {
                if self.dispatch_now(message, done) {
                    self.admit_next();
                }
            }
        }
    }

    /// Dispatches one admitted message.
    ///
    /// Returns `true` when the dispatch completed inline (nothing matched),
    /// i.e. the slot it held is already free again.
    fn dispatch_now(self: &Arc<Self>, message: Arc<Message>, done: DoneFn) -> bool {
        let listeners = match self.registry.resolve(&message) {
            Some(listeners) if !listeners.is_empty() => listeners,
            _ => {
                self.publish(Event::new(EventKind::DispatchNoMatch));
                done();
                return true;
            }
        };

        let depth = self.state.lock().pending.len();
        self.publish(
            Event::new(EventKind::DispatchStarted)
                .with_matched(listeners.len())
                .with_queued(depth),
        );

        let record = DispatchRecord::new(listeners.len(), done, Arc::clone(self));
        for listener in listeners {
            let ack = Ack::new(Arc::clone(&record), listener.name());
            let message = Arc::clone(&message);
            let bus = self.bus.clone();
            tokio::spawn(async move {
                let name: Arc<str> = listener.name().into();
                let delivery = listener.notify(message, ack);
                if let Err(panic) = AssertUnwindSafe(delivery).catch_unwind().await {
                    bus.publish(
                        Event::new(EventKind::ListenerPanicked)
                            .with_listener(Arc::clone(&name))
                            .with_note(format!("listener '{name}' panicked: {panic:?}")),
                    );
                }
            });
        }
        false
    }

    /// Pulls queued submissions into the slot a completed dispatch freed.
    ///
    /// Loops so a chain of no-match completions drains iteratively instead
    /// of recursing. Releases the slot when the queue is empty.
    pub(crate) fn admit_next(self: &Arc<Self>) {
        loop {
            let next = self.state.lock().take_next_or_release();
            let Some(Pending { message, done }) = next else {
                return;
            };
            if !self.dispatch_now(message, done) {
                return;
            }
        }
    }
}

/// Pattern-routed message emitter with bounded dispatch concurrency.
///
/// Cheap to clone; clones share registry, queue, and bus. Each instance is
/// fully independent of every other emitter.
///
/// Listener fan-out is spawned on the ambient Tokio runtime, so `emit` (and
/// friends) must be called from within one whenever listeners can match.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use patbus::{Ack, Emitter, EmitterConfig, ListenerFn, Message, Pattern};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let emitter = Emitter::new(EmitterConfig::default());
///
///     emitter.on(
///         Pattern::new().with("topic", "greeting"),
///         ListenerFn::arc("hello", |msg: Arc<Message>, ack: Ack| async move {
///             println!("Hello from {:?}!", msg.get("name"));
///             ack.done();
///         }),
///     );
///
///     emitter
///         .emit_and_wait(Message::new().with("topic", "greeting").with("name", "world"))
///         .await;
/// }
/// ```
#[derive(Clone)]
pub struct Emitter {
    shared: Arc<Shared>,
}

impl Emitter {
    /// Creates an emitter with the given configuration and the default
    /// scan-based pattern store.
    pub fn new(cfg: EmitterConfig) -> Self {
        Self::builder(cfg).build()
    }

    /// Starts a builder, for injecting a custom pattern store.
    pub fn builder(cfg: EmitterConfig) -> super::builder::EmitterBuilder {
        super::builder::EmitterBuilder::new(cfg)
    }

    pub(super) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Registers `listener` under `pattern`, after any listener already
    /// registered there. Chainable.
    pub fn on(&self, pattern: Pattern, listener: ListenerRef) -> &Self {
        let name: Arc<str> = listener.name().into();
        self.shared.registry.register(pattern, listener);
        self.shared
            .publish(Event::new(EventKind::ListenerRegistered).with_listener(name));
        self
    }

    /// Removes the first identity-occurrence of `listener` under the exact
    /// `pattern`; silently does nothing when either is unknown. Chainable.
    pub fn remove_listener(&self, pattern: &Pattern, listener: &ListenerRef) -> &Self {
        if self.shared.registry.unregister(pattern, listener) {
            self.shared
                .publish(Event::new(EventKind::ListenerRemoved).with_listener(listener.name()));
        }
        self
    }

    /// Submits a message with no completion callback. Never blocks.
    pub fn emit(&self, message: Message) -> &Self {
        self.emit_with(message, || {})
    }

    /// Submits a message; `done` runs exactly once, after every matching
    /// listener has signaled completion (immediately when nothing matches).
    /// Never blocks — when saturated, the pair waits in the FIFO queue.
    pub fn emit_with(&self, message: Message, done: impl FnOnce() + Send + 'static) -> &Self {
        self.shared.submit(Arc::new(message), Box::new(done));
        self
    }

    /// Submits a message only if a slot is free right now; hands the message
    /// back instead of queuing it when saturated.
    pub fn try_emit(&self, message: Message) -> Result<(), EmitError> {
        let admitted = {
            let mut state = self.shared.state.lock();
            if state.try_admit(self.shared.cfg.concurrency_limit()) {
                Ok(())
            } else {
                Err(state.pending.len())
            }
        };
        match admitted {
            Ok(()) => {
                if self.shared.dispatch_now(Arc::new(message), Box::new(|| {})) {
                    self.shared.admit_next();
                }
                Ok(())
            }
            Err(pending) => Err(EmitError::Saturated { message, pending }),
        }
    }

    /// Submits a message and resolves once its dispatch fully completes.
    pub async fn emit_and_wait(&self, message: Message) {
        let (tx, rx) = oneshot::channel();
        self.emit_with(message, move || {
            let _ = tx.send(());
        });
        let _ = rx.await;
    }

    /// Current pending-queue size.
    pub fn len(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    /// True when no submission is waiting for a slot.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of messages currently occupying a dispatch slot.
    pub fn in_flight(&self) -> usize {
        self.shared.state.lock().in_flight
    }

    /// Configured concurrency ceiling (0 = unbounded).
    pub fn concurrency(&self) -> usize {
        self.shared.cfg.concurrency
    }

    /// The emitter's event bus; subscribe for lifecycle events.
    pub fn bus(&self) -> &Bus {
        &self.shared.bus
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new(EmitterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listeners::ListenerFn;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    fn bounded(concurrency: usize) -> Emitter {
        Emitter::new(EmitterConfig {
            concurrency,
            ..Default::default()
        })
    }

    /// Polls `cond` until it holds or a second passes.
    async fn wait_until(cond: impl Fn() -> bool) {
        let deadline = async {
            while !cond() {
                sleep(Duration::from_millis(1)).await;
            }
        };
        timeout(Duration::from_secs(1), deadline)
            .await
            .expect("condition not reached within 1s");
    }

    /// Waits for the next bus event of the given kind.
    async fn next_event(
        rx: &mut tokio::sync::broadcast::Receiver<Event>,
        kind: EventKind,
    ) -> Event {
        timeout(Duration::from_secs(1), async {
            loop {
                let ev = rx.recv().await.expect("bus closed");
                if ev.kind == kind {
                    return ev;
                }
            }
        })
        .await
        .expect("event not observed within 1s")
    }

    #[tokio::test]
    async fn on_and_emit_deliver_the_message() {
        let e = bounded(0);
        let seen = Arc::new(AtomicUsize::new(0));
        let observed_in_flight = Arc::new(AtomicUsize::new(0));

        let inner = e.clone();
        let seen_l = Arc::clone(&seen);
        let observed = Arc::clone(&observed_in_flight);
        e.on(
            Pattern::new().with("topic", "hello world"),
            ListenerFn::arc("probe", move |msg: Arc<Message>, ack: Ack| {
                let inner = inner.clone();
                let seen = Arc::clone(&seen_l);
                let observed = Arc::clone(&observed);
                async move {
                    observed.store(inner.in_flight(), Ordering::SeqCst);
                    assert_eq!(msg.get("my"), Some(&serde_json::json!("message")));
                    seen.fetch_add(1, Ordering::SeqCst);
                    ack.done();
                }
            }),
        );

        e.emit_and_wait(
            Message::new()
                .with("topic", "hello world")
                .with("my", "message"),
        )
        .await;

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(observed_in_flight.load(Ordering::SeqCst), 1);
        wait_until(|| e.in_flight() == 0).await;
    }

    #[tokio::test]
    async fn fanout_completes_after_every_listener() {
        let e = bounded(0);
        let pat = Pattern::new().with("topic", "hello world");
        let acked = Arc::new(AtomicUsize::new(0));

        // Slow listener: acks after a timer.
        let slow = Arc::clone(&acked);
        e.on(
            pat.clone(),
            ListenerFn::arc("slow", move |_msg: Arc<Message>, ack: Ack| {
                let acked = Arc::clone(&slow);
                async move {
                    sleep(Duration::from_millis(10)).await;
                    acked.fetch_add(1, Ordering::SeqCst);
                    ack.done();
                }
            }),
        );
        // Fast listener: acks on the same turn.
        let fast = Arc::clone(&acked);
        e.on(
            pat,
            ListenerFn::arc("fast", move |_msg: Arc<Message>, ack: Ack| {
                let acked = Arc::clone(&fast);
                async move {
                    acked.fetch_add(1, Ordering::SeqCst);
                    ack.done();
                }
            }),
        );

        e.emit_and_wait(Message::new().with("topic", "hello world"))
            .await;

        // The submitter's callback must not have fired before both signals.
        assert_eq!(acked.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn ceiling_of_one_serializes_dispatches() {
        let e = bounded(1);
        let order = Arc::new(Mutex::new(Vec::new()));

        e.on(
            Pattern::new().with("hello", 1),
            ListenerFn::arc("holder", |_msg: Arc<Message>, ack: Ack| async move {
                sleep(Duration::from_millis(20)).await;
                ack.done();
            }),
        );
        e.on(
            Pattern::new().with("hello", 2),
            ListenerFn::arc("quick", |_msg: Arc<Message>, ack: Ack| async move {
                ack.done();
            }),
        );

        let first = Arc::clone(&order);
        e.emit_with(Message::new().with("hello", 1).with("some", "data"), move || {
            first.lock().push(1);
        });

        let (tx, rx) = oneshot::channel();
        let second = Arc::clone(&order);
        e.emit_with(Message::new().with("hello", 2).with("some", "data"), move || {
            second.lock().push(2);
            let _ = tx.send(());
        });

        // The second message is parked while the first holds the only slot.
        assert_eq!(e.len(), 1);
        assert_eq!(e.in_flight(), 1);

        let _ = rx.await;
        assert_eq!(*order.lock(), vec![1, 2]);
        assert_eq!(e.len(), 0);
        wait_until(|| e.in_flight() == 0).await;
    }

    #[tokio::test]
    async fn queued_submissions_are_fifo() {
        let e = bounded(1);
        let order = Arc::new(Mutex::new(Vec::new()));

        e.on(
            Pattern::new().with("kind", "hold"),
            ListenerFn::arc("hold", |_msg: Arc<Message>, ack: Ack| async move {
                sleep(Duration::from_millis(20)).await;
                ack.done();
            }),
        );
        e.on(
            Pattern::new().with("kind", "quick"),
            ListenerFn::arc("quick", |_msg: Arc<Message>, ack: Ack| async move {
                ack.done();
            }),
        );

        let push = |tag: &'static str| {
            let order = Arc::clone(&order);
            move || order.lock().push(tag)
        };

        e.emit_with(Message::new().with("kind", "hold"), push("hold"));
        e.emit_with(Message::new().with("kind", "quick").with("id", "a"), push("a"));
        e.emit_with(Message::new().with("kind", "quick").with("id", "b"), push("b"));
        assert_eq!(e.len(), 2);

        wait_until(|| order.lock().len() == 3).await;
        assert_eq!(*order.lock(), vec!["hold", "a", "b"]);
    }

    #[tokio::test]
    async fn removed_listener_is_not_invoked() {
        let e = bounded(0);
        let pat = Pattern::new().with("topic", "hello world");
        let removed_ran = Arc::new(AtomicUsize::new(0));

        e.on(
            pat.clone(),
            ListenerFn::arc("keep", |_msg: Arc<Message>, ack: Ack| async move {
                ack.done();
            }),
        );
        let flag = Arc::clone(&removed_ran);
        let to_remove: ListenerRef =
            ListenerFn::arc("to-remove", move |_msg: Arc<Message>, ack: Ack| {
                let flag = Arc::clone(&flag);
                async move {
                    flag.fetch_add(1, Ordering::SeqCst);
                    ack.done();
                }
            });
        e.on(pat.clone(), to_remove.clone());
        e.remove_listener(&pat, &to_remove);

        e.emit_and_wait(Message::new().with("topic", "hello world"))
            .await;
        assert_eq!(removed_ran.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn removing_last_listener_makes_later_emits_no_match() {
        let e = bounded(0);
        let pat = Pattern::new().with("topic", "t");
        let l: ListenerRef = ListenerFn::arc("only", |_msg: Arc<Message>, ack: Ack| async move {
            ack.done();
        });
        e.on(pat.clone(), l.clone());
        e.remove_listener(&pat, &l);

        let mut rx = e.bus().subscribe();
        e.emit_and_wait(Message::new().with("topic", "t")).await;
        next_event(&mut rx, EventKind::DispatchNoMatch).await;
        wait_until(|| e.in_flight() == 0).await;
    }

    #[tokio::test]
    async fn emit_without_callback_still_dispatches() {
        let e = bounded(0);
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        e.on(
            Pattern::new().with("topic", "t"),
            ListenerFn::arc("count", move |_msg: Arc<Message>, ack: Ack| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    ack.done();
                }
            }),
        );

        e.emit(Message::new().with("topic", "t"));
        wait_until(|| seen.load(Ordering::SeqCst) == 1).await;
        wait_until(|| e.in_flight() == 0).await;
    }

    #[tokio::test]
    async fn no_match_fires_callback_and_frees_the_slot() {
        let e = bounded(0);

        // The slot is still held while the callback runs.
        let held = Arc::new(AtomicUsize::new(0));
        let observer = e.clone();
        let held_cb = Arc::clone(&held);
        e.emit_with(Message::new().with("topic", "unrouted"), move || {
            held_cb.store(observer.in_flight(), Ordering::SeqCst);
        });

        assert_eq!(held.load(Ordering::SeqCst), 1);
        assert_eq!(e.in_flight(), 0);
        assert_eq!(e.len(), 0);
    }

    #[tokio::test]
    async fn superset_matching_selects_messages() {
        let e = bounded(0);
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        e.on(
            Pattern::new().with("hello", "world").with("some", "data"),
            ListenerFn::arc("both", move |msg: Arc<Message>, ack: Ack| {
                let counter = Arc::clone(&counter);
                async move {
                    assert_eq!(msg.get("payload"), Some(&serde_json::json!({ "my": "message" })));
                    counter.fetch_add(1, Ordering::SeqCst);
                    ack.done();
                }
            }),
        );

        // Not caught: "hello" differs.
        e.emit_and_wait(Message::new().with("hello", "matteo").with("some", "data"))
            .await;
        // Caught: superset of the pattern.
        e.emit_and_wait(
            Message::new()
                .with("hello", "world")
                .with("some", "data")
                .with("payload", serde_json::json!({ "my": "message" })),
        )
        .await;

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn try_emit_refuses_when_saturated() {
        let e = bounded(1);
        let parked: Arc<Mutex<Option<Ack>>> = Arc::new(Mutex::new(None));

        let park = Arc::clone(&parked);
        e.on(
            Pattern::new().with("kind", "held"),
            ListenerFn::arc("parker", move |_msg: Arc<Message>, ack: Ack| {
                let park = Arc::clone(&park);
                async move {
                    park.lock().replace(ack);
                }
            }),
        );

        e.emit(Message::new().with("kind", "held"));
        wait_until(|| parked.lock().is_some()).await;

        let err = e
            .try_emit(Message::new().with("kind", "held"))
            .expect_err("ceiling is occupied");
        assert_eq!(err.as_label(), "emit_saturated");
        let refused = err.into_message();
        assert_eq!(refused.get("kind"), Some(&serde_json::json!("held")));
        // try_emit never queues.
        assert_eq!(e.len(), 0);

        // Releasing the parked ack frees the slot.
        let ack = parked.lock().take().expect("ack parked");
        ack.done();
        wait_until(|| e.in_flight() == 0).await;
        assert!(e.try_emit(Message::new().with("kind", "other")).is_ok());
        wait_until(|| e.in_flight() == 0).await;
    }

    #[tokio::test]
    async fn queued_message_publishes_a_bus_event() {
        let e = bounded(1);
        e.on(
            Pattern::new().with("kind", "hold"),
            ListenerFn::arc("hold", |_msg: Arc<Message>, ack: Ack| async move {
                sleep(Duration::from_millis(10)).await;
                ack.done();
            }),
        );

        let mut rx = e.bus().subscribe();
        e.emit(Message::new().with("kind", "hold"));
        e.emit(Message::new().with("kind", "hold"));

        let queued = next_event(&mut rx, EventKind::MessageQueued).await;
        assert_eq!(queued.queued, Some(1));

        let completed = next_event(&mut rx, EventKind::DispatchCompleted).await;
        assert_eq!(completed.matched, Some(1));
    }

    #[tokio::test]
    async fn abandoned_ack_is_surfaced_but_not_repaired() {
        let e = bounded(1);
        e.on(
            Pattern::new().with("kind", "leaky"),
            ListenerFn::arc("leaky", |_msg: Arc<Message>, ack: Ack| async move {
                drop(ack);
            }),
        );

        let mut rx = e.bus().subscribe();
        e.emit(Message::new().with("kind", "leaky"));

        let ev = next_event(&mut rx, EventKind::AckAbandoned).await;
        assert_eq!(ev.listener.as_deref(), Some("leaky"));
        // The dispatch never completes: the slot stays occupied.
        assert_eq!(e.in_flight(), 1);
    }

    #[tokio::test]
    async fn panicking_listener_is_isolated_and_reported() {
        let e = bounded(0);
        e.on(
            Pattern::new().with("kind", "boom"),
            ListenerFn::arc("boom", |_msg: Arc<Message>, _ack: Ack| async move {
                panic!("listener exploded");
            }),
        );

        let mut rx = e.bus().subscribe();
        e.emit(Message::new().with("kind", "boom"));

        // The ack goes down with the unwinding future, so its warning lands
        // first; the panic report follows.
        let abandoned = next_event(&mut rx, EventKind::AckAbandoned).await;
        assert_eq!(abandoned.listener.as_deref(), Some("boom"));
        let ev = next_event(&mut rx, EventKind::ListenerPanicked).await;
        assert_eq!(ev.listener.as_deref(), Some("boom"));

        // The emitter itself keeps dispatching.
        e.emit_and_wait(Message::new().with("kind", "other")).await;
    }

    #[tokio::test]
    async fn independent_emitters_share_nothing() {
        let a = bounded(0);
        let b = bounded(0);
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        a.on(
            Pattern::new().with("topic", "t"),
            ListenerFn::arc("a-only", move |_msg: Arc<Message>, ack: Ack| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    ack.done();
                }
            }),
        );

        b.emit_and_wait(Message::new().with("topic", "t")).await;
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        a.emit_and_wait(Message::new().with("topic", "t")).await;
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
