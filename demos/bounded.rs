//! # Example: bounded
//!
//! Bounded dispatch concurrency with FIFO overflow, observed on the event bus.
//!
//! Demonstrates how to:
//! - Configure a concurrency ceiling of 1 so dispatches serialize.
//! - Watch queue depth and completions through [`LogWriter`].
//! - See `try_emit` refuse a message while the slot is occupied.
//!
//! ## Flow
//! ```text
//! emit(m1) ──► slot claimed ──► listener holds it for 100ms
//! emit(m2) ──► queued (depth 1)
//! try_emit(m3) ──► Err(Saturated)
//! m1 completes ──► m2 admitted into the freed slot ──► completes
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example bounded --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use patbus::{Ack, Emitter, EmitterConfig, ListenerFn, LogWriter, Message, Pattern};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // 1. One dispatch slot: everything past it queues FIFO
    let mut cfg = EmitterConfig::default();
    cfg.concurrency = 1;
    let emitter = Emitter::new(cfg);

    // 2. Print every lifecycle event
    LogWriter::attach(emitter.bus());

    // 3. A listener that holds its slot for a while
    emitter.on(
        Pattern::new().with("job", "slow"),
        ListenerFn::arc("slow-worker", |msg: Arc<Message>, ack: Ack| async move {
            println!("[slow-worker] start {:?}", msg.get("id"));
            tokio::time::sleep(Duration::from_millis(100)).await;
            println!("[slow-worker] finish {:?}", msg.get("id"));
            ack.done();
        }),
    );

    emitter.emit(Message::new().with("job", "slow").with("id", 1));
    emitter.emit(Message::new().with("job", "slow").with("id", 2));
    println!("queued: {}", emitter.len());

    // 4. Refused instead of queued
    if let Err(err) = emitter.try_emit(Message::new().with("job", "slow").with("id", 3)) {
        println!("refused: {err}");
    }

    // 5. Wait for the serialized dispatches to drain
    emitter
        .emit_and_wait(Message::new().with("job", "slow").with("id", 4))
        .await;
    println!("done");
}
