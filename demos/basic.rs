//! # Example: basic
//!
//! Minimal example of pattern registration and a single fan-out.
//!
//! Demonstrates how to:
//! - Register listeners with [`ListenerFn`] under partial-match patterns.
//! - Submit messages and wait for the fan-out to complete.
//! - Observe best-match routing (more specific patterns win).
//!
//! ## Run
//! ```bash
//! cargo run --example basic
//! ```

use std::sync::Arc;

use patbus::{Ack, Emitter, EmitterConfig, ListenerFn, Message, Pattern};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // 1. Default configuration: unbounded concurrency
    let emitter = Emitter::new(EmitterConfig::default());

    // 2. A wide pattern and a narrower one
    emitter.on(
        Pattern::new().with("topic", "orders"),
        ListenerFn::arc("all-orders", |msg: Arc<Message>, ack: Ack| async move {
            println!("[all-orders] {:?}", msg.get("id"));
            ack.done();
        }),
    );
    emitter.on(
        Pattern::new().with("topic", "orders").with("priority", "high"),
        ListenerFn::arc("rush-orders", |msg: Arc<Message>, ack: Ack| async move {
            println!("[rush-orders] {:?}", msg.get("id"));
            ack.done();
        }),
    );

    // 3. Routed to "all-orders" (only the wide pattern matches)
    emitter
        .emit_and_wait(Message::new().with("topic", "orders").with("id", 1))
        .await;

    // 4. Routed to "rush-orders" (the narrower pattern is the closer match)
    emitter
        .emit_and_wait(
            Message::new()
                .with("topic", "orders")
                .with("priority", "high")
                .with("id", 2),
        )
        .await;

    // 5. No listener matches: completes immediately
    emitter
        .emit_and_wait(Message::new().with("topic", "payments"))
        .await;

    println!("done");
}
