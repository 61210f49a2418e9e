//! Basic usage example for notification-registry.
//!
//! Demonstrates:
//! - Listening to an event with an initial state
//! - Notifying record payloads (shallow merge) and opaque payloads (replace)
//! - Reading the current state with `get_state()`
//! - Unsubscribing and the "no listeners" diagnostics
//!
//! Run with: `cargo run --example basic_usage`

use notification_registry::{get_state, listen, notify, unsubscribe, Listener};
use serde_json::{json, Value};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== notification-registry: Basic Usage ===\n");

    // -------------------------------------------------------------------------
    // 1. Listen with an initial state
    // -------------------------------------------------------------------------
    println!("1. Listening to 'counter'...");

    let printer = Listener::new(|state: &Value| println!("   [listener] counter = {state}"));
    listen("counter", &printer, json!({"count": 0})).unwrap();

    println!("   get_state(\"counter\") = {:?}", get_state("counter"));

    // -------------------------------------------------------------------------
    // 2. Record payloads are merged
    // -------------------------------------------------------------------------
    println!("\n2. Notifying record payloads...");

    notify("counter", json!({"count": 1}), "increment-button").unwrap();
    notify("counter", json!({"step": 5}), "settings-panel").unwrap();

    // -------------------------------------------------------------------------
    // 3. Everything else is replaced
    // -------------------------------------------------------------------------
    println!("\n3. Notifying opaque payloads...");

    let history = Listener::new(|state: &Value| println!("   [history] {state}"));
    listen("history", &history, json!([])).unwrap();
    notify("history", json!([1, 2]), "undo-stack").unwrap();
    notify("history", json!([3]), "undo-stack").unwrap();

    // -------------------------------------------------------------------------
    // 4. Unsubscribe
    // -------------------------------------------------------------------------
    println!("\n4. Unsubscribing...");

    unsubscribe("counter", &printer).unwrap();
    // No listeners left: logged as a warning, state stays as it was.
    notify("counter", json!({"count": 2}), "increment-button").unwrap();
    println!("   state after notify without listeners: {:?}", get_state("counter"));

    // -------------------------------------------------------------------------
    // 5. Diagnostics and errors
    // -------------------------------------------------------------------------
    println!("\n5. Diagnostics and errors...");

    // Logged as a warning, not an error.
    notify("nobody-listens", json!({"a": 1}), "status-poller").unwrap();

    match unsubscribe("never-registered", &printer) {
        Ok(()) => println!("   unexpected success"),
        Err(e) => println!("   Error (expected): {}", e),
    }

    match notify("", json!({}), "status-poller") {
        Ok(()) => println!("   unexpected success"),
        Err(e) => println!("   Error (expected): {}", e),
    }

    println!("\n=== Example Complete ===");
}
