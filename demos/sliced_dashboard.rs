//! Sliced registry example for notification-registry.
//!
//! Demonstrates:
//! - A named, sliced registry created with `define_registry!`
//! - Independent state and listeners per slice of one event
//! - The trace callback for monitoring registry operations
//!
//! Run with: `cargo run --example sliced_dashboard`

use notification_registry::{define_registry, Listener};
use serde_json::{json, Value};

define_registry!(dashboard, Value, Sliced);

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== notification-registry: Sliced Dashboard ===\n");

    dashboard::set_trace_callback(|event| println!("   [trace] {event}"));

    // -------------------------------------------------------------------------
    // 1. One listener per panel
    // -------------------------------------------------------------------------
    println!("1. Listening to the 'widgets' event, one slice per panel...");

    let weather = Listener::new(|state: &Value| println!("   [weather] {state}"));
    let stocks = Listener::new(|state: &Value| println!("   [stocks]  {state}"));

    dashboard::listen_slice("widgets", "weather", &weather, json!({"city": "Brno"})).unwrap();
    dashboard::listen_slice("widgets", "stocks", &stocks, json!({"symbols": []})).unwrap();

    // -------------------------------------------------------------------------
    // 2. Notifications reach only their slice
    // -------------------------------------------------------------------------
    println!("\n2. Updating the weather slice...");

    dashboard::notify_slice("widgets", "weather", json!({"temp_c": 21}), "weather-feed").unwrap();

    println!("\n3. Updating the stocks slice...");

    dashboard::notify_slice("widgets", "stocks", json!({"symbols": ["ACME"]}), "ticker").unwrap();

    // -------------------------------------------------------------------------
    // 4. A slice nobody listens to
    // -------------------------------------------------------------------------
    println!("\n4. Notifying an unknown slice (warning only)...");

    dashboard::notify_slice("widgets", "news", json!({"headline": "..."}), "news-feed").unwrap();

    println!("\n5. Final state per slice:");
    let registry = dashboard::registry();
    for slice in registry.slices("widgets") {
        println!(
            "   {slice}: {}",
            registry.get_state_slice("widgets", &slice).unwrap_or(Value::Null)
        );
    }

    dashboard::clear_trace_callback();
    println!("\n=== Example Complete ===");
}
