//! # Notification Registry
//!
//! A process-wide publish/subscribe state container. Callers `notify` named
//! events (optionally partitioned into slices) with a payload; every listener
//! of that event and slice is invoked with the merged current state.
//!
//! ## Quick Start
//!
//! ```rust
//! use notification_registry::{get_state, listen, notify, Listener};
//! use serde_json::json;
//!
//! let listener = Listener::new(|state: &serde_json::Value| println!("counter: {state}"));
//!
//! listen("counter", &listener, json!({"count": 0})).unwrap();
//! notify("counter", json!({"count": 1}), "increment-button").unwrap();
//! notify("counter", json!({"step": 5}), "settings").unwrap();
//!
//! assert_eq!(get_state("counter"), Some(json!({"count": 1, "step": 5})));
//! ```
//!
//! ## Features
//!
//! - **Merge or replace**: record payloads are shallow-merged, everything else replaces
//! - **Slices**: independent state and listeners under one event name
//! - **Flat and sliced variants**: flat registries replay current state to joining listeners
//! - **Scoped subscriptions**: handles that unsubscribe on release or drop
//! - **Tracing support**: `tracing` logs plus an optional callback for registry operations
//!
//! ## Main Functions
//!
//! - [`notify`] / [`notify_slice`] - Publish data for an event (slice)
//! - [`listen`] / [`listen_slice`] - Register a listener
//! - [`unsubscribe`] / [`unsubscribe_slice`] - Remove a listener
//! - [`get_state`] / [`get_state_slice`] - Read the current state
//! - [`global`] / [`init_global`] - The process-wide JSON registry
//! - [`define_registry!`] - Additional named registries with any payload type

mod binding;
mod config;
mod listener;
mod macros;
mod registry;
mod registry_error;
mod registry_event;
mod state;

// Re-export the main public API
pub use binding::{StateBinding, Subscription};
pub use config::{RegistryConfig, Variant, DEFAULT_SLICE};
pub use listener::{Listener, ListenerFn};
pub use registry::{
    clear_trace_callback, get_state, get_state_slice, global, init_global, listen, listen_slice,
    notify, notify_slice, set_trace_callback, unsubscribe, unsubscribe_slice, Registry,
    TraceCallback,
};
pub use registry_error::RegistryError;
pub use registry_event::RegistryEvent;
pub use state::{merge_state, Shape, State};
