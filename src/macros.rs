//! Macros for creating named process-wide registries.

/// Creates a named, process-wide registry with a single macro invocation.
///
/// The macro generates a module containing:
/// - A lazily created `Registry<$ty>` static (hidden)
/// - A `registry()` accessor for the full [`Registry`](crate::Registry) API
/// - Free functions mirroring the registry operations
///
/// The variant defaults to `Flat`; pass `Sliced` as a third argument for a
/// sliced registry. The payload type is resolved from the parent module, so
/// types named inside a function body must be written as full paths.
///
/// # Examples
///
/// ```rust
/// use notification_registry::{define_registry, Listener};
/// use serde_json::json;
///
/// define_registry!(session, serde_json::Value);
///
/// let listener = Listener::new(|state: &serde_json::Value| println!("session: {state}"));
/// session::listen("user", &listener, json!({"name": null})).unwrap();
/// session::notify("user", json!({"name": "ada"}), "login-form").unwrap();
///
/// assert_eq!(session::get_state("user"), Some(json!({"name": "ada"})));
/// ```
///
/// # Multiple Registries
///
/// Each invocation is completely isolated, and the payload type can differ:
///
/// ```rust
/// use notification_registry::{define_registry, Listener};
///
/// define_registry!(counters, u64);
/// define_registry!(panels, std::collections::HashMap<String, u64>, Sliced);
///
/// let listener = Listener::new(|_: &u64| {});
/// counters::listen("clicks", &listener, 0).unwrap();
/// counters::notify("clicks", 3, "button").unwrap();
///
/// assert_eq!(counters::get_state("clicks"), Some(3));
/// assert_eq!(panels::get_state("clicks"), None);
/// ```
#[macro_export]
macro_rules! define_registry {
    ($name:ident, $ty:ty) => {
        $crate::define_registry!($name, $ty, Flat);
    };
    ($name:ident, $ty:ty, $variant:ident) => {
        pub mod $name {
            #[allow(unused_imports)]
            use super::*;
            use std::sync::LazyLock;

            // Registry storage (module-private)
            static REGISTRY: LazyLock<$crate::Registry<$ty>> = LazyLock::new(|| {
                $crate::Registry::new($crate::RegistryConfig::with_variant(
                    $crate::Variant::$variant,
                ))
            });

            /// The registry behind this module.
            pub fn registry() -> &'static $crate::Registry<$ty> {
                &REGISTRY
            }

            /// Publish data for an event.
            pub fn notify(event: &str, data: $ty, caller: &str) -> Result<(), $crate::RegistryError> {
                REGISTRY.notify(event, data, caller)
            }

            /// Publish data for an event slice.
            pub fn notify_slice(
                event: &str,
                slice: &str,
                data: $ty,
                caller: &str,
            ) -> Result<(), $crate::RegistryError> {
                REGISTRY.notify_slice(event, slice, data, caller)
            }

            /// Register a listener for an event.
            pub fn listen(
                event: &str,
                listener: &$crate::Listener<$ty>,
                initial_state: $ty,
            ) -> Result<(), $crate::RegistryError> {
                REGISTRY.listen(event, listener, initial_state)
            }

            /// Register a listener for an event slice.
            pub fn listen_slice(
                event: &str,
                slice: &str,
                listener: &$crate::Listener<$ty>,
                initial_state: $ty,
            ) -> Result<(), $crate::RegistryError> {
                REGISTRY.listen_slice(event, slice, listener, initial_state)
            }

            /// Remove a listener from an event.
            pub fn unsubscribe(
                event: &str,
                listener: &$crate::Listener<$ty>,
            ) -> Result<(), $crate::RegistryError> {
                REGISTRY.unsubscribe(event, listener)
            }

            /// Remove a listener from an event slice.
            pub fn unsubscribe_slice(
                event: &str,
                slice: &str,
                listener: &$crate::Listener<$ty>,
            ) -> Result<(), $crate::RegistryError> {
                REGISTRY.unsubscribe_slice(event, slice, listener)
            }

            /// Current state of an event.
            pub fn get_state(event: &str) -> Option<$ty> {
                REGISTRY.get_state(event)
            }

            /// Current state of an event slice.
            pub fn get_state_slice(event: &str, slice: &str) -> Option<$ty> {
                REGISTRY.get_state_slice(event, slice)
            }

            /// Set a tracing callback for registry operations.
            pub fn set_trace_callback(
                callback: impl Fn(&$crate::RegistryEvent) + Send + Sync + 'static,
            ) {
                REGISTRY.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                REGISTRY.clear_trace_callback()
            }
        }
    };
}
