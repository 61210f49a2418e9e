//! The notification registry: per-event, per-slice state plus the listeners
//! interested in it.
//!
//! # Examples
//!
//! ```
//! use notification_registry::{Listener, Registry};
//! use serde_json::json;
//!
//! let registry = Registry::flat();
//! let listener = Listener::new(|state: &serde_json::Value| println!("cart is now {state}"));
//!
//! registry.listen("cart", &listener, json!({"items": 0})).unwrap();
//! registry.notify("cart", json!({"items": 2}), "add-button").unwrap();
//! registry.notify("cart", json!({"coupon": "SPRING"}), "coupon-form").unwrap();
//!
//! assert_eq!(
//!     registry.get_state("cart"),
//!     Some(json!({"items": 2, "coupon": "SPRING"}))
//! );
//! ```

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard, OnceLock},
};

use indexmap::IndexSet;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{RegistryConfig, DEFAULT_SLICE};
use crate::state::{merge_state, State};
use crate::{Listener, RegistryError, RegistryEvent};

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `RegistryEvent` for every mutating
/// registry operation and every advisory diagnostic.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

/// State and listeners of one (event, slice) key. Created together by the first `listen`.
struct Slot<T> {
    state: T,
    listeners: IndexSet<Listener<T>>,
}

impl<T> Slot<T> {
    fn new(state: T) -> Self {
        Self {
            state,
            listeners: IndexSet::new(),
        }
    }
}

type Slices<T> = HashMap<String, Slot<T>>;

/// A publish/subscribe state container.
///
/// Keys are (event, slice) pairs; the slice-less methods use
/// [`DEFAULT_SLICE`]. A key becomes active on its first `listen` and stays
/// active for the life of the registry.
///
/// Listeners run synchronously inside `notify`, after the new state is
/// stored and with no registry lock held, so they are free to call back into
/// the registry.
pub struct Registry<T> {
    config: RegistryConfig,
    events: Mutex<HashMap<String, Slices<T>>>,
    trace: Mutex<Option<Arc<TraceCallback>>>,
}

impl<T: State> Registry<T> {
    /// Creates an empty registry with the given configuration.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            events: Mutex::new(HashMap::new()),
            trace: Mutex::new(None),
        }
    }

    /// Creates a registry that replays current state to joining listeners.
    pub fn flat() -> Self {
        Self::new(RegistryConfig::flat())
    }

    /// Creates a registry whose listeners only see future notifications.
    pub fn sliced() -> Self {
        Self::new(RegistryConfig::sliced())
    }

    /// Returns the configuration this registry was created with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ---------------------------------------------------------------------------------------------
    // Tracing
    // ---------------------------------------------------------------------------------------------

    /// Sets a tracing callback that will be invoked on every registry interaction.
    ///
    /// The callback runs without any registry lock held.
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clears the tracing callback (disables registry tracing).
    pub fn clear_trace_callback(&self) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    fn emit_event(&self, event: impl FnOnce() -> RegistryEvent) {
        let callback = self
            .trace
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        if let Some(callback) = callback {
            callback(&event());
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Registry
    // ---------------------------------------------------------------------------------------------

    // Poisoning is recovered: no user code runs while the lock is held, so the
    // map is consistent even if a thread panicked elsewhere.
    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slices<T>>> {
        self.events.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Publishes `data` for `event`. See [`notify_slice`](Self::notify_slice).
    pub fn notify(&self, event: &str, data: T, caller: &str) -> Result<(), RegistryError> {
        self.notify_slice(event, DEFAULT_SLICE, data, caller)
    }

    /// Publishes `data` for the (`event`, `slice`) key.
    ///
    /// Record-shaped data is shallow-merged into the stored state, anything
    /// else replaces it. The result is stored and then passed to every
    /// listener of the key. `caller` only labels the log record.
    ///
    /// Notifying a key with no registered listeners (never listened to, or
    /// all of them unsubscribed) logs a warning and changes nothing.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `event` is empty
    pub fn notify_slice(
        &self,
        event: &str,
        slice: &str,
        data: T,
        caller: &str,
    ) -> Result<(), RegistryError> {
        validate_event(event)?;

        let incoming = self.config.log_payloads.then(|| data.clone());
        let fan_out = {
            let mut events = self.slots();
            events
                .get_mut(event)
                .and_then(|slices| slices.get_mut(slice))
                .filter(|slot| !slot.listeners.is_empty())
                .map(|slot| {
                    slot.state = merge_state(&slot.state, data);
                    let listeners: Vec<Listener<T>> = slot.listeners.iter().cloned().collect();
                    (slot.state.clone(), listeners)
                })
        };

        let Some((state, listeners)) = fan_out else {
            warn!(event, slice, caller, "notify: no listeners registered, ignoring");
            self.emit_event(|| RegistryEvent::NoListeners {
                event: event.to_owned(),
                slice: slice.to_owned(),
                caller: caller.to_owned(),
            });
            return Ok(());
        };

        match &incoming {
            Some(payload) => debug!(
                event,
                slice,
                caller,
                listeners = listeners.len(),
                payload = ?payload,
                state = ?state,
                "notify"
            ),
            None => debug!(event, slice, caller, listeners = listeners.len(), "notify"),
        }
        self.emit_event(|| RegistryEvent::Notify {
            event: event.to_owned(),
            slice: slice.to_owned(),
            caller: caller.to_owned(),
            listeners: listeners.len(),
        });

        for listener in &listeners {
            listener.call(&state);
        }

        Ok(())
    }

    /// Registers `listener` for `event`. See [`listen_slice`](Self::listen_slice).
    pub fn listen(
        &self,
        event: &str,
        listener: &Listener<T>,
        initial_state: T,
    ) -> Result<(), RegistryError> {
        self.listen_slice(event, DEFAULT_SLICE, listener, initial_state)
    }

    /// Registers `listener` for the (`event`, `slice`) key.
    ///
    /// The first listen on a key seeds its state with `initial_state`; later
    /// calls ignore it. Registering the same listener twice has no further
    /// effect.
    ///
    /// In a flat registry, joining a key that already holds non-vacant state
    /// re-notifies that state, so the new listener (and every other listener
    /// of the key) receives it before this call returns.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `event` is empty
    pub fn listen_slice(
        &self,
        event: &str,
        slice: &str,
        listener: &Listener<T>,
        initial_state: T,
    ) -> Result<(), RegistryError> {
        validate_event(event)?;

        let (created, replay) = {
            let mut events = self.slots();
            let slices = events.entry(event.to_owned()).or_default();
            let created = !slices.contains_key(slice);
            let slot = slices
                .entry(slice.to_owned())
                .or_insert_with(|| Slot::new(initial_state));
            slot.listeners.insert(listener.clone());

            let replay = !created
                && self.config.variant.replays_on_listen()
                && !slot.state.is_vacant();
            (created, replay.then(|| slot.state.clone()))
        };

        debug!(event, slice, created, "listen");
        self.emit_event(|| RegistryEvent::Listen {
            event: event.to_owned(),
            slice: slice.to_owned(),
            created,
        });

        if let Some(current) = replay {
            self.notify_slice(event, slice, current, "listen")?;
        }

        Ok(())
    }

    /// Removes `listener` from `event`. See [`unsubscribe_slice`](Self::unsubscribe_slice).
    pub fn unsubscribe(&self, event: &str, listener: &Listener<T>) -> Result<(), RegistryError> {
        self.unsubscribe_slice(event, DEFAULT_SLICE, listener)
    }

    /// Removes `listener` from the (`event`, `slice`) key.
    ///
    /// The key's state and its other listeners are left untouched. Removing a
    /// listener that is not registered logs a warning and succeeds.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `event` is empty
    /// - `NotFound` if the key was never listened to
    pub fn unsubscribe_slice(
        &self,
        event: &str,
        slice: &str,
        listener: &Listener<T>,
    ) -> Result<(), RegistryError> {
        validate_event(event)?;

        let removed = {
            let mut events = self.slots();
            let slot = events
                .get_mut(event)
                .and_then(|slices| slices.get_mut(slice))
                .ok_or_else(|| RegistryError::not_found(event, slice))?;
            slot.listeners.shift_remove(listener)
        };

        if removed {
            debug!(event, slice, "unsubscribe");
            self.emit_event(|| RegistryEvent::Unsubscribe {
                event: event.to_owned(),
                slice: slice.to_owned(),
            });
        } else {
            warn!(event, slice, "unsubscribe: listener is not registered");
            self.emit_event(|| RegistryEvent::MissingListener {
                event: event.to_owned(),
                slice: slice.to_owned(),
            });
        }

        Ok(())
    }

    /// Returns the current state of `event`, or `None` if it was never listened to.
    pub fn get_state(&self, event: &str) -> Option<T> {
        self.get_state_slice(event, DEFAULT_SLICE)
    }

    /// Returns the current state of the (`event`, `slice`) key.
    pub fn get_state_slice(&self, event: &str, slice: &str) -> Option<T> {
        self.slots()
            .get(event)
            .and_then(|slices| slices.get(slice))
            .map(|slot| slot.state.clone())
    }

    // ---------------------------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------------------------

    /// Number of listeners registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listener_count_slice(event, DEFAULT_SLICE)
    }

    /// Number of listeners registered for the (`event`, `slice`) key.
    pub fn listener_count_slice(&self, event: &str, slice: &str) -> usize {
        self.slots()
            .get(event)
            .and_then(|slices| slices.get(slice))
            .map_or(0, |slot| slot.listeners.len())
    }

    /// Returns `true` once the key has been listened to.
    pub fn is_active(&self, event: &str) -> bool {
        self.is_active_slice(event, DEFAULT_SLICE)
    }

    /// Returns `true` once the (`event`, `slice`) key has been listened to.
    pub fn is_active_slice(&self, event: &str, slice: &str) -> bool {
        self.slots()
            .get(event)
            .is_some_and(|slices| slices.contains_key(slice))
    }

    /// Registered event names, sorted.
    pub fn events(&self) -> Vec<String> {
        let mut names: Vec<String> = self.slots().keys().cloned().collect();
        names.sort();
        names
    }

    /// Registered slice names of `event`, sorted. Empty for unknown events.
    pub fn slices(&self, event: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .slots()
            .get(event)
            .map(|slices| slices.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let events = self.events.lock().map(|m| m.len()).unwrap_or_default();
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("events", &events)
            .finish_non_exhaustive()
    }
}

fn validate_event(event: &str) -> Result<(), RegistryError> {
    if event.is_empty() {
        return Err(RegistryError::empty_event_name());
    }
    Ok(())
}

// -------------------------------------------------------------------------------------------------
// Process-wide registry
// -------------------------------------------------------------------------------------------------

/// The process-wide JSON registry. Created on first access.
static GLOBAL_REGISTRY: OnceLock<Registry<Value>> = OnceLock::new();

/// Returns the process-wide registry, creating a flat one on first access.
pub fn global() -> &'static Registry<Value> {
    GLOBAL_REGISTRY.get_or_init(|| Registry::new(RegistryConfig::default()))
}

/// Creates the process-wide registry with `config`.
///
/// # Errors
///
/// - `AlreadyInitialized` if the registry was already created, either by an
///   earlier `init_global` or by any access through [`global`]
pub fn init_global(config: RegistryConfig) -> Result<&'static Registry<Value>, RegistryError> {
    let mut created = false;
    let registry = GLOBAL_REGISTRY.get_or_init(|| {
        created = true;
        Registry::new(config)
    });

    if created {
        Ok(registry)
    } else {
        Err(RegistryError::AlreadyInitialized)
    }
}

/// Publishes `data` for `event` on the process-wide registry.
pub fn notify(event: &str, data: Value, caller: &str) -> Result<(), RegistryError> {
    global().notify(event, data, caller)
}

/// Publishes `data` for (`event`, `slice`) on the process-wide registry.
pub fn notify_slice(
    event: &str,
    slice: &str,
    data: Value,
    caller: &str,
) -> Result<(), RegistryError> {
    global().notify_slice(event, slice, data, caller)
}

/// Registers `listener` for `event` on the process-wide registry.
pub fn listen(
    event: &str,
    listener: &Listener<Value>,
    initial_state: Value,
) -> Result<(), RegistryError> {
    global().listen(event, listener, initial_state)
}

/// Registers `listener` for (`event`, `slice`) on the process-wide registry.
pub fn listen_slice(
    event: &str,
    slice: &str,
    listener: &Listener<Value>,
    initial_state: Value,
) -> Result<(), RegistryError> {
    global().listen_slice(event, slice, listener, initial_state)
}

/// Removes `listener` from `event` on the process-wide registry.
pub fn unsubscribe(event: &str, listener: &Listener<Value>) -> Result<(), RegistryError> {
    global().unsubscribe(event, listener)
}

/// Removes `listener` from (`event`, `slice`) on the process-wide registry.
pub fn unsubscribe_slice(
    event: &str,
    slice: &str,
    listener: &Listener<Value>,
) -> Result<(), RegistryError> {
    global().unsubscribe_slice(event, slice, listener)
}

/// Current state of `event` on the process-wide registry.
pub fn get_state(event: &str) -> Option<Value> {
    global().get_state(event)
}

/// Current state of (`event`, `slice`) on the process-wide registry.
pub fn get_state_slice(event: &str, slice: &str) -> Option<Value> {
    global().get_state_slice(event, slice)
}

/// Sets the tracing callback of the process-wide registry.
pub fn set_trace_callback(callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
    global().set_trace_callback(callback)
}

/// Clears the tracing callback of the process-wide registry.
pub fn clear_trace_callback() {
    global().clear_trace_callback()
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;

    fn recorder() -> (Listener<Value>, Arc<Mutex<Vec<Value>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let listener = Listener::new(move |state: &Value| {
            seen_clone.lock().unwrap().push(state.clone());
        });
        (listener, seen)
    }

    #[test]
    fn test_listen_seeds_initial_state() -> Result<(), RegistryError> {
        let registry = Registry::flat();
        let (listener, seen) = recorder();

        registry.listen("evt", &listener, json!({"count": 0}))?;

        assert_eq!(registry.get_state("evt"), Some(json!({"count": 0})));
        assert!(seen.lock().unwrap().is_empty());
        Ok(())
    }

    #[test]
    fn test_second_listen_keeps_existing_state() -> Result<(), RegistryError> {
        let registry = Registry::sliced();
        let (a, _) = recorder();
        let (b, _) = recorder();

        registry.listen("evt", &a, json!({"count": 1}))?;
        registry.listen("evt", &b, json!({"count": 99}))?;

        assert_eq!(registry.get_state("evt"), Some(json!({"count": 1})));
        assert_eq!(registry.listener_count("evt"), 2);
        Ok(())
    }

    #[test]
    fn test_notify_passes_merged_state() -> Result<(), RegistryError> {
        let registry = Registry::flat();
        let (listener, seen) = recorder();

        registry.listen("evt", &listener, json!({"count": 0}))?;
        registry.notify("evt", json!({"count": 1}), "test")?;
        registry.notify("evt", json!({"extra": "x"}), "test")?;

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            [json!({"count": 1}), json!({"count": 1, "extra": "x"})]
        );
        Ok(())
    }

    #[test]
    fn test_notify_without_key_is_noop() -> Result<(), RegistryError> {
        let registry: Registry<Value> = Registry::flat();

        registry.notify("nobody", json!({"a": 1}), "test")?;

        assert_eq!(registry.get_state("nobody"), None);
        assert!(!registry.is_active("nobody"));
        assert!(registry.events().is_empty());
        Ok(())
    }

    #[test]
    fn test_notify_after_last_unsubscribe_is_noop() -> Result<(), RegistryError> {
        let registry = Registry::flat();
        let (listener, seen) = recorder();

        registry.listen("evt", &listener, json!({"a": 1}))?;
        registry.unsubscribe("evt", &listener)?;
        assert_eq!(registry.listener_count("evt"), 0);

        registry.notify("evt", json!({"b": 2}), "test")?;

        assert_eq!(registry.get_state("evt"), Some(json!({"a": 1})));
        assert!(registry.is_active("evt"));
        assert!(seen.lock().unwrap().is_empty());
        Ok(())
    }

    #[test]
    fn test_empty_event_name_is_rejected() {
        let registry = Registry::flat();
        let (listener, _) = recorder();

        assert_eq!(
            registry.notify("", json!(1), "test"),
            Err(RegistryError::empty_event_name())
        );
        assert_eq!(
            registry.listen("", &listener, json!(1)),
            Err(RegistryError::empty_event_name())
        );
        assert_eq!(
            registry.unsubscribe("", &listener),
            Err(RegistryError::empty_event_name())
        );
        assert!(registry.events().is_empty());
    }

    #[test]
    fn test_unsubscribe_unknown_event() {
        let registry = Registry::flat();
        let (listener, _) = recorder();

        assert_eq!(
            registry.unsubscribe("ghost", &listener),
            Err(RegistryError::not_found("ghost", DEFAULT_SLICE))
        );
    }

    #[test]
    fn test_unsubscribe_missing_listener_warns() -> Result<(), RegistryError> {
        let registry = Registry::flat();
        let (registered, _) = recorder();
        let (stranger, _) = recorder();
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        registry.set_trace_callback(move |event| events_clone.lock().unwrap().push(event.clone()));

        registry.listen("evt", &registered, json!({}))?;
        registry.unsubscribe("evt", &stranger)?;

        assert_eq!(registry.listener_count("evt"), 1);
        assert!(events.lock().unwrap().iter().any(RegistryEvent::is_warning));
        Ok(())
    }

    #[test]
    fn test_flat_replays_on_join() -> Result<(), RegistryError> {
        let registry = Registry::flat();
        let (first, first_seen) = recorder();
        let (second, second_seen) = recorder();

        registry.listen("evt", &first, json!({"count": 3}))?;
        registry.listen("evt", &second, json!({}))?;

        assert_eq!(second_seen.lock().unwrap().as_slice(), [json!({"count": 3})]);
        assert_eq!(first_seen.lock().unwrap().as_slice(), [json!({"count": 3})]);
        Ok(())
    }

    #[test]
    fn test_flat_does_not_replay_vacant_state() -> Result<(), RegistryError> {
        let registry = Registry::flat();
        let (first, _) = recorder();
        let (second, second_seen) = recorder();

        registry.listen("evt", &first, json!({}))?;
        registry.listen("evt", &second, json!({"ignored": true}))?;

        assert!(second_seen.lock().unwrap().is_empty());
        Ok(())
    }

    #[test]
    fn test_sliced_does_not_replay() -> Result<(), RegistryError> {
        let registry = Registry::sliced();
        let (first, _) = recorder();
        let (second, second_seen) = recorder();

        registry.listen_slice("evt", "a", &first, json!({"x": 1}))?;
        registry.listen_slice("evt", "a", &second, json!({}))?;

        assert!(second_seen.lock().unwrap().is_empty());
        Ok(())
    }

    #[test]
    fn test_events_and_slices_listing() -> Result<(), RegistryError> {
        let registry = Registry::sliced();
        let (listener, _) = recorder();

        registry.listen_slice("b", "two", &listener, json!(null))?;
        registry.listen_slice("b", "one", &listener, json!(null))?;
        registry.listen("a", &listener, json!(null))?;

        assert_eq!(registry.events(), ["a", "b"]);
        assert_eq!(registry.slices("b"), ["one", "two"]);
        assert!(registry.slices("missing").is_empty());
        Ok(())
    }

    #[test]
    fn test_debug_format() {
        let registry: Registry<Value> = Registry::sliced();
        let debug = format!("{registry:?}");
        assert!(debug.contains("Registry"));
        assert!(debug.contains("Sliced"));
    }

    #[test]
    #[serial]
    fn test_global_registry_free_functions() -> Result<(), RegistryError> {
        let (listener, seen) = recorder();

        listen("registry-unit-global", &listener, json!({"a": 1}))?;
        notify("registry-unit-global", json!({"b": 2}), "test")?;

        assert_eq!(
            get_state("registry-unit-global"),
            Some(json!({"a": 1, "b": 2}))
        );
        assert_eq!(seen.lock().unwrap().len(), 1);

        unsubscribe("registry-unit-global", &listener)?;
        notify("registry-unit-global", json!({"c": 3}), "test")?;
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(
            get_state("registry-unit-global"),
            Some(json!({"a": 1, "b": 2}))
        );
        Ok(())
    }

    #[test]
    #[serial]
    fn test_global_is_shared() {
        assert!(std::ptr::eq(global(), global()));
        assert_eq!(
            init_global(RegistryConfig::sliced()).unwrap_err(),
            RegistryError::AlreadyInitialized
        );
    }
}
