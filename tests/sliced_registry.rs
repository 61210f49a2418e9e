//! Integration tests for the sliced registry variant.
//!
//! Each test builds its own registry, so they can run in parallel.

use notification_registry::{Listener, Registry, RegistryError, RegistryEvent};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

fn recorder() -> (Listener<Value>, Arc<Mutex<Vec<Value>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let listener = Listener::new(move |state: &Value| {
        seen_clone.lock().unwrap().push(state.clone());
    });
    (listener, seen)
}

#[test]
fn test_slices_are_independent() -> Result<(), RegistryError> {
    let registry = Registry::sliced();
    let (cb_a, seen_a) = recorder();
    let (cb_b, seen_b) = recorder();

    registry.listen_slice("evt", "sliceA", &cb_a, json!({"x": 0}))?;
    registry.listen_slice("evt", "sliceB", &cb_b, json!({"y": 0}))?;
    registry.notify_slice("evt", "sliceA", json!({"x": 1}), "test")?;

    assert_eq!(seen_a.lock().unwrap().as_slice(), [json!({"x": 1})]);
    assert!(seen_b.lock().unwrap().is_empty());
    assert_eq!(registry.get_state_slice("evt", "sliceA"), Some(json!({"x": 1})));
    assert_eq!(registry.get_state_slice("evt", "sliceB"), Some(json!({"y": 0})));
    Ok(())
}

#[test]
fn test_notify_unsubscribed_slice_is_noop() -> Result<(), RegistryError> {
    let registry = Registry::sliced();
    let (cb, seen) = recorder();
    let warnings = Arc::new(Mutex::new(Vec::new()));
    let warnings_clone = warnings.clone();
    registry.set_trace_callback(move |event| {
        if event.is_warning() {
            warnings_clone.lock().unwrap().push(event.clone());
        }
    });

    registry.listen_slice("evt", "known", &cb, json!({"a": 1}))?;
    registry.notify_slice("evt", "unknown", json!({"a": 2}), "test")?;

    assert_eq!(registry.get_state_slice("evt", "unknown"), None);
    assert_eq!(registry.get_state_slice("evt", "known"), Some(json!({"a": 1})));
    assert_eq!(registry.slices("evt"), ["known"]);
    assert!(seen.lock().unwrap().is_empty());

    let warnings = warnings.lock().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(matches!(warnings[0], RegistryEvent::NoListeners { .. }));
    Ok(())
}

#[test]
fn test_notify_unknown_event_is_noop() -> Result<(), RegistryError> {
    let registry: Registry<Value> = Registry::sliced();

    registry.notify_slice("ghost", "slice", json!({"a": 1}), "test")?;

    assert!(registry.events().is_empty());
    Ok(())
}

#[test]
fn test_empty_event_name_is_invalid() {
    let registry: Registry<Value> = Registry::sliced();

    let err = registry
        .notify_slice("", "slice", json!({}), "test")
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidArgument { .. }));
}

#[test]
fn test_joining_listener_gets_no_replay() -> Result<(), RegistryError> {
    let registry = Registry::sliced();
    let (early, early_seen) = recorder();
    let (late, late_seen) = recorder();

    registry.listen_slice("evt", "s", &early, json!({}))?;
    registry.notify_slice("evt", "s", json!({"k": "v"}), "test")?;
    registry.listen_slice("evt", "s", &late, json!({}))?;

    assert!(late_seen.lock().unwrap().is_empty());
    assert_eq!(early_seen.lock().unwrap().len(), 1);

    registry.notify_slice("evt", "s", json!({"k2": "v2"}), "test")?;
    assert_eq!(
        late_seen.lock().unwrap().as_slice(),
        [json!({"k": "v", "k2": "v2"})]
    );
    Ok(())
}

#[test]
fn test_unsubscribe_per_slice() -> Result<(), RegistryError> {
    let registry = Registry::sliced();
    let (cb, seen) = recorder();

    registry.listen_slice("evt", "a", &cb, json!({}))?;
    registry.listen_slice("evt", "b", &cb, json!({}))?;
    registry.unsubscribe_slice("evt", "a", &cb)?;

    registry.notify_slice("evt", "a", json!({"from": "a"}), "test")?;
    registry.notify_slice("evt", "b", json!({"from": "b"}), "test")?;

    assert_eq!(seen.lock().unwrap().as_slice(), [json!({"from": "b"})]);
    Ok(())
}

#[test]
fn test_unsubscribe_unknown_slice_is_not_found() -> Result<(), RegistryError> {
    let registry = Registry::sliced();
    let (cb, _) = recorder();

    registry.listen_slice("evt", "a", &cb, json!({}))?;

    assert_eq!(
        registry.unsubscribe_slice("evt", "b", &cb),
        Err(RegistryError::NotFound {
            event: "evt".to_string(),
            slice: "b".to_string(),
        })
    );
    assert!(matches!(
        registry.unsubscribe_slice("other", "a", &cb),
        Err(RegistryError::NotFound { .. })
    ));
    Ok(())
}

#[test]
fn test_flat_api_is_the_default_slice() -> Result<(), RegistryError> {
    let registry = Registry::sliced();
    let (cb, _) = recorder();

    registry.listen("evt", &cb, json!({"a": 1}))?;

    assert_eq!(
        registry.get_state_slice("evt", notification_registry::DEFAULT_SLICE),
        Some(json!({"a": 1}))
    );
    assert_eq!(registry.get_state_slice("evt", "other"), None);
    Ok(())
}

#[test]
fn test_record_merge_within_slice() -> Result<(), RegistryError> {
    let registry = Registry::sliced();
    let (cb, _) = recorder();

    registry.listen_slice("profile", "address", &cb, json!({"city": "Brno"}))?;
    registry.notify_slice("profile", "address", json!({"zip": "60200"}), "form")?;
    registry.notify_slice("profile", "address", json!({"city": "Praha"}), "form")?;

    assert_eq!(
        registry.get_state_slice("profile", "address"),
        Some(json!({"city": "Praha", "zip": "60200"}))
    );
    Ok(())
}
