/// Events emitted by the registry during operations.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use notification_registry::RegistryEvent;
///
/// let event = RegistryEvent::NoListeners {
///     event: "cart".to_string(),
///     slice: "default".to_string(),
///     caller: "checkout".to_string(),
/// };
/// assert!(event.is_warning());
/// println!("{}", event);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// New state was stored for a key and fanned out to its listeners.
    Notify {
        event: String,
        slice: String,
        caller: String,
        /// Number of listeners invoked.
        listeners: usize,
    },

    /// A listener was registered.
    Listen {
        event: String,
        slice: String,
        /// Whether this call created the key's state entry.
        created: bool,
    },

    /// A listener was removed.
    Unsubscribe { event: String, slice: String },

    /// `notify` targeted a key that has never been listened to.
    NoListeners {
        event: String,
        slice: String,
        caller: String,
    },

    /// `unsubscribe` was given a listener that is not registered for the key.
    MissingListener { event: String, slice: String },
}

impl RegistryEvent {
    /// Returns `true` for advisory diagnostics that are logged as warnings.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            RegistryEvent::NoListeners { .. } | RegistryEvent::MissingListener { .. }
        )
    }
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEvent::Notify {
                event,
                slice,
                caller,
                listeners,
            } => write!(
                f,
                "notify {{ event: {event}, slice: {slice}, caller: {caller}, listeners: {listeners} }}"
            ),
            RegistryEvent::Listen {
                event,
                slice,
                created,
            } => write!(
                f,
                "listen {{ event: {event}, slice: {slice}, created: {created} }}"
            ),
            RegistryEvent::Unsubscribe { event, slice } => {
                write!(f, "unsubscribe {{ event: {event}, slice: {slice} }}")
            }
            RegistryEvent::NoListeners {
                event,
                slice,
                caller,
            } => write!(
                f,
                "no listeners {{ event: {event}, slice: {slice}, caller: {caller} }}"
            ),
            RegistryEvent::MissingListener { event, slice } => {
                write!(f, "missing listener {{ event: {event}, slice: {slice} }}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_event_display() {
        let event = RegistryEvent::Listen {
            event: "cart".into(),
            slice: "default".into(),
            created: true,
        };
        assert_eq!(
            event.to_string(),
            "listen { event: cart, slice: default, created: true }"
        );

        let event = RegistryEvent::Notify {
            event: "cart".into(),
            slice: "items".into(),
            caller: "button".into(),
            listeners: 2,
        };
        assert_eq!(
            event.to_string(),
            "notify { event: cart, slice: items, caller: button, listeners: 2 }"
        );

        let event = RegistryEvent::MissingListener {
            event: "cart".into(),
            slice: "default".into(),
        };
        assert_eq!(
            event.to_string(),
            "missing listener { event: cart, slice: default }"
        );
    }

    #[test]
    fn test_warning_classification() {
        let warning = RegistryEvent::NoListeners {
            event: "e".into(),
            slice: "s".into(),
            caller: "c".into(),
        };
        let regular = RegistryEvent::Unsubscribe {
            event: "e".into(),
            slice: "s".into(),
        };
        assert!(warning.is_warning());
        assert!(!regular.is_warning());
    }

    #[test]
    fn test_registry_event_clone() {
        let event = RegistryEvent::Unsubscribe {
            event: "e".into(),
            slice: "s".into(),
        };
        assert_eq!(event.clone(), event);
    }
}
