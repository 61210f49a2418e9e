use thiserror::Error;

/// Errors raised by registry operations.
///
/// Every error is raised before the registry is mutated. Advisory conditions
/// (notifying a key nobody listens to, removing a listener that is not
/// registered) are logged instead and never surface here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// An argument failed validation, e.g. an empty event name.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: &'static str },

    /// `unsubscribe` was called for an event (or slice) that was never registered.
    #[error("no listeners for this event: {event} (slice: {slice})")]
    NotFound { event: String, slice: String },

    /// The process-wide registry was already created.
    #[error("global registry is already initialized")]
    AlreadyInitialized,

    /// A configuration document could not be parsed.
    #[error("invalid registry config: {0}")]
    InvalidConfig(String),
}

impl RegistryError {
    pub(crate) fn empty_event_name() -> Self {
        RegistryError::InvalidArgument {
            reason: "event name must be a non-empty string",
        }
    }

    pub(crate) fn not_found(event: &str, slice: &str) -> Self {
        RegistryError::NotFound {
            event: event.to_owned(),
            slice: slice.to_owned(),
        }
    }
}
