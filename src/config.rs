//! Registry configuration.

use serde::{Deserialize, Serialize};

use crate::RegistryError;

/// Slice used by the flat (slice-less) API.
pub const DEFAULT_SLICE: &str = "default";

/// Layout variant of a registry.
///
/// Both variants store state per (event, slice) key; the flat API simply uses
/// [`DEFAULT_SLICE`]. They differ in what a new listener receives: a flat
/// registry replays the current non-vacant state to everyone listening on the
/// key as soon as a listener joins an existing key, a sliced registry only
/// delivers future notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Flat,
    Sliced,
}

impl Variant {
    pub(crate) fn replays_on_listen(self) -> bool {
        matches!(self, Variant::Flat)
    }
}

/// Configuration for a [`Registry`](crate::Registry).
///
/// ```rust
/// use notification_registry::{RegistryConfig, Variant};
///
/// let config = RegistryConfig::from_json(r#"{ "variant": "sliced" }"#).unwrap();
/// assert_eq!(config.variant, Variant::Sliced);
/// assert!(config.log_payloads);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub variant: Variant,
    /// Include the merged payload in `notify` log records.
    pub log_payloads: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Flat,
            log_payloads: true,
        }
    }
}

impl RegistryConfig {
    pub fn flat() -> Self {
        Self::with_variant(Variant::Flat)
    }

    pub fn sliced() -> Self {
        Self::with_variant(Variant::Sliced)
    }

    pub fn with_variant(variant: Variant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    pub fn log_payloads(mut self, enabled: bool) -> Self {
        self.log_payloads = enabled;
        self
    }

    /// Parses a configuration from a JSON document. Missing fields take their defaults.
    pub fn from_json(source: &str) -> Result<Self, RegistryError> {
        serde_json::from_str(source).map_err(|e| RegistryError::InvalidConfig(e.to_string()))
    }
}
