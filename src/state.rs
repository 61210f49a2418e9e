//! Payload types that can be stored in a registry.
//!
//! Whether a notification is shallow-merged into the stored state or replaces
//! it is decided by the [`Shape`] of the *incoming* payload. Record-shaped
//! payloads (plain key/value maps) merge; everything else replaces.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

/// Runtime shape tag of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Plain key/value record. Merged field by field.
    Record,
    /// Primitive, sequence or structured value. Replaced wholesale.
    Opaque,
}

/// A value that can be held as registry state.
///
/// The defaults describe an opaque value: it is always replaced by the next
/// notification and is never considered vacant.
pub trait State: Clone + fmt::Debug + Send + Sync + 'static {
    /// Shape of this value when it arrives as a notification payload.
    fn shape(&self) -> Shape {
        Shape::Opaque
    }

    /// Shallow-merge `incoming` into `self`, with `incoming` winning on conflicts.
    ///
    /// Only called when `incoming.shape()` is [`Shape::Record`].
    fn merge_record(&mut self, incoming: Self) {
        *self = incoming;
    }

    /// Returns `true` for null or empty values.
    fn is_vacant(&self) -> bool {
        false
    }
}

/// Computes the state that results from notifying `incoming` on top of `current`.
///
/// ```rust
/// use notification_registry::merge_state;
/// use serde_json::json;
///
/// let next = merge_state(&json!({"a": 1, "b": 2}), json!({"b": 3}));
/// assert_eq!(next, json!({"a": 1, "b": 3}));
///
/// let next = merge_state(&json!(5), json!(7));
/// assert_eq!(next, json!(7));
/// ```
pub fn merge_state<T: State>(current: &T, incoming: T) -> T {
    match incoming.shape() {
        Shape::Record => {
            let mut next = current.clone();
            next.merge_record(incoming);
            next
        }
        Shape::Opaque => incoming,
    }
}

impl State for Value {
    fn shape(&self) -> Shape {
        match self {
            Value::Object(_) => Shape::Record,
            _ => Shape::Opaque,
        }
    }

    fn merge_record(&mut self, incoming: Self) {
        match (self, incoming) {
            (Value::Object(current), Value::Object(fields)) => current.extend(fields),
            (slot, incoming) => *slot = incoming,
        }
    }

    fn is_vacant(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::String(s) => s.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        }
    }
}

macro_rules! record_state {
    ($($map:ident),+ $(,)?) => {
        $(
            impl<V> State for $map<String, V>
            where
                V: Clone + fmt::Debug + Send + Sync + 'static,
            {
                fn shape(&self) -> Shape {
                    Shape::Record
                }

                fn merge_record(&mut self, incoming: Self) {
                    self.extend(incoming);
                }

                fn is_vacant(&self) -> bool {
                    self.is_empty()
                }
            }
        )+
    };
}

record_state!(HashMap, BTreeMap, IndexMap);

macro_rules! opaque_state {
    ($($ty:ty),+ $(,)?) => {
        $(impl State for $ty {})+
    };
}

opaque_state!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
);

impl State for String {
    fn is_vacant(&self) -> bool {
        self.is_empty()
    }
}

impl<T> State for Vec<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn is_vacant(&self) -> bool {
        self.is_empty()
    }
}

impl<T: State> State for Option<T> {
    fn is_vacant(&self) -> bool {
        self.as_ref().map_or(true, State::is_vacant)
    }
}
