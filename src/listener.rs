use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Type alias for the boxed listener closure.
pub type ListenerFn<T> = dyn Fn(&T) + Send + Sync + 'static;

/// A callback registered against an event (and slice).
///
/// Listeners have reference identity: clones of one `Listener` are equal to
/// each other and to nothing else, even if another listener wraps an identical
/// closure. Keep the `Listener` you passed to `listen` around to unsubscribe it.
///
/// ```rust
/// use notification_registry::Listener;
///
/// let a = Listener::<i32>::new(|v| println!("{v}"));
/// let b = Listener::<i32>::new(|v| println!("{v}"));
///
/// assert_eq!(a, a.clone());
/// assert_ne!(a, b);
/// ```
pub struct Listener<T> {
    callback: Arc<ListenerFn<T>>,
}

impl<T> Listener<T> {
    /// Wraps `callback`. Clones of the result compare equal to it.
    pub fn new(callback: impl Fn(&T) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Invokes the callback with `value`.
    pub fn call(&self, value: &T) {
        (self.callback)(value)
    }

    // Data pointer only; vtable pointers are not unique per closure.
    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.callback) as *const ()
    }
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<T> PartialEq for Listener<T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.addr(), other.addr())
    }
}

impl<T> Eq for Listener<T> {}

impl<T> Hash for Listener<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<T> fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", self.addr())
    }
}
