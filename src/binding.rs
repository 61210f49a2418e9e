//! Scoped subscriptions and local-state bindings.
//!
//! A [`Subscription`] is acquired when a consumer (a UI component, a worker,
//! a view model) becomes active and released when it deactivates, either
//! explicitly with [`Subscription::release`] or by dropping the handle.
//!
//! [`StateBinding`] layers a local copy of the state and a render hook on top:
//! it seeds itself from the registry, keeps the copy in sync on every
//! notification and calls the render closure each time.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::config::DEFAULT_SLICE;
use crate::state::State;
use crate::{Listener, Registry, RegistryError};

/// A live listener registration that is released on drop.
#[must_use = "dropping a Subscription unsubscribes it immediately"]
pub struct Subscription<'r, T: State> {
    registry: &'r Registry<T>,
    event: String,
    slice: String,
    listener: Listener<T>,
    released: bool,
}

impl<'r, T: State> Subscription<'r, T> {
    /// Event name this subscription listens to.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Slice this subscription listens to.
    pub fn slice(&self) -> &str {
        &self.slice
    }

    /// The listener registered by this subscription.
    pub fn listener(&self) -> &Listener<T> {
        &self.listener
    }

    /// Unsubscribes now and reports the outcome.
    pub fn release(mut self) -> Result<(), RegistryError> {
        self.released = true;
        self.registry
            .unsubscribe_slice(&self.event, &self.slice, &self.listener)
    }
}

impl<T: State> Drop for Subscription<'_, T> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self
            .registry
            .unsubscribe_slice(&self.event, &self.slice, &self.listener)
        {
            warn!(event = %self.event, slice = %self.slice, %err, "failed to release subscription");
        }
    }
}

impl<T: State> std::fmt::Debug for Subscription<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .field("slice", &self.slice)
            .field("listener", &self.listener)
            .field("released", &self.released)
            .finish()
    }
}

impl<T: State> Registry<T> {
    /// Listens to `event` with `on_change` and returns a handle that
    /// unsubscribes when released or dropped.
    ///
    /// ```rust
    /// use notification_registry::Registry;
    /// use serde_json::json;
    ///
    /// let registry = Registry::flat();
    /// let subscription = registry
    ///     .subscribe("theme", json!({"dark": false}), |theme| println!("{theme}"))
    ///     .unwrap();
    ///
    /// assert_eq!(registry.listener_count("theme"), 1);
    /// drop(subscription);
    /// assert_eq!(registry.listener_count("theme"), 0);
    /// ```
    pub fn subscribe(
        &self,
        event: &str,
        initial_state: T,
        on_change: impl Fn(&T) + Send + Sync + 'static,
    ) -> Result<Subscription<'_, T>, RegistryError> {
        self.subscribe_slice(event, DEFAULT_SLICE, initial_state, on_change)
    }

    /// Slice-aware form of [`subscribe`](Self::subscribe).
    pub fn subscribe_slice(
        &self,
        event: &str,
        slice: &str,
        initial_state: T,
        on_change: impl Fn(&T) + Send + Sync + 'static,
    ) -> Result<Subscription<'_, T>, RegistryError> {
        let listener = Listener::new(on_change);
        self.listen_slice(event, slice, &listener, initial_state)?;

        Ok(Subscription {
            registry: self,
            event: event.to_owned(),
            slice: slice.to_owned(),
            listener,
            released: false,
        })
    }
}

/// Local state kept in sync with one registry key.
///
/// On creation the local value is seeded from the registry (or from the
/// fallback if the key is not active yet), then every notification replaces
/// it and triggers a render.
pub struct StateBinding<'r, T: State> {
    local: Arc<Mutex<T>>,
    renders: Arc<AtomicUsize>,
    subscription: Subscription<'r, T>,
}

impl<'r, T: State> StateBinding<'r, T> {
    /// Binds to `event` on `registry`.
    pub fn bind(
        registry: &'r Registry<T>,
        event: &str,
        fallback: T,
        render: impl Fn(&T) + Send + Sync + 'static,
    ) -> Result<Self, RegistryError> {
        Self::bind_slice(registry, event, DEFAULT_SLICE, fallback, render)
    }

    /// Binds to (`event`, `slice`) on `registry`.
    pub fn bind_slice(
        registry: &'r Registry<T>,
        event: &str,
        slice: &str,
        fallback: T,
        render: impl Fn(&T) + Send + Sync + 'static,
    ) -> Result<Self, RegistryError> {
        let seed = registry
            .get_state_slice(event, slice)
            .unwrap_or_else(|| fallback.clone());
        let local = Arc::new(Mutex::new(seed));
        let renders = Arc::new(AtomicUsize::new(0));

        let on_change = {
            let local = local.clone();
            let renders = renders.clone();
            move |state: &T| {
                *local.lock().unwrap_or_else(|p| p.into_inner()) = state.clone();
                renders.fetch_add(1, Ordering::SeqCst);
                render(state);
            }
        };
        let subscription = registry.subscribe_slice(event, slice, fallback, on_change)?;

        Ok(Self {
            local,
            renders,
            subscription,
        })
    }

    /// Current local value.
    pub fn value(&self) -> T {
        self.local.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Number of renders triggered by notifications so far.
    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    /// Publishes `data` to the bound key.
    pub fn publish(&self, data: T, caller: &str) -> Result<(), RegistryError> {
        let subscription = &self.subscription;
        subscription
            .registry
            .notify_slice(&subscription.event, &subscription.slice, data, caller)
    }

    /// The underlying registry subscription.
    pub fn subscription(&self) -> &Subscription<'r, T> {
        &self.subscription
    }

    /// Stops listening. Dropping the binding has the same effect.
    pub fn release(self) -> Result<(), RegistryError> {
        self.subscription.release()
    }
}
