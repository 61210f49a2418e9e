//! Component binding example for notification-registry.
//!
//! Demonstrates:
//! - Components that bind to registry state on mount and release on unmount
//! - Publishing from one component and re-rendering the others
//! - A registry owned by the application instead of the process-wide one
//!
//! Run with: `cargo run --example component_binding`

use notification_registry::{Registry, RegistryConfig, RegistryError, StateBinding};
use serde_json::{json, Value};

/// A toy component: it renders whenever the bound state changes.
struct Component<'r> {
    name: &'static str,
    state: StateBinding<'r, Value>,
}

impl<'r> Component<'r> {
    fn mount(registry: &'r Registry<Value>, name: &'static str) -> Result<Self, RegistryError> {
        let state = StateBinding::bind(registry, "cart", json!({"items": 0}), move |cart| {
            println!("   <{name}> render: {cart}");
        })?;
        println!("   <{name}> mounted with {}", state.value());
        Ok(Self { name, state })
    }

    fn click_add(&self) -> Result<(), RegistryError> {
        let items = self.state.value()["items"].as_u64().unwrap_or(0);
        self.state.publish(json!({"items": items + 1}), self.name)
    }

    fn unmount(self) -> Result<(), RegistryError> {
        println!("   <{}> unmounted after {} renders", self.name, self.state.render_count());
        self.state.release()
    }
}

fn main() -> Result<(), RegistryError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== notification-registry: Component Binding ===\n");

    let registry = Registry::new(RegistryConfig::flat().log_payloads(false));

    println!("1. Mounting header and sidebar...");
    let header = Component::mount(&registry, "header")?;
    let sidebar = Component::mount(&registry, "sidebar")?;

    println!("\n2. Clicking 'add' in the sidebar...");
    sidebar.click_add()?;

    println!("\n3. Unmounting the header...");
    header.unmount()?;

    println!("\n4. Clicking 'add' again...");
    sidebar.click_add()?;

    println!("\n5. Mounting a late component (flat registry replays current state)...");
    let footer = Component::mount(&registry, "footer")?;

    footer.unmount()?;
    sidebar.unmount()?;

    println!("\n   final cart: {:?}", registry.get_state("cart"));
    println!("\n=== Example Complete ===");
    Ok(())
}
