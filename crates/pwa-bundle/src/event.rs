//! Extension lifecycle events.
//!
//! The shop platform notifies listeners after an extension was activated
//! or deactivated. [`AssetBundleListener`] rebuilds the asset bundle for
//! both notifications.

use std::collections::HashMap;
use std::sync::Arc;

use crate::bundler::AssetBundler;
use crate::extension::ExtensionHost;
use crate::storage::PublicStorage;

/// Extension lifecycle event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    PluginPostActivate,
    PluginPostDeactivate,
}

impl EventType {
    /// Returns the platform's name for this event.
    pub fn name(&self) -> &'static str {
        match self {
            EventType::PluginPostActivate => "plugin.post_activate",
            EventType::PluginPostDeactivate => "plugin.post_deactivate",
        }
    }

    /// Returns all event types.
    pub fn all() -> &'static [EventType] {
        &[EventType::PluginPostActivate, EventType::PluginPostDeactivate]
    }
}

/// Event fired after an extension changed its activation state.
#[derive(Debug, Clone)]
pub struct ExtensionLifecycleEvent {
    pub event_type: EventType,
    /// Extension that triggered the event, if known
    pub extension_name: Option<String>,
}

impl ExtensionLifecycleEvent {
    pub fn activated(extension_name: impl Into<String>) -> Self {
        Self {
            event_type: EventType::PluginPostActivate,
            extension_name: Some(extension_name.into()),
        }
    }

    pub fn deactivated(extension_name: impl Into<String>) -> Self {
        Self {
            event_type: EventType::PluginPostDeactivate,
            extension_name: Some(extension_name.into()),
        }
    }

    /// Event without a known originating extension
    pub fn anonymous(event_type: EventType) -> Self {
        Self {
            event_type,
            extension_name: None,
        }
    }
}

/// Trait for event listeners.
pub trait EventListener: Send + Sync {
    /// Handle an event.
    fn handle(&self, event: &ExtensionLifecycleEvent) -> anyhow::Result<()>;

    /// Returns the priority of this listener (higher = earlier execution).
    fn priority(&self) -> i32 {
        0
    }
}

/// Listener that rebuilds and publishes the PWA asset bundle.
pub struct AssetBundleListener<H, S> {
    bundler: AssetBundler<H, S>,
}

impl<H, S> AssetBundleListener<H, S>
where
    H: ExtensionHost + Send + Sync + 'static,
    S: PublicStorage + Send + Sync + 'static,
{
    pub fn new(bundler: AssetBundler<H, S>) -> Self {
        Self { bundler }
    }

    pub fn bundler(&self) -> &AssetBundler<H, S> {
        &self.bundler
    }

    /// Event types this listener reacts to
    pub fn subscribed_events() -> &'static [EventType] {
        EventType::all()
    }

    /// Register the listener for all subscribed events
    pub fn subscribe(self: Arc<Self>, dispatcher: &mut EventDispatcher) {
        for event_type in Self::subscribed_events() {
            dispatcher.add_listener(*event_type, self.clone());
        }
    }
}

impl<H, S> EventListener for AssetBundleListener<H, S>
where
    H: ExtensionHost + Send + Sync,
    S: PublicStorage + Send + Sync,
{
    fn handle(&self, event: &ExtensionLifecycleEvent) -> anyhow::Result<()> {
        match &event.extension_name {
            Some(name) => log::info!("{} ({}), rebuilding PWA assets", event.event_type.name(), name),
            None => log::info!("{}, rebuilding PWA assets", event.event_type.name()),
        }

        self.bundler.dump_bundles()?;
        Ok(())
    }
}

/// Event dispatcher that manages listeners and dispatches events.
pub struct EventDispatcher {
    listeners: HashMap<EventType, Vec<Arc<dyn EventListener>>>,
}

impl EventDispatcher {
    /// Create a new event dispatcher.
    pub fn new() -> Self {
        Self { listeners: HashMap::new() }
    }

    /// Add a listener for a specific event type.
    pub fn add_listener(&mut self, event_type: EventType, listener: Arc<dyn EventListener>) {
        self.listeners.entry(event_type).or_default().push(listener);
    }

    pub fn has_listeners(&self, event_type: EventType) -> bool {
        self.listeners
            .get(&event_type)
            .is_some_and(|listeners| !listeners.is_empty())
    }

    /// Dispatch an event to all registered listeners, stopping at the first failure.
    pub fn dispatch(&self, event: &ExtensionLifecycleEvent) -> anyhow::Result<()> {
        let Some(listeners) = self.listeners.get(&event.event_type) else {
            return Ok(());
        };

        let mut sorted_listeners: Vec<_> = listeners.iter().collect();
        sorted_listeners.sort_by(|a, b| b.priority().cmp(&a.priority()));

        for listener in sorted_listeners {
            listener.handle(event)?;
        }

        Ok(())
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
