//! Ordered plugin registry.
//!
//! Plugins are registered at start-up, from descriptors and/or built-ins.
//! Nothing is loaded dynamically: `pluginType` selects one of the plugin
//! implementations compiled into this crate.

use std::fmt;

use sl_project::PluginDescriptor;
use tracing::debug;

use crate::core_block::CoreBlockPlugin;
use crate::display::DisplayPlugin;
use crate::error::{PluginError, PluginResult};
use crate::neuron::NeuronPlugin;
use crate::traits::Plugin;

/// Plugins in registration order. Dispatch is first-willing-wins.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one plugin per descriptor, in order.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = PluginDescriptor>,
        strict_properties: bool,
    ) -> PluginResult<Self> {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.push(plugin_from_descriptor(descriptor, strict_properties)?);
        }
        Ok(registry)
    }

    /// Registry holding only the built-in plugins.
    pub fn builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    /// Append `NeuronPlugin` and `DisplayPlugin`.
    pub fn register_builtins(&mut self) {
        self.register(NeuronPlugin::new());
        self.register(DisplayPlugin::new());
    }

    pub fn register(&mut self, plugin: impl Plugin + 'static) {
        self.push(Box::new(plugin));
    }

    pub fn push(&mut self, plugin: Box<dyn Plugin>) {
        debug!(plugin = plugin.name(), position = self.plugins.len(), "Registered plugin");
        self.plugins.push(plugin);
    }

    pub fn all_plugins(&self) -> &[Box<dyn Plugin>] {
        &self.plugins
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

/// Instantiate the plugin a descriptor asks for.
pub fn plugin_from_descriptor(
    descriptor: PluginDescriptor,
    strict_properties: bool,
) -> PluginResult<Box<dyn Plugin>> {
    let plugin_type = descriptor.plugin_type.clone();
    match plugin_type.as_str() {
        "core" => Ok(Box::new(
            CoreBlockPlugin::new(descriptor)?.with_strict_properties(strict_properties),
        )),
        "neuron" => Ok(Box::new(NeuronPlugin::from_descriptor(&descriptor))),
        "display" => Ok(Box::new(DisplayPlugin::from_descriptor(&descriptor))),
        other => Err(PluginError::UnknownPluginType {
            plugin: descriptor.plugin_name.clone(),
            plugin_type: other.to_string(),
        }),
    }
}
