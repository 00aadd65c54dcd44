//! Plugin registry
//!
//! Maps plugin names to plugin instances. Implementations referenced by a
//! blueprint resolve through the first dotted segment of their path.

use crate::error::{PluginError, Result};
use crate::plugin::Plugin;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of available plugins
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin under its own name
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.insert(plugin.name().to_string(), plugin);
    }

    /// Get a plugin by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.get(name).cloned()
    }

    /// Resolve the plugin for a dotted implementation path
    pub fn resolve(&self, implementation: &str) -> Result<Arc<dyn Plugin>> {
        let name = implementation.split('.').next().unwrap_or("");
        self.get(name)
            .ok_or_else(|| PluginError::PluginNotFound(name.to_string()))
    }

    /// Registered plugin names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plugins.keys().map(String::as_str).collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPlugin;

    #[test]
    fn test_resolve_by_implementation_path() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(MemoryPlugin::new("openstack")));

        let plugin = registry
            .resolve("openstack.nova_plugin.server.create")
            .unwrap();
        assert_eq!(plugin.name(), "openstack");

        let err = registry.resolve("diamond.diamond_agent.tasks.install");
        assert!(matches!(err, Err(PluginError::PluginNotFound(_))));
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(MemoryPlugin::new("openstack")));
        registry.register(Arc::new(MemoryPlugin::new("diamond")));
        assert_eq!(registry.names(), vec!["diamond", "openstack"]);
    }
}
