use std::collections::HashMap;
use std::sync::Arc;

use crate::plugin_system::dependency::{DependencyError, DependencyGraph};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::Plugin;

/// Registry for managing plugins.
///
/// Plugins are kept in registration order and indexed by name. Ordering is
/// never cached: every ordered query builds a fresh [`DependencyGraph`] from
/// the current registrations.
#[derive(Default)]
pub struct PluginRegistry {
    /// Registered plugins in registration order
    plugins: Vec<Arc<dyn Plugin>>,
    /// Name -> position in `plugins`
    index: HashMap<String, usize>,
}

impl PluginRegistry {
    /// Create an empty plugin registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin under its metadata name
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> Result<(), PluginSystemError> {
        let name = plugin.metadata().name.clone();

        if self.index.contains_key(&name) {
            return Err(PluginSystemError::DuplicatePlugin { plugin_name: name });
        }

        log::debug!("Registered plugin {}", plugin.metadata());
        self.index.insert(name, self.plugins.len());
        self.plugins.push(plugin);
        Ok(())
    }

    /// Check if a plugin is registered by name
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Get a plugin Arc by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.index.get(name).map(|&i| self.plugins[i].clone())
    }

    /// Registered plugins in registration order
    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }

    /// Registered plugin names in registration order
    pub fn names(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.metadata().name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Build the dependency graph of every registered plugin
    pub fn build_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for plugin in &self.plugins {
            let metadata = plugin.metadata();
            graph.add_node(&metadata.name, &metadata.dependencies);
        }
        graph
    }

    /// Plugins in initialization order (dependencies first)
    pub fn plugins_in_order(&self) -> Result<Vec<Arc<dyn Plugin>>, DependencyError> {
        let order = self.build_graph().topological_sort()?;
        Ok(self.resolve_names(&order))
    }

    /// Plugins in teardown order (dependents first)
    pub fn plugins_in_reverse_order(&self) -> Result<Vec<Arc<dyn Plugin>>, DependencyError> {
        let order = self.build_graph().reverse_topological_sort()?;
        Ok(self.resolve_names(&order))
    }

    fn resolve_names(&self, names: &[String]) -> Vec<Arc<dyn Plugin>> {
        // Every sorted name came from a registration, so the lookup always hits.
        names.iter().filter_map(|name| self.get(name)).collect()
    }
}
