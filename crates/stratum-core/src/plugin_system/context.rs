use std::sync::{Arc, RwLock};

use crate::config::{AppConfig, ConfigData};
use crate::container::Container;

/// Runtime environment handed to every plugin's `initialize` hook.
///
/// Built once by the driver and shared by reference; the container and
/// configuration are the only state plugins reach through it.
#[derive(Debug)]
pub struct PluginContext {
    container: Arc<Container>,
    config: Arc<AppConfig>,
    current_plugin: RwLock<Option<String>>,
}

impl PluginContext {
    pub fn new(container: Arc<Container>, config: Arc<AppConfig>) -> Self {
        Self {
            container,
            config,
            current_plugin: RwLock::new(None),
        }
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn config(&self) -> &Arc<AppConfig> {
        &self.config
    }

    /// Configuration section of `plugin_name`; empty when not configured.
    pub fn plugin_config(&self, plugin_name: &str) -> ConfigData {
        self.config.plugin_config(plugin_name)
    }

    /// Record which plugin's hook is currently running.
    pub fn set_current_plugin_name(&self, name: Option<&str>) {
        match self.current_plugin.write() {
            Ok(mut current) => *current = name.map(str::to_string),
            Err(_) => log::warn!("Plugin context lock poisoned; current plugin name not updated"),
        }
    }

    pub fn current_plugin_name(&self) -> Option<String> {
        self.current_plugin.read().ok().and_then(|current| current.clone())
    }
}
