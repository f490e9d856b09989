//! # Stratum Configuration
//!
//! Application configuration is read once by the driver and shared with every
//! plugin through the [`PluginContext`](crate::plugin_system::PluginContext).
//!
//! A configuration file holds the application name and one section per
//! plugin, keyed by plugin name:
//!
//! ```toml
//! app_name = "orders-service"
//!
//! [plugins.core-logging]
//! level = "debug"
//! format = "compact"
//! ```
//!
//! The file format follows the extension: JSON always, YAML and TOML behind
//! the `yaml-config` and `toml-config` features (both on by default).
pub mod data;
pub mod error;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::kernel::constants;

pub use data::{ConfigData, ConfigFormat};
pub use error::ConfigError;

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app_name: String,
    /// Per-plugin sections keyed by plugin name
    pub plugins: HashMap<String, ConfigData>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: constants::APP_NAME.to_string(),
            plugins: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a file, picking the format from its extension
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            operation: "read".to_string(),
            source,
        })?;
        let config: AppConfig = format.from_str(&contents)?;
        log::debug!(
            "Loaded configuration from {} ({} plugin sections)",
            path.display(),
            config.plugins.len()
        );
        Ok(config)
    }

    /// Write configuration to a file, picking the format from its extension
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
        let contents = format.to_string(self)?;
        fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            operation: "write".to_string(),
            source,
        })
    }

    /// Section for `plugin_name`; empty if the file has none
    pub fn plugin_config(&self, plugin_name: &str) -> ConfigData {
        self.plugins.get(plugin_name).cloned().unwrap_or_default()
    }

    pub fn set_plugin_config(&mut self, plugin_name: &str, config: ConfigData) {
        self.plugins.insert(plugin_name.to_string(), config);
    }
}

#[cfg(test)]
mod tests;
