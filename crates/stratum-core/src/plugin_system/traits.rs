use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::kernel::error::Result;
use crate::plugin_system::context::PluginContext;
use crate::plugin_system::context_module::ContextModule;

/// Descriptive metadata every plugin declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// Unique name within a registry
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Names of plugins that must be initialized before this one
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl PluginMetadata {
    /// Create metadata with no description and no dependencies
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
            dependencies: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Display for PluginMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

/// Coarse health of a plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthState::Healthy => write!(f, "healthy"),
            HealthState::Degraded => write!(f, "degraded"),
            HealthState::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Result of a plugin health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub state: HealthState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            state: HealthState::Healthy,
            message: None,
        }
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            state: HealthState::Degraded,
            message: Some(message.into()),
        }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            state: HealthState::Unhealthy,
            message: Some(message.into()),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.state == HealthState::Healthy
    }
}

/// Core trait that all plugins must implement.
///
/// Only [`metadata`](Plugin::metadata) is required. Every lifecycle hook has a
/// default that does nothing and succeeds, so a plugin overrides just the
/// hooks it needs. Hooks take `&self`; plugins that keep state across phases
/// use interior mutability.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Name, version, description and dependencies of the plugin
    fn metadata(&self) -> &PluginMetadata;

    /// Called once, in dependency order, before any plugin is started.
    async fn initialize(&self, _ctx: &PluginContext) -> Result<()> {
        Ok(())
    }

    /// Called once, in dependency order, after every plugin is initialized.
    async fn start(&self) -> Result<()> {
        Ok(())
    }

    /// Called in reverse dependency order during shutdown.
    async fn stop(&self) -> Result<()> {
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        HealthStatus::healthy()
    }

    /// Capability check: plugins that wire a bounded context return it here.
    fn as_context_module(&self) -> Option<&dyn ContextModule> {
        None
    }
}
