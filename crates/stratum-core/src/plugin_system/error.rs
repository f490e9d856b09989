//! # Stratum Plugin System Errors
//!
//! Defines error types specific to the plugin system.
//!
//! [`PluginSystemError`] covers registration failures, dependency ordering
//! failures (wrapping [`DependencyError`]), lifecycle hook failures and
//! lifecycle precondition violations. Every variant maps to a stable code
//! through [`PluginSystemError::code`].
use crate::kernel::error::Error;
use crate::plugin_system::dependency::DependencyError;
use crate::plugin_system::lifecycle::{LifecycleHook, LifecyclePhase};

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Plugin '{plugin_name}' is already registered")]
    DuplicatePlugin { plugin_name: String },

    #[error("Dependency resolution failed: {0}")]
    DependencyResolution(#[from] DependencyError),

    #[error("Plugin '{plugin_name}' failed during {phase}: {source}")]
    PluginLifecycle {
        plugin_name: String,
        phase: LifecycleHook,
        #[source]
        source: Box<Error>,
    },

    #[error("Cannot {operation} while the lifecycle manager is {actual} (expected {expected})")]
    InvalidState {
        operation: &'static str,
        expected: LifecyclePhase,
        actual: LifecyclePhase,
    },
}

impl PluginSystemError {
    /// Wrap a hook failure with the plugin name and hook it came from.
    pub fn lifecycle(plugin_name: impl Into<String>, phase: LifecycleHook, source: Error) -> Self {
        PluginSystemError::PluginLifecycle {
            plugin_name: plugin_name.into(),
            phase,
            source: Box::new(source),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            PluginSystemError::DuplicatePlugin { .. } => "DUPLICATE_PLUGIN",
            PluginSystemError::DependencyResolution(e) => e.code(),
            PluginSystemError::PluginLifecycle { .. } => "PLUGIN_LIFECYCLE_ERROR",
            PluginSystemError::InvalidState { .. } => "INVALID_LIFECYCLE_STATE",
        }
    }
}
