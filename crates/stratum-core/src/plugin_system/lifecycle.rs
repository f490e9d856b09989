//! # Plugin Lifecycle
//!
//! [`LifecycleManager`] drives every registered plugin through
//! initialize → start → stop.
//!
//! - `initialize_all` and `start_all` walk the plugins in dependency order and
//!   are fail-fast: the first hook error aborts the phase, and plugins later
//!   in the order are never attempted.
//! - `stop_all` walks the plugins in reverse dependency order and is
//!   fail-soft: every plugin's `stop` hook is attempted, and failures are
//!   collected in a [`ShutdownReport`] instead of being returned.
//!
//! Hooks run one at a time; each is awaited before the next plugin's hook
//! starts, so a plugin can rely on every plugin before it in the order having
//! finished the current phase.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::kernel::error::{Error, Result};
use crate::plugin_system::context::PluginContext;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::traits::{HealthStatus, Plugin};

/// Lifecycle state of a plugin, or of the manager as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecyclePhase {
    #[default]
    Uninitialized,
    Initializing,
    Initialized,
    Starting,
    Started,
    Stopping,
    Stopped,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecyclePhase::Uninitialized => "uninitialized",
            LifecyclePhase::Initializing => "initializing",
            LifecyclePhase::Initialized => "initialized",
            LifecyclePhase::Starting => "starting",
            LifecyclePhase::Started => "started",
            LifecyclePhase::Stopping => "stopping",
            LifecyclePhase::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// The lifecycle hook a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleHook {
    Initialize,
    Start,
    Stop,
}

impl LifecycleHook {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleHook::Initialize => "initialize",
            LifecycleHook::Start => "start",
            LifecycleHook::Stop => "stop",
        }
    }
}

impl fmt::Display for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A plugin whose `stop` hook failed
#[derive(Debug)]
pub struct StopFailure {
    pub plugin_name: String,
    pub error: Error,
}

/// Outcome of [`LifecycleManager::stop_all`]
#[derive(Debug, Default)]
pub struct ShutdownReport {
    /// Plugins in the order their `stop` hook was attempted
    pub attempted: Vec<String>,
    pub failures: Vec<StopFailure>,
}

impl ShutdownReport {
    /// True when every `stop` hook succeeded
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_plugins(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.plugin_name.as_str()).collect()
    }
}

/// Orders plugins by dependency and drives their lifecycle hooks
#[derive(Default)]
pub struct LifecycleManager {
    registry: PluginRegistry,
    phases: HashMap<String, LifecyclePhase>,
    phase: LifecyclePhase,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manage the plugins of an existing registry
    pub fn with_registry(registry: PluginRegistry) -> Self {
        Self {
            registry,
            ..Self::default()
        }
    }

    /// Register a plugin with the underlying registry
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> Result<()> {
        self.registry.register(plugin)?;
        Ok(())
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Phase of the manager as a whole
    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Phase of one plugin; `Uninitialized` if it was never touched
    pub fn plugin_phase(&self, name: &str) -> LifecyclePhase {
        self.phases.get(name).copied().unwrap_or_default()
    }

    fn set_plugin_phase(&mut self, name: &str, phase: LifecyclePhase) {
        self.phases.insert(name.to_string(), phase);
    }

    /// Initialize every plugin in dependency order.
    ///
    /// Does nothing unless the manager is `Uninitialized`. The first failing
    /// hook reverts that plugin to `Uninitialized` and aborts the phase.
    pub async fn initialize_all(&mut self, ctx: &PluginContext) -> Result<()> {
        if self.phase != LifecyclePhase::Uninitialized {
            log::debug!("initialize_all skipped; manager is {}", self.phase);
            return Ok(());
        }

        self.phase = LifecyclePhase::Initializing;
        log::info!("Initializing {} plugins...", self.registry.len());

        let result = self.initialize_in_order(ctx).await;
        ctx.set_current_plugin_name(None);
        result?;

        self.phase = LifecyclePhase::Initialized;
        log::info!("Plugin initialization complete.");
        Ok(())
    }

    async fn initialize_in_order(&mut self, ctx: &PluginContext) -> Result<()> {
        let plugins = self.registry.plugins_in_order()?;

        for plugin in plugins {
            let name = plugin.metadata().name.clone();
            log::debug!("Initializing plugin: {}", plugin.metadata());
            self.set_plugin_phase(&name, LifecyclePhase::Initializing);
            ctx.set_current_plugin_name(Some(&name));

            if let Err(e) = plugin.initialize(ctx).await {
                self.set_plugin_phase(&name, LifecyclePhase::Uninitialized);
                log::error!("Plugin '{}' failed to initialize: {}", name, e);
                return Err(PluginSystemError::lifecycle(name, LifecycleHook::Initialize, e).into());
            }

            self.set_plugin_phase(&name, LifecyclePhase::Initialized);
        }

        Ok(())
    }

    /// Start every plugin in dependency order.
    ///
    /// Requires a fully initialized manager; calling it again after a
    /// successful start does nothing. The first failing hook reverts that
    /// plugin to `Initialized` and aborts the phase.
    pub async fn start_all(&mut self) -> Result<()> {
        if self.phase == LifecyclePhase::Started {
            log::debug!("start_all skipped; plugins already started");
            return Ok(());
        }
        if self.phase != LifecyclePhase::Initialized {
            return Err(PluginSystemError::InvalidState {
                operation: "start plugins",
                expected: LifecyclePhase::Initialized,
                actual: self.phase,
            }
            .into());
        }

        self.phase = LifecyclePhase::Starting;
        log::info!("Starting {} plugins...", self.registry.len());

        for plugin in self.registry.plugins_in_order()? {
            let name = plugin.metadata().name.clone();
            log::debug!("Starting plugin: {}", name);
            self.set_plugin_phase(&name, LifecyclePhase::Starting);

            if let Err(e) = plugin.start().await {
                self.set_plugin_phase(&name, LifecyclePhase::Initialized);
                log::error!("Plugin '{}' failed to start: {}", name, e);
                return Err(PluginSystemError::lifecycle(name, LifecycleHook::Start, e).into());
            }

            self.set_plugin_phase(&name, LifecyclePhase::Started);
        }

        self.phase = LifecyclePhase::Started;
        log::info!("Plugin start complete.");
        Ok(())
    }

    /// Stop every plugin in reverse dependency order.
    ///
    /// Allowed from any phase and never fails: a failing `stop` hook is
    /// logged and recorded in the report, and teardown carries on. Every
    /// plugin ends `Stopped`.
    pub async fn stop_all(&mut self) -> ShutdownReport {
        self.phase = LifecyclePhase::Stopping;
        log::info!("Stopping {} plugins...", self.registry.len());

        let plugins = match self.registry.plugins_in_reverse_order() {
            Ok(plugins) => plugins,
            Err(e) => {
                log::error!(
                    "Cannot order plugins for shutdown ({}); using reverse registration order",
                    e
                );
                self.registry.plugins().iter().rev().cloned().collect()
            }
        };

        let mut report = ShutdownReport::default();
        for plugin in plugins {
            let name = plugin.metadata().name.clone();
            log::debug!("Stopping plugin: {}", name);
            self.set_plugin_phase(&name, LifecyclePhase::Stopping);

            if let Err(e) = plugin.stop().await {
                log::error!("Error stopping plugin {}: {}", name, e);
                report.failures.push(StopFailure {
                    plugin_name: name.clone(),
                    error: e,
                });
            }

            self.set_plugin_phase(&name, LifecyclePhase::Stopped);
            report.attempted.push(name);
        }

        self.phase = LifecyclePhase::Stopped;
        if report.is_clean() {
            log::info!("Plugin shutdown complete.");
        } else {
            log::warn!(
                "Plugin shutdown complete with {} failure(s): {}",
                report.failures.len(),
                report.failed_plugins().join(", ")
            );
        }
        report
    }

    /// Health of every plugin, in dependency order when it can be computed
    pub async fn health_check_all(&self) -> Vec<(String, HealthStatus)> {
        let plugins = match self.registry.plugins_in_order() {
            Ok(plugins) => plugins,
            Err(e) => {
                log::warn!(
                    "Cannot order plugins for health checks ({}); using registration order",
                    e
                );
                self.registry.plugins().to_vec()
            }
        };

        let mut statuses = Vec::with_capacity(plugins.len());
        for plugin in plugins {
            let status = plugin.health_check().await;
            if !status.is_healthy() {
                log::warn!("Plugin '{}' reports {}", plugin.metadata().name, status.state);
            }
            statuses.push((plugin.metadata().name.clone(), status));
        }
        statuses
    }
}
