use std::sync::Arc;

use crate::bus::{CommandBus, EventBus, QueryBus};
use crate::config::AppConfig;
use crate::container::Container;
use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::plugin_system::{
    BaseContextModule, ContextModule, HealthStatus, LifecycleManager, LifecyclePhase, Plugin,
    PluginContext, ShutdownReport,
};

/// Main application struct: owns the runtime environment and the plugin
/// lifecycle.
///
/// The container and the three buses are built exactly once, here, and reach
/// plugins only through the shared [`PluginContext`].
pub struct Application {
    command_bus: Arc<CommandBus>,
    query_bus: Arc<QueryBus>,
    event_bus: Arc<EventBus>,
    context: PluginContext,
    lifecycle: LifecycleManager,
}

impl Application {
    /// Creates the runtime environment: container, buses and plugin context.
    pub fn new(config: AppConfig) -> Result<Self> {
        log::info!(
            "Initializing {} v{} ({})",
            constants::APP_NAME,
            constants::APP_VERSION,
            config.app_name
        );

        let container = Arc::new(Container::new());
        let command_bus = Arc::new(CommandBus::new());
        let query_bus = Arc::new(QueryBus::new());
        let event_bus = Arc::new(EventBus::new());

        container.register_instance(constants::COMMAND_BUS_TOKEN, command_bus.clone())?;
        container.register_instance(constants::QUERY_BUS_TOKEN, query_bus.clone())?;
        container.register_instance(constants::EVENT_BUS_TOKEN, event_bus.clone())?;

        let context = PluginContext::new(container, Arc::new(config));

        Ok(Application {
            command_bus,
            query_bus,
            event_bus,
            context,
            lifecycle: LifecycleManager::new(),
        })
    }

    /// Register a plugin. Names must be unique.
    pub fn register_plugin(&mut self, plugin: Arc<dyn Plugin>) -> Result<()> {
        self.lifecycle.register(plugin)
    }

    /// Register a bounded context, wrapped so its initialize hook wires it.
    pub fn register_context_module<M: ContextModule + 'static>(&mut self, module: M) -> Result<()> {
        self.register_plugin(Arc::new(BaseContextModule::new(module)))
    }

    /// Initialize all registered plugins in dependency order.
    pub async fn initialize(&mut self) -> Result<()> {
        self.lifecycle.initialize_all(&self.context).await
    }

    /// Start all initialized plugins in dependency order.
    pub async fn start(&mut self) -> Result<()> {
        self.lifecycle.start_all().await
    }

    /// Stop all plugins in reverse dependency order. Never fails; see the
    /// report for plugins whose stop hook errored.
    pub async fn shutdown(&mut self) -> ShutdownReport {
        log::info!("Shutting down {}...", self.context.config().app_name);
        self.lifecycle.stop_all().await
    }

    /// Initialize then start. If either phase fails, already-touched plugins
    /// are shut down before the error is returned.
    pub async fn run(&mut self) -> Result<()> {
        let bootstrap = match self.initialize().await {
            Ok(()) => self.start().await,
            Err(e) => Err(e),
        };

        if let Err(e) = bootstrap {
            log::error!("Bootstrap failed: {}", e);
            let report = self.shutdown().await;
            if !report.is_clean() {
                log::warn!(
                    "Teardown after failed bootstrap left {} failure(s)",
                    report.failures.len()
                );
            }
            return Err(e);
        }

        log::info!("Application initialized and started successfully.");
        Ok(())
    }

    /// Health of every plugin in dependency order
    pub async fn health(&self) -> Vec<(String, HealthStatus)> {
        self.lifecycle.health_check_all().await
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle.phase() == LifecyclePhase::Started
    }

    pub fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    pub fn context(&self) -> &PluginContext {
        &self.context
    }

    pub fn container(&self) -> &Arc<Container> {
        self.context.container()
    }

    pub fn config(&self) -> &Arc<AppConfig> {
        self.context.config()
    }

    pub fn command_bus(&self) -> &Arc<CommandBus> {
        &self.command_bus
    }

    pub fn query_bus(&self) -> &Arc<QueryBus> {
        &self.query_bus
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}
