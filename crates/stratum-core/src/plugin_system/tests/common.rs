#![cfg(test)]

use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::container::Container;
use crate::kernel::error::{Error, Result};
use crate::plugin_system::context::PluginContext;
use crate::plugin_system::lifecycle::LifecycleHook;
use crate::plugin_system::traits::{HealthStatus, Plugin, PluginMetadata};

/// Shared log of hook invocations, e.g. `["init:a", "start:a", "stop:a"]`
pub type Tracker = Arc<StdMutex<Vec<String>>>;

pub fn new_tracker() -> Tracker {
    Arc::new(StdMutex::new(Vec::new()))
}

pub fn tracked(tracker: &Tracker) -> Vec<String> {
    tracker.lock().unwrap().clone()
}

/// Context with an empty container and default configuration
pub fn test_context() -> PluginContext {
    PluginContext::new(Arc::new(Container::new()), Arc::new(AppConfig::default()))
}

// --- Mock Plugin for lifecycle and registry tests ---
pub struct MockPlugin {
    metadata: PluginMetadata,
    tracker: Tracker,
    fail_on: Vec<LifecycleHook>,
    health: HealthStatus,
    /// Current plugin name seen through the context during `initialize`
    pub seen_context_name: StdMutex<Option<String>>,
}

impl MockPlugin {
    pub fn new(name: &str, deps: &[&str], tracker: &Tracker) -> Self {
        Self {
            metadata: PluginMetadata::new(name, "1.0.0").with_dependencies(deps.iter().copied()),
            tracker: tracker.clone(),
            fail_on: Vec::new(),
            health: HealthStatus::healthy(),
            seen_context_name: StdMutex::new(None),
        }
    }

    pub fn failing_on(mut self, hook: LifecycleHook) -> Self {
        self.fail_on.push(hook);
        self
    }

    pub fn with_health(mut self, health: HealthStatus) -> Self {
        self.health = health;
        self
    }

    pub fn arc(self) -> Arc<dyn Plugin> {
        Arc::new(self)
    }

    fn record(&self, hook: LifecycleHook) -> Result<()> {
        let label = match hook {
            LifecycleHook::Initialize => "init",
            LifecycleHook::Start => "start",
            LifecycleHook::Stop => "stop",
        };
        self.tracker
            .lock()
            .unwrap()
            .push(format!("{}:{}", label, self.metadata.name));

        if self.fail_on.contains(&hook) {
            return Err(Error::Other(format!("{} failed in {}", self.metadata.name, hook)));
        }
        Ok(())
    }
}

#[async_trait]
impl Plugin for MockPlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn initialize(&self, ctx: &PluginContext) -> Result<()> {
        *self.seen_context_name.lock().unwrap() = ctx.current_plugin_name();
        self.record(LifecycleHook::Initialize)
    }

    async fn start(&self) -> Result<()> {
        self.record(LifecycleHook::Start)
    }

    async fn stop(&self) -> Result<()> {
        self.record(LifecycleHook::Stop)
    }

    async fn health_check(&self) -> HealthStatus {
        self.health.clone()
    }
}

/// Plugin relying entirely on the trait's default hooks
pub struct BarePlugin {
    metadata: PluginMetadata,
}

impl BarePlugin {
    pub fn arc(name: &str, deps: &[&str]) -> Arc<dyn Plugin> {
        Arc::new(Self {
            metadata: PluginMetadata::new(name, "0.1.0").with_dependencies(deps.iter().copied()),
        })
    }
}

impl Plugin for BarePlugin {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }
}
