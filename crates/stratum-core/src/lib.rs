//! Stratum core: registers independently authored components, orders them by
//! their declared dependencies and drives them through an
//! initialize → start → stop lifecycle.
pub mod bus;
pub mod config;
pub mod container;
pub mod kernel;
pub mod plugin_system;

// Re-export key public types/traits for easier use by the binary and plugins
pub use config::AppConfig;
pub use container::Container;
pub use kernel::Application;
pub use kernel::error::{Error, Result};
pub use plugin_system::{
    BaseContextModule, ContextModule, HealthStatus, LifecycleManager, LifecyclePhase, Plugin,
    PluginContext, PluginMetadata, PluginRegistry,
};
