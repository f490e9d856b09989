//! # Stratum Plugin System
//!
//! This module registers independently authored plugins, orders them by their
//! declared dependencies, and drives them through their lifecycle.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`traits`]**: The [`Plugin`] trait every component implements, plus
//!   [`PluginMetadata`] and [`HealthStatus`].
//! - **[`dependency`]**: [`DependencyGraph`], a depth-first topological sort
//!   with cycle and missing-dependency detection.
//! - **[`registry`]**: [`PluginRegistry`], plugins by unique name, returned in
//!   dependency or reverse dependency order.
//! - **[`lifecycle`]**: [`LifecycleManager`], fail-fast initialize/start and
//!   fail-soft stop with per-plugin phase tracking.
//! - **[`context`]**: [`PluginContext`], the runtime environment handed to
//!   `initialize` hooks.
//! - **[`context_module`]**: [`ContextModule`] and [`BaseContextModule`], which
//!   wire a bounded context's repositories and handlers into the container
//!   and buses.
//! - **[`error`]**: [`PluginSystemError`](error::PluginSystemError).
pub mod context;
pub mod context_module;
pub mod dependency;
pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod traits;

pub use context::PluginContext;
pub use context_module::{
    BaseContextModule, CommandDefinition, ContextModule, EventHandlerDefinition, QueryDefinition,
    RepositoryDefinition, RepositoryProvider, WiringSummary,
};
pub use dependency::{DependencyError, DependencyGraph};
pub use error::PluginSystemError;
pub use lifecycle::{LifecycleHook, LifecycleManager, LifecyclePhase, ShutdownReport, StopFailure};
pub use registry::PluginRegistry;
pub use traits::{HealthState, HealthStatus, Plugin, PluginMetadata};

// Test module declaration
#[cfg(test)]
mod tests;
