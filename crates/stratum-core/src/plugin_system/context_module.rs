//! # Context Modules
//!
//! A context module is a plugin that owns one bounded context: its
//! repositories and its command, query and event handlers. Module authors
//! implement [`ContextModule`] and register the module wrapped in a
//! [`BaseContextModule`], whose `initialize` hook performs the wiring:
//!
//! 1. register the module's repositories in the container,
//! 2. resolve the command, query and event buses,
//! 3. register command handlers,
//! 4. register query handlers,
//! 5. subscribe event handlers.
//!
//! Handler lists are built after step 1, so handler constructors can resolve
//! the module's own repositories from the container.
use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::bus::{
    BusError, CommandBus, EventBus, QueryBus, SharedCommandHandler, SharedEventHandler,
    SharedQueryHandler,
};
use crate::container::{Container, ContainerError, Factory, Instance, Lifetime};
use crate::kernel::constants::{COMMAND_BUS_TOKEN, EVENT_BUS_TOKEN, QUERY_BUS_TOKEN};
use crate::kernel::error::Result;
use crate::plugin_system::context::PluginContext;
use crate::plugin_system::traits::{HealthStatus, Plugin, PluginMetadata};

/// Binds a command type to its handler
pub struct CommandDefinition {
    pub name: String,
    pub command_type: String,
    pub handler: SharedCommandHandler,
}

impl CommandDefinition {
    pub fn new(
        name: impl Into<String>,
        command_type: impl Into<String>,
        handler: SharedCommandHandler,
    ) -> Self {
        Self {
            name: name.into(),
            command_type: command_type.into(),
            handler,
        }
    }
}

/// Binds a query type to its handler
pub struct QueryDefinition {
    pub name: String,
    pub query_type: String,
    pub handler: SharedQueryHandler,
}

impl QueryDefinition {
    pub fn new(
        name: impl Into<String>,
        query_type: impl Into<String>,
        handler: SharedQueryHandler,
    ) -> Self {
        Self {
            name: name.into(),
            query_type: query_type.into(),
            handler,
        }
    }
}

/// Subscribes a handler to an event type
pub struct EventHandlerDefinition {
    pub event_name: String,
    pub event_type: String,
    pub handler: SharedEventHandler,
}

impl EventHandlerDefinition {
    pub fn new(
        event_name: impl Into<String>,
        event_type: impl Into<String>,
        handler: SharedEventHandler,
    ) -> Self {
        Self {
            event_name: event_name.into(),
            event_type: event_type.into(),
            handler,
        }
    }
}

/// What a repository definition puts into the container
pub enum RepositoryProvider {
    /// A ready-made value
    Instance(Instance),
    /// A factory run according to the definition's lifetime
    Factory(Factory),
}

/// A repository registered in the container under `token`
pub struct RepositoryDefinition {
    pub token: String,
    pub provider: RepositoryProvider,
    /// `Some(false)` opts into a transient registration; anything else is a
    /// singleton.
    pub singleton: Option<bool>,
}

impl RepositoryDefinition {
    pub fn instance<T>(token: impl Into<String>, instance: Arc<T>) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            token: token.into(),
            provider: RepositoryProvider::Instance(instance),
            singleton: None,
        }
    }

    pub fn factory<F>(token: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&Container) -> std::result::Result<Instance, ContainerError> + Send + Sync + 'static,
    {
        Self {
            token: token.into(),
            provider: RepositoryProvider::Factory(Arc::new(factory)),
            singleton: None,
        }
    }

    /// Resolve a fresh value on every lookup
    pub fn transient(mut self) -> Self {
        self.singleton = Some(false);
        self
    }

    pub fn lifetime(&self) -> Lifetime {
        match self.singleton {
            Some(false) => Lifetime::Transient,
            _ => Lifetime::Singleton,
        }
    }

    fn into_factory(self) -> (String, Factory, Lifetime) {
        let lifetime = self.lifetime();
        let factory: Factory = match self.provider {
            RepositoryProvider::Instance(instance) => {
                Arc::new(move |_: &Container| -> std::result::Result<Instance, ContainerError> {
                    Ok(instance.clone())
                })
            }
            RepositoryProvider::Factory(factory) => factory,
        };
        (self.token, factory, lifetime)
    }
}

/// A bounded context contributed as a plugin.
///
/// Handler-list methods receive the container so handlers can be built
/// around repositories resolved from it.
#[async_trait]
pub trait ContextModule: Send + Sync {
    fn metadata(&self) -> &PluginMetadata;

    /// Name of the bounded context, e.g. `"orders"`
    fn context_name(&self) -> &str;

    fn repositories(&self) -> Vec<RepositoryDefinition> {
        Vec::new()
    }

    fn commands(&self, _container: &Container) -> Result<Vec<CommandDefinition>> {
        Ok(Vec::new())
    }

    fn queries(&self, _container: &Container) -> Result<Vec<QueryDefinition>> {
        Ok(Vec::new())
    }

    fn event_handlers(&self, _container: &Container) -> Result<Vec<EventHandlerDefinition>> {
        Ok(Vec::new())
    }

    async fn start(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        HealthStatus::healthy()
    }
}

/// Counts of what a wiring pass registered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WiringSummary {
    pub repositories: usize,
    pub commands: usize,
    pub queries: usize,
    pub event_handlers: usize,
}

/// Fails if a message type appears twice in `types` or is already handled.
fn ensure_unclaimed<'a>(
    bus: &'static str,
    types: impl Iterator<Item = &'a str>,
    is_claimed: impl Fn(&str) -> bool,
) -> std::result::Result<(), BusError> {
    let mut seen = HashSet::new();
    for message_type in types {
        if !seen.insert(message_type) || is_claimed(message_type) {
            return Err(BusError::HandlerAlreadyRegistered {
                bus,
                message_type: message_type.to_string(),
            });
        }
    }
    Ok(())
}

/// Adapts a [`ContextModule`] into a [`Plugin`] whose `initialize` hook wires
/// the module into the container and buses.
pub struct BaseContextModule<M> {
    module: M,
}

impl<M: ContextModule> BaseContextModule<M> {
    pub fn new(module: M) -> Self {
        Self { module }
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    /// Run the five wiring steps against the context's container.
    ///
    /// Command and query types are checked against the buses (and against
    /// each other) before any handler is registered. Repositories registered
    /// in step 1 stay in the container if a later step fails.
    pub fn wire(&self, ctx: &PluginContext) -> Result<WiringSummary> {
        let container = ctx.container();
        let context_name = self.module.context_name();
        let mut summary = WiringSummary::default();

        for definition in self.module.repositories() {
            let (token, factory, lifetime) = definition.into_factory();
            log::debug!("[{}] Registering repository '{}' ({:?})", context_name, token, lifetime);
            container.register_factory(&token, factory, lifetime)?;
            summary.repositories += 1;
        }

        let command_bus = container.resolve::<CommandBus>(COMMAND_BUS_TOKEN)?;
        let query_bus = container.resolve::<QueryBus>(QUERY_BUS_TOKEN)?;
        let event_bus = container.resolve::<EventBus>(EVENT_BUS_TOKEN)?;

        let commands = self.module.commands(container)?;
        let queries = self.module.queries(container)?;
        let event_handlers = self.module.event_handlers(container)?;

        // Claim check first, so a conflict leaves the buses untouched
        ensure_unclaimed("command", commands.iter().map(|c| c.command_type.as_str()), |t| {
            command_bus.has_handler(t)
        })?;
        ensure_unclaimed("query", queries.iter().map(|q| q.query_type.as_str()), |t| {
            query_bus.has_handler(t)
        })?;

        for command in commands {
            log::debug!(
                "[{}] Command '{}' -> {}",
                context_name, command.name, command.command_type
            );
            command_bus.register(&command.command_type, command.handler)?;
            summary.commands += 1;
        }

        for query in queries {
            log::debug!("[{}] Query '{}' -> {}", context_name, query.name, query.query_type);
            query_bus.register(&query.query_type, query.handler)?;
            summary.queries += 1;
        }

        for handler in event_handlers {
            log::debug!(
                "[{}] Event handler '{}' <- {}",
                context_name,
                handler.event_name,
                handler.event_type
            );
            event_bus.subscribe(&handler.event_type, handler.handler)?;
            summary.event_handlers += 1;
        }

        log::info!(
            "Context '{}' wired: {} repositories, {} commands, {} queries, {} event handlers",
            context_name,
            summary.repositories,
            summary.commands,
            summary.queries,
            summary.event_handlers
        );
        Ok(summary)
    }
}

#[async_trait]
impl<M: ContextModule + 'static> Plugin for BaseContextModule<M> {
    fn metadata(&self) -> &PluginMetadata {
        self.module.metadata()
    }

    async fn initialize(&self, ctx: &PluginContext) -> Result<()> {
        self.wire(ctx).map(|_| ())
    }

    async fn start(&self) -> Result<()> {
        self.module.start().await
    }

    async fn stop(&self) -> Result<()> {
        self.module.stop().await
    }

    async fn health_check(&self) -> HealthStatus {
        self.module.health_check().await
    }

    fn as_context_module(&self) -> Option<&dyn ContextModule> {
        Some(&self.module)
    }
}
