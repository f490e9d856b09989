//! # Stratum Message Buses
//!
//! The three buses context modules wire their handlers into:
//!
//! - **[`CommandBus`]**: one handler per command type; commands change state.
//! - **[`QueryBus`]**: one handler per query type; queries read state.
//! - **[`EventBus`]**: any number of subscribers per event type.
//!
//! Messages are JSON payloads ([`serde_json::Value`]) keyed by a string type,
//! so bounded contexts can be authored independently of each other's Rust
//! types. Dispatch awaits the handler directly on the caller's task.
pub mod command;
pub mod error;
pub mod event;
pub mod query;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use command::CommandBus;
pub use error::BusError;
pub use event::EventBus;
pub use query::QueryBus;

/// Shorthand for Result with the bus error type
pub type BusResult<T> = std::result::Result<T, BusError>;

/// Handles one command type
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, payload: Value) -> BusResult<Value>;
}

/// Handles one query type
#[async_trait]
pub trait QueryHandler: Send + Sync {
    async fn handle(&self, payload: Value) -> BusResult<Value>;
}

/// Reacts to published events
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent) -> BusResult<()>;
}

/// Shared command handler
pub type SharedCommandHandler = Arc<dyn CommandHandler>;
/// Shared query handler
pub type SharedQueryHandler = Arc<dyn QueryHandler>;
/// Shared event handler
pub type SharedEventHandler = Arc<dyn EventHandler>;

/// An event published on the [`EventBus`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub event_type: String,
    pub payload: Value,
}

impl DomainEvent {
    pub fn new(event_type: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }
}

#[cfg(test)]
mod tests;
