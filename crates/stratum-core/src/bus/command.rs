use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use serde_json::Value;

use crate::bus::{BusError, BusResult, SharedCommandHandler};

/// Routes each command type to exactly one handler
#[derive(Default)]
pub struct CommandBus {
    handlers: RwLock<HashMap<String, SharedCommandHandler>>,
}

impl fmt::Debug for CommandBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBus")
            .field("command_types", &self.registered_types())
            .finish()
    }
}

impl CommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for `command_type`. A second handler for the same
    /// type is rejected.
    pub fn register(&self, command_type: &str, handler: SharedCommandHandler) -> BusResult<()> {
        let mut handlers = self
            .handlers
            .write()
            .map_err(|_| BusError::Poisoned { operation: "register command handler" })?;
        if handlers.contains_key(command_type) {
            return Err(BusError::HandlerAlreadyRegistered {
                bus: "command",
                message_type: command_type.to_string(),
            });
        }
        handlers.insert(command_type.to_string(), handler);
        log::debug!("Registered command handler for '{}'", command_type);
        Ok(())
    }

    /// Execute a command and return the handler's result
    pub async fn execute(&self, command_type: &str, payload: Value) -> BusResult<Value> {
        let handler = {
            let handlers = self
                .handlers
                .read()
                .map_err(|_| BusError::Poisoned { operation: "execute command" })?;
            handlers.get(command_type).cloned().ok_or_else(|| BusError::NoHandler {
                bus: "command",
                message_type: command_type.to_string(),
            })?
        };
        handler.handle(payload).await
    }

    pub fn has_handler(&self, command_type: &str) -> bool {
        self.handlers
            .read()
            .map(|h| h.contains_key(command_type))
            .unwrap_or(false)
    }

    /// Registered command types, sorted
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .handlers
            .read()
            .map(|h| h.keys().cloned().collect())
            .unwrap_or_default();
        types.sort();
        types
    }
}
