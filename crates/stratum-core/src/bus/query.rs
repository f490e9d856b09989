use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use serde_json::Value;

use crate::bus::{BusError, BusResult, SharedQueryHandler};

/// Routes each query type to exactly one handler
#[derive(Default)]
pub struct QueryBus {
    handlers: RwLock<HashMap<String, SharedQueryHandler>>,
}

impl fmt::Debug for QueryBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBus")
            .field("query_types", &self.registered_types())
            .finish()
    }
}

impl QueryBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, query_type: &str, handler: SharedQueryHandler) -> BusResult<()> {
        let mut handlers = self
            .handlers
            .write()
            .map_err(|_| BusError::Poisoned { operation: "register query handler" })?;
        if handlers.contains_key(query_type) {
            return Err(BusError::HandlerAlreadyRegistered {
                bus: "query",
                message_type: query_type.to_string(),
            });
        }
        handlers.insert(query_type.to_string(), handler);
        log::debug!("Registered query handler for '{}'", query_type);
        Ok(())
    }

    /// Run a query and return the handler's answer
    pub async fn ask(&self, query_type: &str, payload: Value) -> BusResult<Value> {
        let handler = {
            let handlers = self
                .handlers
                .read()
                .map_err(|_| BusError::Poisoned { operation: "ask query" })?;
            handlers.get(query_type).cloned().ok_or_else(|| BusError::NoHandler {
                bus: "query",
                message_type: query_type.to_string(),
            })?
        };
        handler.handle(payload).await
    }

    pub fn has_handler(&self, query_type: &str) -> bool {
        self.handlers
            .read()
            .map(|h| h.contains_key(query_type))
            .unwrap_or(false)
    }

    /// Registered query types, sorted
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
