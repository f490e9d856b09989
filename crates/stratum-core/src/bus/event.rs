use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use crate::bus::{BusError, BusResult, DomainEvent, SharedEventHandler};

/// Fans published events out to every subscriber of their type
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<HashMap<String, Vec<SharedEventHandler>>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count: usize = self
            .subscribers
            .read()
            .map(|s| s.values().map(Vec::len).sum())
            .unwrap_or(0);
        f.debug_struct("EventBus")
            .field("subscriber_count", &count)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber for `event_type`
    pub fn subscribe(&self, event_type: &str, handler: SharedEventHandler) -> BusResult<()> {
        let mut subscribers = self
            .subscribers
            .write()
            .map_err(|_| BusError::Poisoned { operation: "subscribe" })?;
        subscribers.entry(event_type.to_string()).or_default().push(handler);
        log::debug!("Subscribed event handler to '{}'", event_type);
        Ok(())
    }

    /// Deliver `event` to its subscribers in subscription order. Stops at the
    /// first failing handler. Returns how many handlers were notified.
    pub async fn publish(&self, event: &DomainEvent) -> BusResult<usize> {
        let handlers = {
            let subscribers = self
                .subscribers
                .read()
                .map_err(|_| BusError::Poisoned { operation: "publish" })?;
            subscribers.get(&event.event_type).cloned().unwrap_or_default()
        };

        if handlers.is_empty() {
            log::debug!("No subscribers for event '{}'", event.event_type);
        }

        for handler in &handlers {
            handler.handle(event).await?;
        }
        Ok(handlers.len())
    }

    pub fn subscriber_count(&self, event_type: &str) -> usize {
        self.subscribers
            .read()
            .map(|s| s.get(event_type).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}
