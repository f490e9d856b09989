#![cfg(test)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::bus::{
    BusError, BusResult, CommandBus, CommandHandler, DomainEvent, EventBus, EventHandler, QueryBus,
    QueryHandler,
};

struct EchoHandler;

#[async_trait]
impl CommandHandler for EchoHandler {
    async fn handle(&self, payload: Value) -> BusResult<Value> {
        Ok(json!({ "echo": payload }))
    }
}

#[async_trait]
impl QueryHandler for EchoHandler {
    async fn handle(&self, payload: Value) -> BusResult<Value> {
        Ok(payload)
    }
}

struct RecordingSubscriber {
    label: &'static str,
    log: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

#[async_trait]
impl EventHandler for RecordingSubscriber {
    async fn handle(&self, event: &DomainEvent) -> BusResult<()> {
        self.log.lock().unwrap().push(format!("{}:{}", self.label, event.event_type));
        if self.fail {
            return Err(BusError::handler_failed(&event.event_type, "subscriber failed"));
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_command_bus_dispatches_to_registered_handler() {
    let bus = CommandBus::new();
    bus.register("CreateThing", Arc::new(EchoHandler)).unwrap();

    let result = bus.execute("CreateThing", json!({"id": 1})).await.unwrap();
    assert_eq!(result, json!({"echo": {"id": 1}}));
    assert!(bus.has_handler("CreateThing"));
}

#[tokio::test]
async fn test_command_bus_rejects_second_handler() {
    let bus = CommandBus::new();
    bus.register("CreateThing", Arc::new(EchoHandler)).unwrap();

    let err = bus.register("CreateThing", Arc::new(EchoHandler)).unwrap_err();
    assert!(matches!(err, BusError::HandlerAlreadyRegistered { bus: "command", .. }));
}

#[tokio::test]
async fn test_command_bus_unknown_type() {
    let bus = CommandBus::new();
    let err = bus.execute("Nope", Value::Null).await.unwrap_err();
    assert!(matches!(err, BusError::NoHandler { ref message_type, .. } if message_type == "Nope"));
}

#[tokio::test]
async fn test_query_bus_round_trip() {
    let bus = QueryBus::new();
    bus.register("GetThing", Arc::new(EchoHandler)).unwrap();

    assert_eq!(bus.ask("GetThing", json!("x")).await.unwrap(), json!("x"));
    assert_eq!(bus.registered_types(), vec!["GetThing".to_string()]);
    assert!(bus.ask("Other", Value::Null).await.is_err());
}

#[tokio::test]
async fn test_event_bus_notifies_subscribers_in_order() {
    let bus = EventBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    for label in ["first", "second"] {
        bus.subscribe(
            "ThingCreated",
            Arc::new(RecordingSubscriber { label, log: log.clone(), fail: false }),
        )
        .unwrap();
    }

    let notified = bus.publish(&DomainEvent::new("ThingCreated", json!({}))).await.unwrap();
    assert_eq!(notified, 2);
    assert_eq!(*log.lock().unwrap(), vec!["first:ThingCreated", "second:ThingCreated"]);
    assert_eq!(bus.subscriber_count("ThingCreated"), 2);
}

#[tokio::test]
async fn test_event_bus_stops_at_failing_subscriber() {
    let bus = EventBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    bus.subscribe("E", Arc::new(RecordingSubscriber { label: "a", log: log.clone(), fail: true }))
        .unwrap();
    bus.subscribe("E", Arc::new(RecordingSubscriber { label: "b", log: log.clone(), fail: false }))
        .unwrap();

    assert!(bus.publish(&DomainEvent::new("E", Value::Null)).await.is_err());
    assert_eq!(*log.lock().unwrap(), vec!["a:E"]);
}

#[tokio::test]
async fn test_event_bus_without_subscribers() {
    let bus = EventBus::new();
    let notified = bus.publish(&DomainEvent::new("Nobody", Value::Null)).await.unwrap();
    assert_eq!(notified, 0);
}

#[test]
fn test_dispatch_from_sync_code() {
    let bus = QueryBus::new();
    bus.register("Lookup", Arc::new(EchoHandler)).unwrap();
    assert_eq!(bus.registered_types(), vec!["Lookup"]);

    let answer = futures::executor::block_on(bus.ask("Lookup", json!("key"))).unwrap();
    assert_eq!(answer, json!("key"));
}
