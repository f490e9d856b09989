//! # Orders Context
//!
//! Example bounded context wired through [`BaseContextModule`]. It keeps
//! orders in an in-memory repository and exposes:
//!
//! | Kind    | Type              | Payload                              |
//! |---------|-------------------|--------------------------------------|
//! | command | `orders.create`   | `{"customer": "...", "items": [...]}`|
//! | command | `orders.cancel`   | `{"id": 1}`                          |
//! | query   | `orders.get`      | `{"id": 1}`                          |
//! | query   | `orders.list`     | anything                             |
//! | event   | `orders.created`  | the created order                    |
//!
//! [`BaseContextModule`]: stratum_core::plugin_system::BaseContextModule
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use stratum_core::bus::{
    BusError, BusResult, CommandHandler, DomainEvent, EventBus, EventHandler, QueryHandler,
};
use stratum_core::container::{Container, Instance};
use stratum_core::kernel::constants::EVENT_BUS_TOKEN;
use stratum_core::kernel::error::Result as KernelResult;
use stratum_core::plugin_system::{
    CommandDefinition, ContextModule, EventHandlerDefinition, HealthStatus, PluginMetadata,
    QueryDefinition, RepositoryDefinition,
};

pub const CONTEXT_NAME: &str = "orders";
pub const PLUGIN_NAME: &str = "orders-context";

pub const ORDER_REPOSITORY: &str = "orders.repository";
pub const ORDER_STATS: &str = "orders.stats";

pub const CREATE_ORDER: &str = "orders.create";
pub const CANCEL_ORDER: &str = "orders.cancel";
pub const GET_ORDER: &str = "orders.get";
pub const LIST_ORDERS: &str = "orders.list";
pub const ORDER_CREATED: &str = "orders.created";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Placed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub sku: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub customer: String,
    pub items: Vec<OrderLine>,
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
struct CreateOrder {
    customer: String,
    #[serde(default)]
    items: Vec<OrderLine>,
}

#[derive(Debug, Deserialize)]
struct OrderId {
    id: u64,
}

/// In-memory order storage shared by the context's handlers
#[derive(Debug, Default)]
pub struct OrderRepository {
    orders: RwLock<BTreeMap<u64, Order>>,
    next_id: AtomicU64,
}

impl OrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, customer: String, items: Vec<OrderLine>) -> BusResult<Order> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let order = Order { id, customer, items, status: OrderStatus::Placed };
        self.orders
            .write()
            .map_err(|_| BusError::Poisoned { operation: "insert order" })?
            .insert(id, order.clone());
        Ok(order)
    }

    pub fn get(&self, id: u64) -> Option<Order> {
        self.orders.read().ok().and_then(|orders| orders.get(&id).cloned())
    }

    /// All orders, by id
    pub fn list(&self) -> Vec<Order> {
        self.orders
            .read()
            .map(|orders| orders.values().cloned().collect())
            .unwrap_or_default()
    }

    fn set_status(&self, id: u64, status: OrderStatus) -> BusResult<Option<Order>> {
        let mut orders = self
            .orders
            .write()
            .map_err(|_| BusError::Poisoned { operation: "update order" })?;
        Ok(orders.get_mut(&id).map(|order| {
            order.status = status;
            order.clone()
        }))
    }

    pub fn len(&self) -> usize {
        self.orders.read().map(|orders| orders.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Counters maintained from domain events
#[derive(Debug, Default)]
pub struct OrderStats {
    created: AtomicUsize,
}

impl OrderStats {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

fn parse<T: for<'de> Deserialize<'de>>(message_type: &str, payload: Value) -> BusResult<T> {
    serde_json::from_value(payload).map_err(|e| BusError::invalid_payload(message_type, e))
}

fn to_value<T: Serialize>(message_type: &str, value: &T) -> BusResult<Value> {
    serde_json::to_value(value).map_err(|e| BusError::invalid_payload(message_type, e))
}

struct CreateOrderHandler {
    repository: Arc<OrderRepository>,
    events: Arc<EventBus>,
}

#[async_trait]
impl CommandHandler for CreateOrderHandler {
    async fn handle(&self, payload: Value) -> BusResult<Value> {
        let command: CreateOrder = parse(CREATE_ORDER, payload)?;
        if command.customer.trim().is_empty() {
            return Err(BusError::handler_failed(CREATE_ORDER, "customer must not be empty"));
        }
        if command.items.iter().any(|line| line.quantity == 0) {
            return Err(BusError::handler_failed(CREATE_ORDER, "item quantity must be positive"));
        }

        let order = self.repository.insert(command.customer, command.items)?;
        debug!("Order {} placed for '{}'", order.id, order.customer);

        let created = to_value(CREATE_ORDER, &order)?;
        self.events
            .publish(&DomainEvent::new(ORDER_CREATED, created.clone()))
            .await?;
        Ok(created)
    }
}

struct CancelOrderHandler {
    repository: Arc<OrderRepository>,
}

#[async_trait]
impl CommandHandler for CancelOrderHandler {
    async fn handle(&self, payload: Value) -> BusResult<Value> {
        let OrderId { id } = parse(CANCEL_ORDER, payload)?;
        match self.repository.set_status(id, OrderStatus::Cancelled)? {
            Some(order) => to_value(CANCEL_ORDER, &order),
            None => Err(BusError::handler_failed(CANCEL_ORDER, format!("order {} not found", id))),
        }
    }
}

struct GetOrderHandler {
    repository: Arc<OrderRepository>,
}

#[async_trait]
impl QueryHandler for GetOrderHandler {
    async fn handle(&self, payload: Value) -> BusResult<Value> {
        let OrderId { id } = parse(GET_ORDER, payload)?;
        match self.repository.get(id) {
            Some(order) => to_value(GET_ORDER, &order),
            None => Ok(Value::Null),
        }
    }
}

struct ListOrdersHandler {
    repository: Arc<OrderRepository>,
}

#[async_trait]
impl QueryHandler for ListOrdersHandler {
    async fn handle(&self, _payload: Value) -> BusResult<Value> {
        to_value(LIST_ORDERS, &self.repository.list())
    }
}

struct CountCreatedOrders {
    stats: Arc<OrderStats>,
}

#[async_trait]
impl EventHandler for CountCreatedOrders {
    async fn handle(&self, event: &DomainEvent) -> BusResult<()> {
        let total = self.stats.created.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("{} received; {} orders created so far", event.event_type, total);
        Ok(())
    }
}

/// The orders bounded context. Register it with
/// `Application::register_context_module`.
pub struct OrdersModule {
    metadata: PluginMetadata,
    repository: Arc<OrderRepository>,
}

impl Default for OrdersModule {
    fn default() -> Self {
        Self {
            metadata: PluginMetadata::new(PLUGIN_NAME, env!("CARGO_PKG_VERSION"))
                .with_description("Order placement and lookup")
                .with_dependencies(["core-logging"]),
            repository: Arc::new(OrderRepository::new()),
        }
    }
}

impl OrdersModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repository(&self) -> &Arc<OrderRepository> {
        &self.repository
    }
}

#[async_trait]
impl ContextModule for OrdersModule {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn context_name(&self) -> &str {
        CONTEXT_NAME
    }

    fn repositories(&self) -> Vec<RepositoryDefinition> {
        vec![
            RepositoryDefinition::instance(ORDER_REPOSITORY, self.repository.clone()),
            RepositoryDefinition::factory(ORDER_STATS, |_: &Container| {
                let stats: Instance = Arc::new(OrderStats::default());
                Ok(stats)
            }),
        ]
    }

    fn commands(&self, container: &Container) -> KernelResult<Vec<CommandDefinition>> {
        let repository = container.resolve::<OrderRepository>(ORDER_REPOSITORY)?;
        let events = container.resolve::<EventBus>(EVENT_BUS_TOKEN)?;
        Ok(vec![
            CommandDefinition::new(
                "CreateOrder",
                CREATE_ORDER,
                Arc::new(CreateOrderHandler { repository: repository.clone(), events }),
            ),
            CommandDefinition::new(
                "CancelOrder",
                CANCEL_ORDER,
                Arc::new(CancelOrderHandler { repository }),
            ),
        ])
    }

    fn queries(&self, container: &Container) -> KernelResult<Vec<QueryDefinition>> {
        let repository = container.resolve::<OrderRepository>(ORDER_REPOSITORY)?;
        Ok(vec![
            QueryDefinition::new(
                "GetOrder",
                GET_ORDER,
                Arc::new(GetOrderHandler { repository: repository.clone() }),
            ),
            QueryDefinition::new(
                "ListOrders",
                LIST_ORDERS,
                Arc::new(ListOrdersHandler { repository }),
            ),
        ])
    }

    fn event_handlers(&self, container: &Container) -> KernelResult<Vec<EventHandlerDefinition>> {
        let stats = container.resolve::<OrderStats>(ORDER_STATS)?;
        Ok(vec![EventHandlerDefinition::new(
            "CountCreatedOrders",
            ORDER_CREATED,
            Arc::new(CountCreatedOrders { stats }),
        )])
    }

    async fn start(&self) -> KernelResult<()> {
        info!("Orders context started with {} stored orders", self.repository.len());
        Ok(())
    }

    async fn stop(&self) -> KernelResult<()> {
        info!("Orders context stopped ({} orders in memory)", self.repository.len());
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        match self.repository.orders.read() {
            Ok(_) => HealthStatus::healthy(),
            Err(_) => HealthStatus::unhealthy("order repository lock poisoned"),
        }
    }
}

/// Payload for `orders.create`, for callers that do not want to build JSON by hand
pub fn create_order_payload(customer: &str, items: &[(&str, u32)]) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|(sku, quantity)| json!({ "sku": sku, "quantity": quantity }))
        .collect();
    json!({ "customer": customer, "items": items })
}
