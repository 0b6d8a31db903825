use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::db_types::{Order, OrderId, OrderStatus};

/// Published once per created order, after the creation transaction commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub order: Order,
}

impl OrderCreatedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }

    /// The broadcast topic all new orders land on.
    pub fn topic(&self) -> String {
        "new_order".to_string()
    }

    pub fn payload(&self) -> Value {
        json!({ "id": self.order.id.value(), "status": self.order.status })
    }
}

/// Published once per status transition, after the transition (and any settlement) commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChangedEvent {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

impl OrderStatusChangedEvent {
    pub fn new(order_id: OrderId, status: OrderStatus) -> Self {
        Self { order_id, status }
    }

    /// The per-order broadcast topic; the order id is embedded in the topic name.
    pub fn topic(&self) -> String {
        format!("order_update_{}", self.order_id.value())
    }

    pub fn payload(&self) -> Value {
        json!({ "status": self.status })
    }
}
