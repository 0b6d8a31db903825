use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus},
    events::{EventProducers, OrderCreatedEvent, OrderStatusChangedEvent},
    order_objects::{OrderQueryFilter, OrderWithItems},
    traits::{LedgerDatabase, LedgerError, OrderManagement, StatusChange},
};

/// `OrderFlowApi` is the primary API for creating orders and driving them through the status lifecycle,
/// including the delivery settlement.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> OrderFlowApi<B>
where B: LedgerDatabase + OrderManagement
{
    /// Submit a new order.
    ///
    /// The order, its line items and the stock decrements persist as one atomic unit; only once that unit
    /// has committed is the `new_order` event published. A failed order publishes nothing.
    pub async fn process_new_order(&self, order: NewOrder) -> Result<Order, LedgerError> {
        let order = self.db.insert_order(order).await?;
        self.call_order_created_hook(&order).await;
        debug!("🔄️📦️ Order {} processing complete", order.id);
        Ok(order)
    }

    async fn call_order_created_hook(&self, order: &Order) {
        for emitter in &self.producers.order_created_producer {
            trace!("🔄️📦️ Notifying order created hook subscribers");
            let event = OrderCreatedEvent::new(order.clone());
            emitter.publish_event(event).await;
        }
    }

    /// Changes the status of an order.
    ///
    /// Which transitions are accepted is decided by the [`OrderStatus`] transition table; the first arrival
    /// at `Delivered` additionally settles seller earnings inside the same transaction (see
    /// [`LedgerDatabase::update_order_status`]). After the commit, an `order_update_{id}` event is
    /// published with the new status.
    pub async fn set_order_status(&self, oid: OrderId, new_status: OrderStatus) -> Result<StatusChange, LedgerError> {
        let change = self.db.update_order_status(oid, new_status).await?;
        self.call_status_changed_hook(&change).await;
        if !change.settlements.is_empty() {
            debug!(
                "🔄️💰️ Order {oid} settled {} across {} seller(s)",
                change.settled_total(),
                change.settlements.len()
            );
        }
        Ok(change)
    }

    async fn call_status_changed_hook(&self, change: &StatusChange) {
        for emitter in &self.producers.order_status_changed_producer {
            trace!("🔄️📦️ Notifying status changed hook subscribers");
            let event = OrderStatusChangedEvent::new(change.order.id, change.order.status);
            emitter.publish_event(event).await;
        }
    }

    /// Fetches an order together with its line items (joined with product names), or `None`.
    pub async fn order_with_items(&self, oid: OrderId) -> Result<Option<OrderWithItems>, LedgerError> {
        match self.db.fetch_order(oid).await? {
            Some(order) => {
                let items = self.db.fetch_order_items(oid).await?;
                Ok(Some(OrderWithItems { order, items }))
            },
            None => Ok(None),
        }
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, LedgerError> {
        self.db.search_orders(query).await
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
