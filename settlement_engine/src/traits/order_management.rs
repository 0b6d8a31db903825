use crate::{
    db_types::{Order, OrderId, OrderItemLine},
    order_objects::OrderQueryFilter,
    traits::LedgerError,
};

/// Read access to orders. Backends implement this alongside [`super::LedgerDatabase`].
#[allow(async_fn_in_trait)]
pub trait OrderManagement: Clone {
    /// Fetches the order with the given id, or `None`.
    async fn fetch_order(&self, oid: OrderId) -> Result<Option<Order>, LedgerError>;

    /// Fetches the order's line items joined with their product names, in insertion order.
    async fn fetch_order_items(&self, oid: OrderId) -> Result<Vec<OrderItemLine>, LedgerError>;

    /// Fetches orders matching the filter, ordered by creation time ascending.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, LedgerError>;
}
