use msp_common::Cents;
use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus, PayoutRequest},
    traits::StatusChange,
};

/// This trait defines the mutating core of a settlement engine backend.
///
/// Every method is one atomic unit of work: it opens a transaction, performs all reads and writes inside it,
/// and either commits everything or nothing. Broadcasting to listeners is NOT part of this trait — the API
/// layer publishes events only after a method here has returned successfully.
#[allow(async_fn_in_trait)]
pub trait LedgerDatabase: Clone {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Takes a new order and, in a single atomic transaction,
    /// * inserts the order row in `Pending` status,
    /// * inserts one order item row per line item,
    /// * decrements each referenced product's stock by the item quantity.
    ///
    /// The stock decrement is conditional: a product with less stock than requested fails the whole call
    /// with [`LedgerError::InsufficientStock`] (oversell is rejected, not backordered), and a missing
    /// product fails it with [`LedgerError::ProductNotFound`]. Either way no order, item or stock change
    /// from this call remains visible.
    ///
    /// The order is validated first: a non-empty item list, positive quantities, non-negative prices, and a
    /// `total_amount` equal to the line item sum.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, LedgerError>;

    /// Changes the status of an order, in a single atomic transaction:
    /// 1. reads the order (else [`LedgerError::OrderNotFound`]),
    /// 2. consults the [`OrderStatus`] transition table (else [`LedgerError::InvalidTransition`]),
    /// 3. writes the new status guarded by the previously read one — a concurrent transition that got in
    ///    between surfaces as [`LedgerError::Conflict`], never as a silent overwrite,
    /// 4. iff the order just landed on `Delivered` from a non-`Delivered` status, settles seller earnings:
    ///    items are grouped by their product's owning seller (house inventory is skipped), each seller's
    ///    gross is netted through their commission rate (10% when no seller profile exists), the net is
    ///    credited to the seller's wallet and one notification row is appended per credited seller.
    ///
    /// The previous-status guard makes settlement exactly-once for the order's lifetime. A repeated request
    /// for `Delivered` on a delivered order succeeds and returns an empty settlement list.
    async fn update_order_status(&self, oid: OrderId, new_status: OrderStatus) -> Result<StatusChange, LedgerError>;

    /// Debits `amount` from the seller's wallet and records a `Pending` payout request, in a single atomic
    /// transaction. The debit is the conditional update "debit iff balance ≥ amount", so two concurrent
    /// requests can never both pass the balance check: the loser fails with
    /// [`LedgerError::InsufficientFunds`] and no state is mutated.
    async fn request_payout(&self, seller_id: i64, amount: Cents, method: &str) -> Result<PayoutRequest, LedgerError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), LedgerError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Invalid request. {0}")]
    Validation(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("The requested product {0} does not exist")]
    ProductNotFound(i64),
    #[error("The requested user {0} does not exist")]
    UserNotFound(i64),
    #[error("Insufficient stock for product {product_id}: requested {requested}, {available} available")]
    InsufficientStock { product_id: i64, requested: i64, available: i64 },
    #[error("Insufficient funds: the wallet balance is {available}")]
    InsufficientFunds { available: Cents },
    #[error("An order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("A concurrent update got there first. {0}")]
    Conflict(String),
    #[error("We have an internal database error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}
