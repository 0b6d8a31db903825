//! `SqliteDatabase` is a concrete implementation of a settlement engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`]
//! module. Every mutating operation is a single `begin` … `commit` scope; the stock and wallet invariants
//! are carried by conditional single-statement updates inside those scopes, so no interleaving of callers
//! can oversell a product or overdraw a wallet.
use std::fmt::Debug;

use log::*;
use msp_common::{Cents, CommissionRate};
use sqlx::{SqliteConnection, SqlitePool};

use super::db::{db_url, new_pool, notifications, orders, payouts, products, sellers, users};
use crate::{
    db_types::{NewOrder, Notification, Order, OrderId, OrderItemLine, OrderStatus, PayoutRequest, Product, Role, Seller, User},
    order_objects::OrderQueryFilter,
    traits::{LedgerDatabase, LedgerError, OrderManagement, SellerEarning, StatusChange, WalletManagement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl LedgerDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, LedgerError> {
        order.validate().map_err(LedgerError::Validation)?;
        let mut tx = self.pool.begin().await?;
        let new_order = orders::insert_order(&order, &mut tx).await?;
        for item in &order.items {
            if !products::decrement_stock(item.product_id, item.quantity, &mut tx).await? {
                // The conditional decrement matched nothing: either the product is gone or the stock is
                // short. Look once more inside the same transaction to report which, then abort the lot.
                let product = products::fetch_product(item.product_id, &mut tx).await?;
                tx.rollback().await?;
                return Err(match product {
                    Some(p) => LedgerError::InsufficientStock {
                        product_id: item.product_id,
                        requested: item.quantity,
                        available: p.stock,
                    },
                    None => LedgerError::ProductNotFound(item.product_id),
                });
            }
            orders::insert_order_item(new_order.id, item, &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ Order {} saved with {} line item(s) totalling {}", new_order.id, order.items.len(), new_order.total_amount);
        Ok(new_order)
    }

    async fn update_order_status(&self, oid: OrderId, new_status: OrderStatus) -> Result<StatusChange, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order(oid, &mut tx).await?.ok_or(LedgerError::OrderNotFound(oid))?;
        let previous = order.status;
        if !previous.can_transition_to(new_status) {
            return Err(LedgerError::InvalidTransition { from: previous, to: new_status });
        }
        if previous == OrderStatus::Delivered && new_status == OrderStatus::Delivered {
            debug!("🗃️ Order {oid} is already delivered. Nothing to do, and no money moves.");
            tx.commit().await?;
            return Ok(StatusChange { order, previous, settlements: Vec::new() });
        }
        let order = orders::update_order_status_guarded(oid, previous, new_status, &mut tx).await?.ok_or_else(|| {
            LedgerError::Conflict(format!("Order {oid} left {previous} while this transition was in flight"))
        })?;
        let settlements = if new_status == OrderStatus::Delivered {
            settle_delivered_order(&order, &mut tx).await?
        } else {
            Vec::new()
        };
        tx.commit().await?;
        debug!("🗃️ Order {oid} moved from {previous} to {new_status}");
        Ok(StatusChange { order, previous, settlements })
    }

    async fn request_payout(&self, seller_id: i64, amount: Cents, method: &str) -> Result<PayoutRequest, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::Validation(format!("Payout amount must be positive. Got {amount}")));
        }
        let mut tx = self.pool.begin().await?;
        // The debit goes first so the transaction takes its write lock immediately; concurrent payout
        // requests for the same seller queue up on the store's writer lock rather than racing a read.
        if !users::debit_wallet_if_sufficient(seller_id, amount, &mut tx).await? {
            let user = users::fetch_user(seller_id, &mut tx).await?.ok_or(LedgerError::UserNotFound(seller_id))?;
            return Err(LedgerError::InsufficientFunds { available: user.wallet_balance });
        }
        let payout = payouts::insert_payout_request(seller_id, amount, method, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Payout of {amount} via {method} recorded for seller {seller_id}");
        Ok(payout)
    }

    async fn close(&mut self) -> Result<(), LedgerError> {
        self.pool.close().await;
        Ok(())
    }
}

/// Credits each seller's share of a freshly delivered order and appends their notifications. Runs inside
/// the status-transition transaction; the caller has already established that this call is the first
/// arrival at `Delivered`.
async fn settle_delivered_order(order: &Order, conn: &mut SqliteConnection) -> Result<Vec<SellerEarning>, LedgerError> {
    let gross_by_seller = orders::gross_earnings_by_seller(order.id, conn).await?;
    let mut settlements = Vec::with_capacity(gross_by_seller.len());
    for SellerEarning { seller_id, amount: gross } in gross_by_seller {
        let rate = sellers::commission_rate_for(seller_id, conn).await?;
        let net = rate.net_of(gross);
        if !net.is_positive() {
            trace!("🗃️ Seller {seller_id} nets nothing from order {} at {gross} gross", order.id);
            continue;
        }
        if !users::credit_wallet(seller_id, net, conn).await? {
            return Err(LedgerError::DatabaseError(format!(
                "Seller {seller_id} has no user row to credit for order {}",
                order.id
            )));
        }
        let message = format!("You earned {net} from order {}", order.id);
        notifications::insert_notification(seller_id, "Order delivered", &message, conn).await?;
        debug!("🗃️ Credited {net} to seller {seller_id} for order {}", order.id);
        settlements.push(SellerEarning { seller_id, amount: net });
    }
    Ok(settlements)
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order(&self, oid: OrderId) -> Result<Option<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(oid, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_items(&self, oid: OrderId) -> Result<Vec<OrderItemLine>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let items = orders::fetch_order_items(oid, &mut conn).await?;
        Ok(items)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }
}

impl WalletManagement for SqliteDatabase {
    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user(user_id, &mut conn).await?;
        Ok(user)
    }

    async fn fetch_payouts_for_seller(&self, seller_id: i64) -> Result<Vec<PayoutRequest>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let payouts = payouts::fetch_payouts_for_seller(seller_id, &mut conn).await?;
        Ok(payouts)
    }

    async fn fetch_notifications_for_user(&self, user_id: i64) -> Result<Vec<Notification>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let notifications = notifications::fetch_notifications_for_user(user_id, &mut conn).await?;
        Ok(notifications)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from the environment.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // -- Provisioning surface. Registration, catalog edits and onboarding approval are collaborators
    // -- outside this crate; these methods exist for operators and test setup.

    pub async fn create_user(&self, name: &str, role: Role) -> Result<User, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::insert_user(name, role, &mut conn).await?;
        Ok(user)
    }

    pub async fn create_product(
        &self,
        seller_id: Option<i64>,
        name: &str,
        price: Cents,
        stock: i64,
    ) -> Result<Product, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::insert_product(seller_id, name, price, stock, &mut conn).await?;
        Ok(product)
    }

    pub async fn upsert_seller(
        &self,
        user_id: i64,
        commission_rate: CommissionRate,
        approved: bool,
    ) -> Result<Seller, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let seller = sellers::upsert_seller(user_id, commission_rate, approved, &mut conn).await?;
        Ok(seller)
    }

    pub async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(product_id, &mut conn).await?;
        Ok(product)
    }
}
