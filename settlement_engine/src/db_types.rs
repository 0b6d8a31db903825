use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use msp_common::{Cents, CommissionRate};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------       OrderId        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub i64);

impl From<i64> for OrderId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for OrderId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

//--------------------------------------     OrderStatus      ---------------------------------------------------------
/// The closed order lifecycle.
///
/// Legal transitions move forward along Pending → Processing → Shipped → Delivered (skips allowed), or
/// sideways into Cancelled from Pending or Processing. Delivered and Cancelled are terminal. The single
/// carve-out is Delivered → Delivered, which succeeds as a money-neutral no-op so that repeated delivery
/// requests stay idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Newly created; no fulfilment has started.
    Pending,
    /// Accepted and being prepared.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer. Reaching this state settles seller earnings, exactly once.
    Delivered,
    /// Abandoned before shipment. No settlement ever happens.
    Cancelled,
}

impl OrderStatus {
    /// Position in the fulfilment sequence. Cancelled sits outside it.
    fn rank(self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Processing => Some(1),
            OrderStatus::Shipped => Some(2),
            OrderStatus::Delivered => Some(3),
            OrderStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// The transition table. Everything not listed here is rejected outright.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            // Idempotent re-delivery. Succeeds, but moves no money.
            (Delivered, Delivered) => true,
            (Pending | Processing, Cancelled) => true,
            (from, to) => match (from.rank(), to.rank()) {
                (Some(a), Some(b)) => b > a,
                _ => false,
            },
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Processing => write!(f, "Processing"),
            OrderStatus::Shipped => write!(f, "Shipped"),
            OrderStatus::Delivered => write!(f, "Delivered"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid status value: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------    PayoutStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PayoutStatus {
    /// The wallet has been debited; the external transfer has not been confirmed yet.
    Pending,
    /// The external transfer went through.
    Completed,
    /// The request was declined by an operator.
    Rejected,
}

impl Display for PayoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayoutStatus::Pending => write!(f, "Pending"),
            PayoutStatus::Completed => write!(f, "Completed"),
            PayoutStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

impl FromStr for PayoutStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Completed" => Ok(Self::Completed),
            "Rejected" => Ok(Self::Rejected),
            s => Err(ConversionError(format!("Invalid payout status: {s}"))),
        }
    }
}

//--------------------------------------        Role          ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Seller,
    Buyer,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::Seller => write!(f, "Seller"),
            Role::Buyer => write!(f, "Buyer"),
        }
    }
}

//--------------------------------------      Product         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    /// The user that owns this listing. `None` marks house inventory, which never settles.
    pub seller_id: Option<i64>,
    pub name: String,
    pub price: Cents,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_phone: String,
    pub region_id: i64,
    pub address: String,
    pub total_amount: Cents,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------     OrderItem        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price captured at purchase time, decoupled from the live product price.
    pub price: Cents,
}

/// An order item joined with its product's display name, as returned by the order read-back surface.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItemLine {
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub price: Cents,
}

//--------------------------------------      NewOrder        ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    /// Storefront clients submit this field as a bare `id`.
    #[serde(alias = "id")]
    pub product_id: i64,
    pub quantity: i64,
    pub price: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_phone: String,
    pub region_id: i64,
    pub address: String,
    pub items: Vec<NewOrderItem>,
    /// The total the caller computed. Must equal the sum of the line items.
    pub total_amount: Cents,
}

impl NewOrder {
    pub fn items_total(&self) -> Cents {
        self.items.iter().map(|i| i.price * i.quantity).sum()
    }

    /// Request-shape checks that run before any transaction is opened.
    pub fn validate(&self) -> Result<(), String> {
        if self.items.is_empty() {
            return Err("An order must contain at least one item".to_string());
        }
        if let Some(item) = self.items.iter().find(|i| i.quantity <= 0) {
            return Err(format!("Item quantity for product {} must be positive", item.product_id));
        }
        if let Some(item) = self.items.iter().find(|i| i.price < Cents::from(0)) {
            return Err(format!("Item price for product {} may not be negative", item.product_id));
        }
        let expected = self.items_total();
        if self.total_amount != expected {
            return Err(format!(
                "Order total {} does not match the line item total {expected}",
                self.total_amount
            ));
        }
        Ok(())
    }
}

//--------------------------------------        User          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub role: Role,
    /// Withdrawable earnings. Mutated only by delivery settlement (credit) and payout requests (debit).
    pub wallet_balance: Cents,
    pub loyalty_points: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       Seller         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Seller {
    pub id: i64,
    pub user_id: i64,
    pub commission_rate: CommissionRate,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------    PayoutRequest     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PayoutRequest {
    pub id: i64,
    pub seller_id: i64,
    pub amount: Cents,
    pub method: String,
    pub status: PayoutStatus,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------    Notification      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
