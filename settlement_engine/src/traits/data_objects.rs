use msp_common::Cents;
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatus};

/// One seller's credit from a delivery settlement: the net of the seller's items in the order, after
/// commission and a single rounding step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerEarning {
    pub seller_id: i64,
    pub amount: Cents,
}

/// The result of a status transition. `settlements` is non-empty only when this call was the one that moved
/// the order into Delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub order: Order,
    pub previous: OrderStatus,
    pub settlements: Vec<SellerEarning>,
}

impl StatusChange {
    pub fn settled_total(&self) -> Cents {
        self.settlements.iter().map(|s| s.amount).sum()
    }
}
