use std::fmt::Display;

use chrono::{DateTime, Utc};
use msp_common::Cents;
use serde::{Deserialize, Serialize};
use settlement_engine::{
    db_types::{OrderId, OrderStatus},
    order_objects::OrderQueryFilter,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedResponse {
    pub success: bool,
    pub order_id: OrderId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutParams {
    pub seller_id: i64,
    pub amount: Cents,
    pub method: String,
}

/// The order search query string. Flattened to scalars because query strings carry at most one status;
/// richer filtering goes through [`OrderQueryFilter`] directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderSearchParams {
    pub customer_name: Option<String>,
    pub region_id: Option<i64>,
    pub status: Option<OrderStatus>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl From<OrderSearchParams> for OrderQueryFilter {
    fn from(params: OrderSearchParams) -> Self {
        let mut filter = OrderQueryFilter::default();
        if let Some(name) = params.customer_name {
            filter = filter.with_customer_name(name);
        }
        if let Some(region_id) = params.region_id {
            filter = filter.with_region_id(region_id);
        }
        if let Some(status) = params.status {
            filter = filter.with_status(status);
        }
        if let Some(since) = params.since {
            filter = filter.since(since);
        }
        if let Some(until) = params.until {
            filter = filter.until(until);
        }
        filter
    }
}
