use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderItemLine, OrderStatus},
    order_objects::OrderQueryFilter,
    traits::{LedgerError, SellerEarning},
};

/// Inserts a new order row in `Pending` status using the given connection. This is not atomic on its own.
/// Embed this call inside a transaction and pass `&mut *tx` as the connection argument to get atomicity with
/// the item insertions and stock decrements.
pub async fn insert_order(order: &NewOrder, conn: &mut SqliteConnection) -> Result<Order, LedgerError> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                customer_name,
                customer_phone,
                region_id,
                address,
                total_amount
            ) VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(&order.customer_name)
    .bind(&order.customer_phone)
    .bind(order.region_id)
    .bind(&order.address)
    .bind(order.total_amount)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order {} inserted", order.id);
    Ok(order)
}

pub async fn insert_order_item(
    order_id: OrderId,
    item: &NewOrderItem,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, LedgerError> {
    let item = sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, product_id, quantity, price)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.quantity)
    .bind(item.price)
    .fetch_one(conn)
    .await?;
    Ok(item)
}

/// Returns the order for the given id, if it exists.
pub async fn fetch_order(oid: OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(oid).fetch_optional(conn).await?;
    Ok(order)
}

/// Returns the order's line items joined with their product names, in insertion order.
pub async fn fetch_order_items(oid: OrderId, conn: &mut SqliteConnection) -> Result<Vec<OrderItemLine>, sqlx::Error> {
    let items = sqlx::query_as(
        r#"
        SELECT
            order_items.id as id,
            order_id,
            product_id,
            products.name as product_name,
            quantity,
            order_items.price as price
        FROM order_items JOIN products ON order_items.product_id = products.id
        WHERE order_id = $1
        ORDER BY order_items.id"#,
    )
    .bind(oid)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

/// Writes `to` over the order's status, guarded by the status the caller read earlier in the same
/// transaction. Returns `None` when zero rows matched, i.e. a concurrent transition got in first.
pub(crate) async fn update_order_status_guarded(
    oid: OrderId,
    from: OrderStatus,
    to: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let result = sqlx::query_as(
        "UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND status = $3 RETURNING *",
    )
    .bind(to)
    .bind(oid)
    .bind(from)
    .fetch_optional(conn)
    .await?;
    Ok(result)
}

/// Each seller's gross take from the order: `sum(price * quantity)` over the items whose product they own.
/// House inventory (products without a seller) is excluded here, so it never reaches settlement.
pub(crate) async fn gross_earnings_by_seller(
    oid: OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<SellerEarning>, sqlx::Error> {
    let rows: Vec<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT
            products.seller_id as seller_id,
            SUM(order_items.price * order_items.quantity) as gross
        FROM order_items JOIN products ON order_items.product_id = products.id
        WHERE order_id = $1 AND products.seller_id IS NOT NULL
        GROUP BY products.seller_id
        ORDER BY products.seller_id"#,
    )
    .bind(oid)
    .fetch_all(conn)
    .await?;
    Ok(rows.into_iter().map(|(seller_id, gross)| SellerEarning { seller_id, amount: gross.into() }).collect())
}

/// Fetches orders according to the criteria specified in the `OrderQueryFilter`.
///
/// Resulting orders are ordered by `created_at` in ascending order.
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        r#"
    SELECT * FROM orders
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(name) = query.customer_name {
        where_clause.push("customer_name LIKE ");
        where_clause.push_bind_unseparated(format!("%{name}%"));
    }
    if let Some(region_id) = query.region_id {
        where_clause.push("region_id = ");
        where_clause.push_bind_unseparated(region_id);
    }
    if query.status.as_ref().map(|s| !s.is_empty()).unwrap_or(false) {
        let mut statuses = vec![];
        query.status.as_ref().unwrap().iter().for_each(|s| {
            statuses.push(format!("'{s}'"));
        });
        let status_clause = statuses.join(",");
        where_clause.push(format!("status IN ({status_clause})"));
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at ASC");

    trace!("📝️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<Order>();
    let orders = query.fetch_all(conn).await?;
    trace!("📝️ Result of search_orders: {:?}", orders.len());
    Ok(orders)
}
