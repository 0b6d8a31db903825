use log::trace;
use msp_common::Cents;
use sqlx::SqliteConnection;

use crate::db_types::Product;

pub async fn fetch_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product =
        sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await?;
    Ok(product)
}

/// Atomically decrements the product's stock by `qty`, iff at least `qty` units are available. Returns
/// `false` when the conditional update matched no row, i.e. the product is missing or has too little stock;
/// the caller distinguishes the two with a follow-up fetch.
pub(crate) async fn decrement_stock(product_id: i64, qty: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock - $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND stock >= $1",
    )
    .bind(qty)
    .bind(product_id)
    .execute(conn)
    .await?;
    trace!("🛒️ Stock decrement of {qty} on product {product_id}: {} row(s)", result.rows_affected());
    Ok(result.rows_affected() > 0)
}

/// Catalog provisioning. Catalog management proper lives outside the engine; this exists for operators and
/// test setup.
pub async fn insert_product(
    seller_id: Option<i64>,
    name: &str,
    price: Cents,
    stock: i64,
    conn: &mut SqliteConnection,
) -> Result<Product, sqlx::Error> {
    let product = sqlx::query_as(
        r#"
            INSERT INTO products (seller_id, name, price, stock)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(seller_id)
    .bind(name)
    .bind(price)
    .bind(stock)
    .fetch_one(conn)
    .await?;
    Ok(product)
}
