//! Shared setup for the engine integration tests: throwaway SQLite databases and ledger seeding.
#![allow(dead_code)]

use std::{env, path::Path};

use log::*;
use msp_common::{Cents, CommissionRate};
use settlement_engine::{
    db_types::{NewOrder, NewOrderItem, OrderStatus, Role},
    LedgerDatabase,
    SqliteDatabase,
};
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite};

pub async fn new_test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

pub fn random_db_path() -> String {
    format!("sqlite://{}/msp_test_{}.db", env::temp_dir().display(), rand::random::<u64>())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    migrate!("./src/sqlite/migrations").run(db.pool()).await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
}

pub async fn create_database<P: AsRef<Path>>(path: P) {
    let p = path.as_ref().as_os_str().to_str().unwrap();
    if let Err(e) = Sqlite::drop_database(p).await {
        warn!("Error dropping database {p}: {e:?}");
    }
    Sqlite::create_database(p).await.expect("Error creating database");
    info!("Created Sqlite database {p}");
}

/// Creates a seller user with a profile at the given commission rate and returns the user id.
pub async fn seed_seller(db: &SqliteDatabase, name: &str, rate_bps: i64) -> i64 {
    let user = db.create_user(name, Role::Seller).await.expect("Error creating user");
    let rate = CommissionRate::from_basis_points(rate_bps).expect("Invalid commission rate");
    db.upsert_seller(user.id, rate, true).await.expect("Error creating seller profile");
    user.id
}

pub async fn seed_product(db: &SqliteDatabase, seller_id: Option<i64>, name: &str, price: i64, stock: i64) -> i64 {
    let product =
        db.create_product(seller_id, name, Cents::from(price), stock).await.expect("Error creating product");
    product.id
}

pub fn line(product_id: i64, quantity: i64, price: i64) -> NewOrderItem {
    NewOrderItem { product_id, quantity, price: Cents::from(price) }
}

/// A well-formed order for the given line items, with the total computed from them.
pub fn order_for(items: Vec<NewOrderItem>) -> NewOrder {
    let total_amount = items.iter().map(|i| i.price * i.quantity).sum();
    NewOrder {
        customer_name: "Grace".to_string(),
        customer_phone: "555-0199".to_string(),
        region_id: 3,
        address: "9 Harbour Way".to_string(),
        items,
        total_amount,
    }
}

/// Puts `amount` into the user's wallet by delivering a zero-commission order for a dedicated product.
/// Overwrites the user's seller profile with a 0% rate, so fund before configuring the rate under test.
pub async fn fund_wallet(db: &SqliteDatabase, user_id: i64, amount: i64) {
    let zero = CommissionRate::from_basis_points(0).expect("Invalid commission rate");
    db.upsert_seller(user_id, zero, true).await.expect("Error creating seller profile");
    let product_id = seed_product(db, Some(user_id), "Wallet funding", amount, 1).await;
    let order = db.insert_order(order_for(vec![line(product_id, 1, amount)])).await.expect("Error creating order");
    db.update_order_status(order.id, OrderStatus::Delivered).await.expect("Error delivering order");
}
