//! Endpoint tests against a real throwaway database: each route's success and failure responses, and the
//! admin-key gate on the status-transition and search routes.
use actix_web::{test, web, App};
use marketplace_server::{
    config::ServerConfig,
    routes::{
        health,
        NewOrderRoute,
        OrderByIdRoute,
        OrdersSearchRoute,
        RequestPayoutRoute,
        SellerNotificationsRoute,
        SellerPayoutsRoute,
        UpdateOrderStatusRoute,
    },
};
use msp_common::{Cents, CommissionRate};
use serde_json::json;
use settlement_engine::{
    db_types::{NewOrder, NewOrderItem, OrderStatus, Role},
    events::EventProducers,
    test_utils::prepare_env::{create_database, run_migrations},
    LedgerDatabase,
    OrderFlowApi,
    PayoutApi,
    SqliteDatabase,
    WalletManagement,
};

async fn test_db(dir: &tempfile::TempDir) -> SqliteDatabase {
    let _ = env_logger::try_init();
    let url = format!("sqlite://{}/endpoints.db", dir.path().display());
    create_database(&url).await;
    run_migrations(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

fn test_config() -> ServerConfig {
    ServerConfig { admin_api_key: Some("test-key".to_string()), ..Default::default() }
}

macro_rules! test_app {
    ($db:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(test_config()))
                .app_data(web::Data::new(OrderFlowApi::new($db.clone(), EventProducers::default())))
                .app_data(web::Data::new(PayoutApi::new($db.clone())))
                .service(health)
                .service(NewOrderRoute::<SqliteDatabase>::new())
                .service(OrderByIdRoute::<SqliteDatabase>::new())
                .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
                .service(OrdersSearchRoute::<SqliteDatabase>::new())
                .service(RequestPayoutRoute::<SqliteDatabase>::new())
                .service(SellerPayoutsRoute::<SqliteDatabase>::new())
                .service(SellerNotificationsRoute::<SqliteDatabase>::new()),
        )
        .await
    };
}

/// Seller user with a profile at the given rate; returns the user id.
async fn seed_seller(db: &SqliteDatabase, rate_bps: i64) -> i64 {
    let user = db.create_user("Ada", Role::Seller).await.unwrap();
    let rate = CommissionRate::from_basis_points(rate_bps).unwrap();
    db.upsert_seller(user.id, rate, true).await.unwrap();
    user.id
}

fn order_body(product_id: i64, quantity: i64, price: i64) -> serde_json::Value {
    json!({
        "customer_name": "Grace",
        "customer_phone": "555-0199",
        "region_id": 3,
        "address": "9 Harbour Way",
        // Storefront payloads call the product reference `id`.
        "items": [{ "id": product_id, "quantity": quantity, "price": price }],
        "total_amount": quantity * price,
    })
}

#[actix_web::test]
async fn health_check() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db(&dir).await;
    let app = test_app!(db);
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn posting_an_order_returns_the_new_id() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db(&dir).await;
    let seller = seed_seller(&db, 1_000).await;
    let product = db.create_product(Some(seller), "Walnut desk", Cents::from(45_000), 10).await.unwrap().id;
    let app = test_app!(db);

    let req = test::TestRequest::post().uri("/order").set_json(order_body(product, 2, 45_000)).to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    let order_id = body["order_id"].as_i64().unwrap();

    // Stock was decremented by the creation transaction.
    assert_eq!(db.fetch_product(product).await.unwrap().unwrap().stock, 8);

    // Read-after-write: the served line items reproduce the stored total.
    let req = test::TestRequest::get().uri(&format!("/order/{order_id}")).to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["order"]["total_amount"], json!(90_000));
    assert_eq!(body["items"][0]["product_name"], json!("Walnut desk"));
    assert_eq!(body["items"][0]["quantity"], json!(2));
}

#[actix_web::test]
async fn missing_orders_return_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db(&dir).await;
    let app = test_app!(db);
    let req = test::TestRequest::get().uri("/order/999").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
}

#[actix_web::test]
async fn malformed_orders_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db(&dir).await;
    let app = test_app!(db);

    let body = json!({
        "customer_name": "Grace",
        "customer_phone": "555-0199",
        "region_id": 3,
        "address": "9 Harbour Way",
        "items": [],
        "total_amount": 0,
    });
    let req = test::TestRequest::post().uri("/order").set_json(body).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn oversold_orders_are_rejected_with_a_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db(&dir).await;
    let seller = seed_seller(&db, 1_000).await;
    let product = db.create_product(Some(seller), "Walnut desk", Cents::from(45_000), 1).await.unwrap().id;
    let app = test_app!(db);

    let req = test::TestRequest::post().uri("/order").set_json(order_body(product, 2, 45_000)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 409);
    assert_eq!(db.fetch_product(product).await.unwrap().unwrap().stock, 1);
}

#[actix_web::test]
async fn status_updates_require_the_admin_key() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db(&dir).await;
    let seller = seed_seller(&db, 1_000).await;
    let product = db.create_product(Some(seller), "Walnut desk", Cents::from(1_000), 10).await.unwrap().id;
    let order = db
        .insert_order(NewOrder {
            customer_name: "Grace".to_string(),
            customer_phone: "555-0199".to_string(),
            region_id: 3,
            address: "9 Harbour Way".to_string(),
            items: vec![NewOrderItem { product_id: product, quantity: 2, price: Cents::from(1_000) }],
            total_amount: Cents::from(2_000),
        })
        .await
        .unwrap();
    let app = test_app!(db);
    let uri = format!("/order/{}/status", order.id.value());

    // No key, then a wrong key: both refused, nothing settles.
    let req = test::TestRequest::patch().uri(&uri).set_json(json!({ "status": "Delivered" })).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 401);
    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(("x-api-key", "wrong"))
        .set_json(json!({ "status": "Delivered" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 401);
    assert_eq!(db.fetch_user(seller).await.unwrap().unwrap().wallet_balance, Cents::from(0));

    // With the key the transition lands and delivery settles: 2 x 1000 at 10% nets 1800.
    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(("x-api-key", "test-key"))
        .set_json(json!({ "status": "Delivered" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(db.fetch_user(seller).await.unwrap().unwrap().wallet_balance, Cents::from(1_800));
}

#[actix_web::test]
async fn illegal_transitions_return_a_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db(&dir).await;
    let seller = seed_seller(&db, 1_000).await;
    let product = db.create_product(Some(seller), "Walnut desk", Cents::from(1_000), 10).await.unwrap().id;
    let order = db
        .insert_order(NewOrder {
            customer_name: "Grace".to_string(),
            customer_phone: "555-0199".to_string(),
            region_id: 3,
            address: "9 Harbour Way".to_string(),
            items: vec![NewOrderItem { product_id: product, quantity: 1, price: Cents::from(1_000) }],
            total_amount: Cents::from(1_000),
        })
        .await
        .unwrap();
    db.update_order_status(order.id, OrderStatus::Delivered).await.unwrap();
    let app = test_app!(db);

    let req = test::TestRequest::patch()
        .uri(&format!("/order/{}/status", order.id.value()))
        .insert_header(("x-api-key", "test-key"))
        .set_json(json!({ "status": "Pending" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 409);
}

#[actix_web::test]
async fn payouts_debit_the_wallet_or_fail_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db(&dir).await;
    // Zero commission so the delivered order funds the wallet with the full 300.
    let seller = seed_seller(&db, 0).await;
    let product = db.create_product(Some(seller), "Walnut desk", Cents::from(300), 1).await.unwrap().id;
    let order = db
        .insert_order(NewOrder {
            customer_name: "Grace".to_string(),
            customer_phone: "555-0199".to_string(),
            region_id: 3,
            address: "9 Harbour Way".to_string(),
            items: vec![NewOrderItem { product_id: product, quantity: 1, price: Cents::from(300) }],
            total_amount: Cents::from(300),
        })
        .await
        .unwrap();
    db.update_order_status(order.id, OrderStatus::Delivered).await.unwrap();
    let app = test_app!(db);

    // 500 against a 300 balance fails with no state change.
    let body = json!({ "seller_id": seller, "amount": 500, "method": "bank_transfer" });
    let req = test::TestRequest::post().uri("/seller/payout").set_json(body).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("Insufficient funds"), "got {body}");
    assert_eq!(db.fetch_user(seller).await.unwrap().unwrap().wallet_balance, Cents::from(300));

    // 200 goes through and shows up in the newest-first listing.
    let body = json!({ "seller_id": seller, "amount": 200, "method": "bank_transfer" });
    let req = test::TestRequest::post().uri("/seller/payout").set_json(body).to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(db.fetch_user(seller).await.unwrap().unwrap().wallet_balance, Cents::from(100));

    let req = test::TestRequest::get().uri(&format!("/seller/payouts/{seller}")).to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["amount"], json!(200));
    assert_eq!(body[0]["status"], json!("Pending"));
}

#[actix_web::test]
async fn delivery_notifications_are_served_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db(&dir).await;
    let seller = seed_seller(&db, 1_000).await;
    let product = db.create_product(Some(seller), "Walnut desk", Cents::from(1_000), 10).await.unwrap().id;
    let order = db
        .insert_order(NewOrder {
            customer_name: "Grace".to_string(),
            customer_phone: "555-0199".to_string(),
            region_id: 3,
            address: "9 Harbour Way".to_string(),
            items: vec![NewOrderItem { product_id: product, quantity: 2, price: Cents::from(1_000) }],
            total_amount: Cents::from(2_000),
        })
        .await
        .unwrap();
    db.update_order_status(order.id, OrderStatus::Delivered).await.unwrap();
    let app = test_app!(db);

    let req = test::TestRequest::get().uri(&format!("/seller/notifications/{seller}")).to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert!(body[0]["message"].as_str().unwrap().contains("18.00"), "got {body}");
}

#[actix_web::test]
async fn order_search_is_admin_only() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db(&dir).await;
    let seller = seed_seller(&db, 1_000).await;
    let product = db.create_product(Some(seller), "Walnut desk", Cents::from(1_000), 10).await.unwrap().id;
    db.insert_order(NewOrder {
        customer_name: "Grace".to_string(),
        customer_phone: "555-0199".to_string(),
        region_id: 3,
        address: "9 Harbour Way".to_string(),
        items: vec![NewOrderItem { product_id: product, quantity: 1, price: Cents::from(1_000) }],
        total_amount: Cents::from(1_000),
    })
    .await
    .unwrap();
    let app = test_app!(db);

    let req = test::TestRequest::get().uri("/orders?status=Pending").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 401);

    let req = test::TestRequest::get()
        .uri("/orders?status=Pending")
        .insert_header(("x-api-key", "test-key"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}
