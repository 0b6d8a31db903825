use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use settlement_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    OrderFlowApi,
    PayoutApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
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

const EVENT_BUFFER_SIZE: usize = 32;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, default_event_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// The out-of-the-box broadcast wiring: each committed event is serialized onto its topic and logged.
/// A deployment that pushes to connected clients (websockets etc.) registers its own hooks instead.
/// Either way delivery is best-effort; clients reconstruct state by re-reading the store.
pub fn default_event_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_order_created(|ev| {
            Box::pin(async move {
                info!("📢️ [{}] {}", ev.topic(), ev.payload());
            })
        })
        .on_order_status_changed(|ev| {
            Box::pin(async move {
                info!("📢️ [{}] {}", ev.topic(), ev.payload());
            })
        });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let order_flow_api = OrderFlowApi::new(db.clone(), producers.clone());
        let payout_api = PayoutApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("msp::access_log"))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(order_flow_api))
            .app_data(web::Data::new(payout_api))
            .service(health)
            .service(NewOrderRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(OrdersSearchRoute::<SqliteDatabase>::new())
            .service(RequestPayoutRoute::<SqliteDatabase>::new())
            .service(SellerPayoutsRoute::<SqliteDatabase>::new())
            .service(SellerNotificationsRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
