//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two MUST go into a
//! separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread
//! will cause the current worker to stop processing new requests. For this reason, any long, non-cpu-bound
//! operation (I/O, database calls, etc.) must be expressed as futures or asynchronous functions; async
//! handlers get executed concurrently by worker threads and thus don't block execution.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use settlement_engine::{
    db_types::{NewOrder, OrderId},
    LedgerDatabase,
    LedgerError,
    OrderFlowApi,
    OrderManagement,
    PayoutApi,
    WalletManagement,
};

use crate::{
    config::ServerConfig,
    data_objects::{JsonResponse, OrderCreatedResponse, OrderSearchParams, PayoutParams, StatusUpdateRequest},
    errors::ServerError,
    helpers::require_admin,
};

// Actix-web cannot handle generics in handlers, so the `HttpServiceFactory` impls are generated with the
// `route!` macro instead.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<B>(core::marker::PhantomData<fn() -> B>);}
        paste::paste! { impl<B> [<$name:camel Route>]<B> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData)
            }
        }}
        paste::paste! { impl<B> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<B>
        where
            B: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<B>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(new_order => Post "/order" impl LedgerDatabase, OrderManagement);
/// Route handler for order submission.
///
/// The order, its line items and the stock decrements commit as one atomic unit in the engine; the
/// `new_order` broadcast follows the commit. Oversold or unknown products reject the whole order.
pub async fn new_order<B>(
    api: web::Data<OrderFlowApi<B>>,
    body: web::Json<NewOrder>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerDatabase + OrderManagement + 'static,
{
    trace!("💻️ Received new order request");
    let order = api.process_new_order(body.into_inner()).await?;
    info!("💻️ Order {} created for {}", order.id, order.total_amount);
    Ok(HttpResponse::Ok().json(OrderCreatedResponse { success: true, order_id: order.id }))
}

route!(order_by_id => Get "/order/{id}" impl LedgerDatabase, OrderManagement);
/// Route handler serving a single order with its line items (joined with product names).
pub async fn order_by_id<B>(
    api: web::Data<OrderFlowApi<B>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerDatabase + OrderManagement + 'static,
{
    let oid = OrderId::from(path.into_inner());
    let detail = api.order_with_items(oid).await?.ok_or(LedgerError::OrderNotFound(oid))?;
    Ok(HttpResponse::Ok().json(detail))
}

route!(update_order_status => Patch "/order/{id}/status" impl LedgerDatabase, OrderManagement);
/// Route handler for status transitions. Admin-only.
///
/// The engine consults the lifecycle transition table and, on the first arrival at `Delivered`, settles
/// seller earnings inside the same transaction. The `order_update_{id}` broadcast follows the commit.
pub async fn update_order_status<B>(
    req: HttpRequest,
    config: web::Data<ServerConfig>,
    api: web::Data<OrderFlowApi<B>>,
    path: web::Path<i64>,
    body: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerDatabase + OrderManagement + 'static,
{
    require_admin(&req, &config)?;
    let oid = OrderId::from(path.into_inner());
    let change = api.set_order_status(oid, body.status).await?;
    info!("💻️ Order {oid} moved from {} to {}", change.previous, change.order.status);
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Order {oid} is now {}", change.order.status))))
}

route!(orders_search => Get "/orders" impl LedgerDatabase, OrderManagement);
/// Route handler for order search. Admin-only.
pub async fn orders_search<B>(
    req: HttpRequest,
    config: web::Data<ServerConfig>,
    api: web::Data<OrderFlowApi<B>>,
    query: web::Query<OrderSearchParams>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerDatabase + OrderManagement + 'static,
{
    require_admin(&req, &config)?;
    let orders = api.search_orders(query.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(orders))
}

//----------------------------------------------   Payouts  ----------------------------------------------------
route!(request_payout => Post "/seller/payout" impl LedgerDatabase, WalletManagement);
/// Route handler for payout requests.
///
/// The wallet debit and the payout record commit as one atomic unit; a balance that does not cover the
/// amount fails the request with no state change.
pub async fn request_payout<B>(
    api: web::Data<PayoutApi<B>>,
    body: web::Json<PayoutParams>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerDatabase + WalletManagement + 'static,
{
    let PayoutParams { seller_id, amount, method } = body.into_inner();
    let payout = api.request_payout(seller_id, amount, &method).await?;
    info!("💻️ Payout request {} of {amount} accepted for seller {seller_id}", payout.id);
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Payout request {} is pending", payout.id))))
}

route!(seller_payouts => Get "/seller/payouts/{seller_id}" impl LedgerDatabase, WalletManagement);
/// Route handler listing a seller's payout requests, newest first.
pub async fn seller_payouts<B>(
    api: web::Data<PayoutApi<B>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerDatabase + WalletManagement + 'static,
{
    let payouts = api.payouts_for_seller(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(payouts))
}

route!(seller_notifications => Get "/seller/notifications/{user_id}" impl LedgerDatabase, WalletManagement);
/// Route handler listing a user's notifications, newest first.
pub async fn seller_notifications<B>(
    api: web::Data<PayoutApi<B>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServerError>
where
    B: LedgerDatabase + WalletManagement + 'static,
{
    let notifications = api.notifications_for_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(notifications))
}
