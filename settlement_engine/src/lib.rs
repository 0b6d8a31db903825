//! Marketplace Settlement Engine
//!
//! The settlement engine owns the marketplace ledger: orders and their line items, product stock, seller
//! wallets, payout requests and seller notifications. It is the only component that mutates money or stock,
//! and every mutation it performs is a single atomic transaction against the backing store.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never
//!    need to access the database directly; use the public API instead. The exception is the data types used
//!    in the database, which are defined in the `db_types` module and are public.
//! 2. The engine public API ([`mod@api`]). [`OrderFlowApi`] drives order creation and the status lifecycle
//!    (including delivery settlement), and [`PayoutApi`] drives wallet withdrawals. Backends implement the
//!    traits in [`mod@traits`] to plug in underneath these APIs.
//! 3. The event hooks ([`mod@events`]). After a transaction commits, the APIs publish best-effort events
//!    (`new_order`, `order_update_{id}`) that subscribers can fan out to connected clients. Events are a
//!    notification hint, never the source of truth.
mod api;

pub mod db_types;
pub mod events;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(all(feature = "sqlite", any(feature = "test_utils", test)))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use api::{order_flow_api::OrderFlowApi, order_objects, payout_api::PayoutApi};
pub use traits::{LedgerDatabase, LedgerError, OrderManagement, StatusChange, WalletManagement};
