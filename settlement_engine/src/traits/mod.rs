//! The backend behaviour contracts for the settlement engine.
//!
//! Backends (currently SQLite) implement these traits; the public API structs in [`crate::api`] only ever
//! talk to a backend through them.
mod data_objects;
mod ledger_database;
mod order_management;
mod wallet_management;

pub use data_objects::{SellerEarning, StatusChange};
pub use ledger_database::{LedgerDatabase, LedgerError};
pub use order_management::OrderManagement;
pub use wallet_management::WalletManagement;
