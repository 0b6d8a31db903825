use crate::{
    db_types::{Notification, PayoutRequest, User},
    traits::LedgerError,
};

/// Read access to wallets, payout history and notifications.
#[allow(async_fn_in_trait)]
pub trait WalletManagement: Clone {
    /// Fetches the user (and thus the wallet balance) for the given id, or `None`.
    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, LedgerError>;

    /// Fetches the seller's payout requests, newest first.
    async fn fetch_payouts_for_seller(&self, seller_id: i64) -> Result<Vec<PayoutRequest>, LedgerError>;

    /// Fetches the user's notifications, newest first.
    async fn fetch_notifications_for_user(&self, user_id: i64) -> Result<Vec<Notification>, LedgerError>;
}
