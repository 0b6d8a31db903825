use std::fmt::Debug;

use log::*;
use msp_common::Cents;

use crate::{
    db_types::{Notification, PayoutRequest},
    traits::{LedgerDatabase, LedgerError, WalletManagement},
};

/// `PayoutApi` drives wallet withdrawals and the read side of wallets, payout history and notifications.
pub struct PayoutApi<B> {
    db: B,
}

impl<B> Debug for PayoutApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PayoutApi")
    }
}

impl<B> PayoutApi<B>
where B: LedgerDatabase + WalletManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Requests a payout: debits the seller's wallet and records a `Pending` payout request as one atomic
    /// unit. The debit is conditional on the balance covering the amount, so concurrent requests cannot
    /// jointly overdraw (see [`LedgerDatabase::request_payout`]).
    pub async fn request_payout(&self, seller_id: i64, amount: Cents, method: &str) -> Result<PayoutRequest, LedgerError> {
        let payout = self.db.request_payout(seller_id, amount, method).await?;
        debug!("🔄️💰️ Payout request {} of {amount} accepted for seller {seller_id}", payout.id);
        Ok(payout)
    }

    /// The seller's payout requests, newest first.
    pub async fn payouts_for_seller(&self, seller_id: i64) -> Result<Vec<PayoutRequest>, LedgerError> {
        self.db.fetch_payouts_for_seller(seller_id).await
    }

    /// The user's current wallet balance, or `None` if the user does not exist.
    pub async fn wallet_balance(&self, user_id: i64) -> Result<Option<Cents>, LedgerError> {
        let user = self.db.fetch_user(user_id).await?;
        Ok(user.map(|u| u.wallet_balance))
    }

    /// The user's notifications, newest first.
    pub async fn notifications_for_user(&self, user_id: i64) -> Result<Vec<Notification>, LedgerError> {
        self.db.fetch_notifications_for_user(user_id).await
    }
}
