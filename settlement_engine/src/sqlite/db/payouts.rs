use msp_common::Cents;
use sqlx::SqliteConnection;

use crate::db_types::PayoutRequest;

/// Records a payout request in `Pending` status. Must run in the same transaction as the wallet debit it
/// accounts for.
pub(crate) async fn insert_payout_request(
    seller_id: i64,
    amount: Cents,
    method: &str,
    conn: &mut SqliteConnection,
) -> Result<PayoutRequest, sqlx::Error> {
    let payout = sqlx::query_as(
        r#"
            INSERT INTO payout_requests (seller_id, amount, method)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(seller_id)
    .bind(amount)
    .bind(method)
    .fetch_one(conn)
    .await?;
    Ok(payout)
}

/// The seller's payout requests, newest first.
pub async fn fetch_payouts_for_seller(
    seller_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<PayoutRequest>, sqlx::Error> {
    let payouts =
        sqlx::query_as("SELECT * FROM payout_requests WHERE seller_id = $1 ORDER BY created_at DESC, id DESC")
            .bind(seller_id)
            .fetch_all(conn)
            .await?;
    Ok(payouts)
}
