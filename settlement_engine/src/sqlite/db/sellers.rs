use msp_common::CommissionRate;
use sqlx::SqliteConnection;

use crate::db_types::Seller;

pub async fn fetch_seller_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<Seller>, sqlx::Error> {
    let seller =
        sqlx::query_as("SELECT * FROM sellers WHERE user_id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(seller)
}

/// The commission rate for the given seller, falling back to [`CommissionRate::DEFAULT`] when the product's
/// owner has no seller profile row.
pub(crate) async fn commission_rate_for(user_id: i64, conn: &mut SqliteConnection) -> Result<CommissionRate, sqlx::Error> {
    let rate: Option<(CommissionRate,)> =
        sqlx::query_as("SELECT commission_rate FROM sellers WHERE user_id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(rate.map(|(r,)| r).unwrap_or_default())
}

/// Seller profile provisioning. Onboarding approval lives outside the engine; this exists for operators and
/// test setup.
pub async fn upsert_seller(
    user_id: i64,
    commission_rate: CommissionRate,
    approved: bool,
    conn: &mut SqliteConnection,
) -> Result<Seller, sqlx::Error> {
    let seller = sqlx::query_as(
        r#"
            INSERT INTO sellers (user_id, commission_rate, approved)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
                SET commission_rate = excluded.commission_rate,
                    approved = excluded.approved,
                    updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(commission_rate)
    .bind(approved)
    .fetch_one(conn)
    .await?;
    Ok(seller)
}
