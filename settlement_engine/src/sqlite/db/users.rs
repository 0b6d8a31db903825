use log::trace;
use msp_common::Cents;
use sqlx::SqliteConnection;

use crate::db_types::{Role, User};

pub async fn fetch_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(user)
}

/// Credits `amount` to the user's wallet. Returns `false` if no such user exists.
pub(crate) async fn credit_wallet(user_id: i64, amount: Cents, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET wallet_balance = wallet_balance + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
    )
    .bind(amount)
    .bind(user_id)
    .execute(conn)
    .await?;
    trace!("🧑️ Credited {amount} to user {user_id}: {} row(s)", result.rows_affected());
    Ok(result.rows_affected() > 0)
}

/// Atomically debits `amount` from the user's wallet, iff the balance covers it. This single conditional
/// statement is the whole overdraft defence: there is no window between a balance check and the debit.
/// Returns `false` when the balance was too low (or the user is missing).
pub(crate) async fn debit_wallet_if_sufficient(
    user_id: i64,
    amount: Cents,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET wallet_balance = wallet_balance - $1, updated_at = CURRENT_TIMESTAMP \
         WHERE id = $2 AND wallet_balance >= $1",
    )
    .bind(amount)
    .bind(user_id)
    .execute(conn)
    .await?;
    trace!("🧑️ Debited {amount} from user {user_id}: {} row(s)", result.rows_affected());
    Ok(result.rows_affected() > 0)
}

/// User provisioning. Registration proper lives outside the engine; this exists for operators and test
/// setup.
pub async fn insert_user(name: &str, role: Role, conn: &mut SqliteConnection) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as(
        r#"
            INSERT INTO users (name, role)
            VALUES ($1, $2)
            RETURNING *;
        "#,
    )
    .bind(name)
    .bind(role)
    .fetch_one(conn)
    .await?;
    Ok(user)
}
