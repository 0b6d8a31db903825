use sqlx::SqliteConnection;

use crate::db_types::Notification;

/// Appends a notification record. The engine only ever appends; marking notifications read belongs to the
/// user-facing surface outside this crate.
pub(crate) async fn insert_notification(
    user_id: i64,
    title: &str,
    message: &str,
    conn: &mut SqliteConnection,
) -> Result<Notification, sqlx::Error> {
    let notification = sqlx::query_as(
        r#"
            INSERT INTO notifications (user_id, title, message)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(title)
    .bind(message)
    .fetch_one(conn)
    .await?;
    Ok(notification)
}

/// The user's notifications, newest first.
pub async fn fetch_notifications_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Notification>, sqlx::Error> {
    let notifications =
        sqlx::query_as("SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
            .bind(user_id)
            .fetch_all(conn)
            .await?;
    Ok(notifications)
}
