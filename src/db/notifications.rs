use chrono::Utc;
use uuid::Uuid;

use crate::PGPool;

/// Writes the outbox row for an RSVP confirmation. The mail dispatcher marks
/// it sent once delivery succeeds.
pub async fn create(
    recipient: Uuid,
    event_id: Uuid,
    content: &str,
    pool: &PGPool,
) -> Result<Uuid, sqlx::Error> {
    let notification_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO notifications (id, recipient, event_id, content, creation_dt)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(notification_id)
    .bind(recipient)
    .bind(event_id)
    .bind(content)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(notification_id)
}

pub async fn mark_sent(notification_id: &Uuid, pool: &PGPool) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE notifications SET sending_dt = $1 WHERE id = $2")
        .bind(Utc::now())
        .bind(notification_id)
        .execute(pool)
        .await?;
    Ok(())
}
