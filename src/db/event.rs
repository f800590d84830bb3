use chrono::Utc;
use sqlx::prelude::FromRow;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    dto::EventChanges,
    models::{Event, RsvpOutcome},
    PGPool,
};

const EVENT_COLUMNS: &str = "id, title, description, date, location, capacity, organizer";

/// Event row joined with the organizer fields the views need.
#[derive(Debug, FromRow)]
pub struct EventOrganizerRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: chrono::DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
    pub organizer: Uuid,
    pub organizer_name: String,
    pub organizer_email: String,
}

const JOINED_COLUMNS: &str = "e.id, e.title, e.description, e.date, e.location, e.capacity, \
     e.organizer, u.name AS organizer_name, u.email AS organizer_email";

pub async fn create(event: &Event, pool: &PGPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO events (id, title, description, date, location, capacity, organizer)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(event.id)
    .bind(&event.title)
    .bind(&event.description)
    .bind(event.date)
    .bind(&event.location)
    .bind(event.capacity)
    .bind(event.organizer)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_by_id(id: Uuid, pool: &PGPool) -> Result<Event, sqlx::Error> {
    sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn get_with_organizer(id: Uuid, pool: &PGPool) -> Result<EventOrganizerRow, sqlx::Error> {
    sqlx::query_as::<_, EventOrganizerRow>(&format!(
        "SELECT {JOINED_COLUMNS} FROM events e JOIN users u ON u.id = e.organizer WHERE e.id = $1"
    ))
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn get_all_with_organizer(pool: &PGPool) -> Result<Vec<EventOrganizerRow>, sqlx::Error> {
    sqlx::query_as::<_, EventOrganizerRow>(&format!(
        "SELECT {JOINED_COLUMNS} FROM events e JOIN users u ON u.id = e.organizer"
    ))
    .fetch_all(pool)
    .await
}

pub async fn set_fields(id: Uuid, changes: EventChanges, pool: &PGPool) -> Result<u64, sqlx::Error> {
    if changes.is_empty() {
        return Ok(0);
    }
    let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE events SET ");
    let mut fields = query_builder.separated(", ");
    if let Some(title) = &changes.title {
        fields.push("title = ").push_bind_unseparated(title);
    }
    if let Some(description) = &changes.description {
        fields.push("description = ").push_bind_unseparated(description);
    }
    if let Some(date) = changes.date {
        fields.push("date = ").push_bind_unseparated(date);
    }
    if let Some(location) = &changes.location {
        fields.push("location = ").push_bind_unseparated(location);
    }
    if let Some(capacity) = changes.capacity {
        fields.push("capacity = ").push_bind_unseparated(capacity);
    }
    query_builder.push(" WHERE id = ").push_bind(id);
    let res = query_builder.build().execute(pool).await?;
    Ok(res.rows_affected())
}

pub async fn delete(id: Uuid, pool: &PGPool) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Attendee ids in RSVP order.
pub async fn attendee_ids(event_id: Uuid, pool: &PGPool) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT user_id FROM event_attendees WHERE event_id = $1 ORDER BY rsvp_dt",
    )
    .bind(event_id)
    .fetch_all(pool)
    .await
}

/// All (event_id, user_id) attendee pairs, for composing the list view in one
/// round trip instead of a query per event.
pub async fn all_attendee_pairs(pool: &PGPool) -> Result<Vec<(Uuid, Uuid)>, sqlx::Error> {
    sqlx::query_as::<_, (Uuid, Uuid)>(
        "SELECT event_id, user_id FROM event_attendees ORDER BY rsvp_dt",
    )
    .fetch_all(pool)
    .await
}

/// Appends an attendee inside a transaction that locks the event row, so two
/// concurrent RSVPs cannot both pass the capacity check. Returns `RowNotFound`
/// when the event does not exist.
pub async fn add_attendee(
    event_id: Uuid,
    user_id: Uuid,
    pool: &PGPool,
) -> Result<(Event, RsvpOutcome), sqlx::Error> {
    let mut tx = pool.begin().await?;
    let event = sqlx::query_as::<_, Event>(&format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE"
    ))
    .bind(event_id)
    .fetch_one(&mut *tx)
    .await?;
    let already_attending: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM event_attendees WHERE event_id = $1 AND user_id = $2)",
    )
    .bind(event_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;
    let attendee_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM event_attendees WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&mut *tx)
            .await?;

    let outcome = event.rsvp_decision(already_attending, attendee_count);
    if outcome == RsvpOutcome::Confirmed {
        sqlx::query("INSERT INTO event_attendees (event_id, user_id, rsvp_dt) VALUES ($1, $2, $3)")
            .bind(event_id)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
    }
    Ok((event, outcome))
}
