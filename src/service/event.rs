use std::collections::HashMap;

use log::{error, warn};
use uuid::Uuid;

use crate::db;
use crate::db::event::EventOrganizerRow;
use crate::dto::{EventView, NewEventDto, OrganizerView, UpdateEventDto};
use crate::errors::{db_err, ApiError, FieldError};
use crate::models::{Event, RsvpOutcome};
use crate::service::auth::UserAuthData;
use crate::service::mail::{self, Mailer};
use crate::validation;
use crate::PGPool;

pub async fn create(
    user: &UserAuthData,
    dto: NewEventDto,
    pool: &PGPool,
) -> Result<EventView, ApiError> {
    validation::run(&dto)?;
    let date = validation::parse_event_date(&dto.date).ok_or_else(|| {
        ApiError::Validation(vec![FieldError {
            field: "date".to_string(),
            message: "Date is required and should be valid".to_string(),
        }])
    })?;
    let event = Event {
        id: Uuid::new_v4(),
        title: dto.title,
        description: dto.description,
        date,
        location: dto.location,
        capacity: dto.capacity,
        organizer: user.user_id,
    };
    db::event::create(&event, pool).await?;
    get_by_id(event.id, pool).await
}

pub async fn get_all(pool: &PGPool) -> Result<Vec<EventView>, ApiError> {
    let rows = db::event::get_all_with_organizer(pool).await?;
    let mut attendees: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (event_id, user_id) in db::event::all_attendee_pairs(pool).await? {
        attendees.entry(event_id).or_default().push(user_id);
    }
    Ok(rows
        .into_iter()
        .map(|row| {
            let event_attendees = attendees.remove(&row.id).unwrap_or_default();
            compose_view(row, event_attendees)
        })
        .collect())
}

pub async fn get_by_id(id: Uuid, pool: &PGPool) -> Result<EventView, ApiError> {
    let row = db::event::get_with_organizer(id, pool)
        .await
        .map_err(db_err("Event"))?;
    let attendees = db::event::attendee_ids(id, pool).await?;
    Ok(compose_view(row, attendees))
}

pub async fn update(
    id: Uuid,
    dto: UpdateEventDto,
    user: &UserAuthData,
    pool: &PGPool,
) -> Result<EventView, ApiError> {
    validation::run(&dto)?;
    let event = db::event::get_by_id(id, pool).await.map_err(db_err("Event"))?;
    if event.organizer != user.user_id {
        return Err(ApiError::Forbidden);
    }
    db::event::set_fields(id, dto.into(), pool).await?;
    get_by_id(id, pool).await
}

pub async fn delete(id: Uuid, user: &UserAuthData, pool: &PGPool) -> Result<(), ApiError> {
    let event = db::event::get_by_id(id, pool).await.map_err(db_err("Event"))?;
    if event.organizer != user.user_id {
        return Err(ApiError::Forbidden);
    }
    db::event::delete(id, pool).await?;
    Ok(())
}

/// Appends the caller to the attendee list, capacity permitting, and queues
/// the confirmation mail. Delivery runs after the response; a mail failure
/// never rolls back a persisted RSVP.
pub async fn rsvp(
    event_id: Uuid,
    user: &UserAuthData,
    mailer: &Mailer,
    pool: &PGPool,
) -> Result<(), ApiError> {
    let (event, outcome) = db::event::add_attendee(event_id, user.user_id, pool)
        .await
        .map_err(db_err("Event"))?;
    match outcome {
        RsvpOutcome::AlreadyAttending => Err(ApiError::Conflict(
            "Already RSVP'd to this event".to_string(),
        )),
        RsvpOutcome::Full => Err(ApiError::Conflict("Event is at full capacity".to_string())),
        RsvpOutcome::Confirmed => {
            dispatch_notification(event, user, mailer, pool).await;
            Ok(())
        }
    }
}

async fn dispatch_notification(event: Event, user: &UserAuthData, mailer: &Mailer, pool: &PGPool) {
    let content = mail::notification_body(&event);
    match db::notifications::create(user.user_id, event.id, &content, pool).await {
        Ok(notification_id) => {
            let mailer = mailer.clone();
            let pool = pool.clone();
            let recipient = user.email.clone();
            actix_web::rt::spawn(async move {
                match mailer.send_event_notification(&recipient, &event).await {
                    Ok(()) => {
                        if let Err(err) = db::notifications::mark_sent(&notification_id, &pool).await
                        {
                            error!("failed to mark notification {} sent: {:?}", notification_id, err);
                        }
                    }
                    Err(err) => {
                        error!("mail delivery failed for notification {}: {}", notification_id, err);
                    }
                }
            });
        }
        Err(err) => warn!("failed to write notification outbox row: {:?}", err),
    }
}

fn compose_view(row: EventOrganizerRow, attendees: Vec<Uuid>) -> EventView {
    EventView {
        id: row.id,
        title: row.title,
        description: row.description,
        date: row.date,
        location: row.location,
        capacity: row.capacity,
        organizer: OrganizerView {
            name: row.organizer_name,
            email: row.organizer_email,
        },
        attendees,
    }
}
