use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Role, User};
use crate::validation;

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct RegisterDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Please enter a password with 6 or more characters"))]
    pub password: String,
    #[validate(custom(
        function = crate::validation::validate_role,
        message = "Role must be either organizer or attendee"
    ))]
    pub role: String,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct LoginDto {
    #[validate(email(message = "Please include a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshDto {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct NewEventDto {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(custom(
        function = crate::validation::validate_event_date,
        message = "Date is required and should be valid"
    ))]
    pub date: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[validate(range(min = 1, message = "Capacity should be a positive number"))]
    pub capacity: i32,
}

/// Partial event update. There is deliberately no organizer field here, so the
/// owning organizer can never be reassigned through the API.
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct UpdateEventDto {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: Option<String>,
    #[validate(custom(
        function = crate::validation::validate_event_date,
        message = "Date is required and should be valid"
    ))]
    pub date: Option<String>,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: Option<String>,
    #[validate(range(min = 1, message = "Capacity should be a positive number"))]
    pub capacity: Option<i32>,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(email(message = "Please include a valid email"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Please enter a password with 6 or more characters"))]
    pub password: Option<String>,
}

/// Typed field set handed to the query builder for partial event updates.
#[derive(Debug, Clone, Default)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
}

impl EventChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.location.is_none()
            && self.capacity.is_none()
    }
}

impl From<UpdateEventDto> for EventChanges {
    fn from(dto: UpdateEventDto) -> Self {
        EventChanges {
            title: dto.title,
            description: dto.description,
            date: dto.date.as_deref().and_then(validation::parse_event_date),
            location: dto.location,
            capacity: dto.capacity,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub pwd_hash: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.pwd_hash.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        UserView {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// The "populate organizer" projection: just enough of the owning user to
/// render an event card.
#[derive(Debug, Serialize, Deserialize)]
pub struct OrganizerView {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
    pub organizer: OrganizerView,
    pub attendees: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: &Uuid, email: &str, role: Role, exp: i64) -> Self {
        Self {
            user_id: *user_id,
            email: email.to_string(),
            role,
            exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_event_dto_ignores_an_organizer_key() {
        let dto: UpdateEventDto = serde_json::from_value(serde_json::json!({
            "title": "New title",
            "organizer": "b2c3a764-6f2c-4f04-8a6b-0f90a0e2d0f1"
        }))
        .unwrap();
        assert_eq!(dto.title.as_deref(), Some("New title"));
        let changes = EventChanges::from(dto);
        assert!(!changes.is_empty());
        assert!(changes.description.is_none());
    }

    #[test]
    fn empty_update_collapses_to_no_changes() {
        let dto: UpdateEventDto = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(EventChanges::from(dto).is_empty());
    }

    #[test]
    fn event_changes_parse_the_submitted_date() {
        let dto: UpdateEventDto = serde_json::from_value(serde_json::json!({
            "date": "2025-01-01T10:00"
        }))
        .unwrap();
        let changes = EventChanges::from(dto);
        assert!(changes.date.is_some());
    }
}
