use chrono::Utc;
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Organizer,
    Attendee,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "organizer" => Some(Role::Organizer),
            "attendee" => Some(Role::Attendee),
            _ => None,
        }
    }
}

#[derive(Debug, FromRow, serde::Serialize, serde::Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub pwd_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, FromRow, serde::Serialize, serde::Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: chrono::DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
    pub organizer: Uuid,
}

#[derive(Debug, FromRow, serde::Serialize, serde::Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient: Uuid,
    pub event_id: Uuid,
    pub content: String,
    pub creation_dt: chrono::DateTime<Utc>,
    pub sending_dt: Option<chrono::DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsvpOutcome {
    Confirmed,
    AlreadyAttending,
    Full,
}

impl Event {
    /// Decides whether one more attendee fits. The caller is expected to hold
    /// a lock on the event row so the count cannot move under us.
    pub fn rsvp_decision(&self, already_attending: bool, attendee_count: i64) -> RsvpOutcome {
        if already_attending {
            RsvpOutcome::AlreadyAttending
        } else if attendee_count >= self.capacity as i64 {
            RsvpOutcome::Full
        } else {
            RsvpOutcome::Confirmed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn meetup(capacity: i32) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: "Meetup".to_string(),
            description: "desc".to_string(),
            date: Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap(),
            location: "Hall A".to_string(),
            capacity,
            organizer: Uuid::new_v4(),
        }
    }

    #[test]
    fn rsvp_fills_up_to_capacity_then_rejects() {
        let event = meetup(2);
        // user A
        assert_eq!(event.rsvp_decision(false, 0), RsvpOutcome::Confirmed);
        // user A again
        assert_eq!(event.rsvp_decision(true, 1), RsvpOutcome::AlreadyAttending);
        // user B
        assert_eq!(event.rsvp_decision(false, 1), RsvpOutcome::Confirmed);
        // user C
        assert_eq!(event.rsvp_decision(false, 2), RsvpOutcome::Full);
    }

    #[test]
    fn duplicate_rsvp_wins_over_capacity() {
        let event = meetup(1);
        assert_eq!(event.rsvp_decision(true, 1), RsvpOutcome::AlreadyAttending);
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            pwd_hash: "super-secret-hash".to_string(),
            role: Role::Attendee,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("super-secret-hash"));
        assert!(!json.contains("pwd_hash"));
    }

    #[test]
    fn role_parses_known_values_only() {
        assert_eq!(Role::parse("organizer"), Some(Role::Organizer));
        assert_eq!(Role::parse("attendee"), Some(Role::Attendee));
        assert_eq!(Role::parse("admin"), None);
    }
}
