use derive_more::Display;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::MailConfig;
use crate::models::Event;

#[derive(Debug, Display)]
pub enum MailError {
    #[display(fmt = "invalid mail address: {}", _0)]
    Address(lettre::address::AddressError),
    #[display(fmt = "failed to build message: {}", _0)]
    Message(lettre::error::Error),
    #[display(fmt = "smtp transport error: {}", _0)]
    Transport(lettre::transport::smtp::Error),
}

/// SMTP dispatcher for RSVP confirmations. Cloned into spawned tasks so mail
/// delivery never sits between an RSVP and its response.
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_server)
            .map_err(MailError::Transport)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();
        let from = config.from.parse::<Mailbox>().map_err(MailError::Address)?;
        Ok(Mailer { transport, from })
    }

    pub fn event_message(&self, recipient: &str, event: &Event) -> Result<Message, MailError> {
        let to = recipient.parse::<Mailbox>().map_err(MailError::Address)?;
        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(format!("RSVP confirmed: {}", event.title))
            .header(ContentType::TEXT_PLAIN)
            .body(notification_body(event))
            .map_err(MailError::Message)
    }

    pub async fn send_event_notification(
        &self,
        recipient: &str,
        event: &Event,
    ) -> Result<(), MailError> {
        let message = self.event_message(recipient, event)?;
        self.transport
            .send(message)
            .await
            .map_err(MailError::Transport)?;
        Ok(())
    }
}

pub fn notification_body(event: &Event) -> String {
    format!(
        "You're confirmed for \"{}\".\n\nWhen: {}\nWhere: {}\n\n{}",
        event.title,
        event.date.format("%Y-%m-%d %H:%M UTC"),
        event.location,
        event.description
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn mailer() -> Mailer {
        Mailer::from_config(&MailConfig {
            smtp_server: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: "".to_string(),
            smtp_password: "".to_string(),
            from: "Event Hub <noreply@example.com>".to_string(),
        })
        .unwrap()
    }

    fn meetup() -> Event {
        Event {
            id: Uuid::new_v4(),
            title: "Meetup".to_string(),
            description: "desc".to_string(),
            date: Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap(),
            location: "Hall A".to_string(),
            capacity: 2,
            organizer: Uuid::new_v4(),
        }
    }

    #[test]
    fn body_names_the_event_and_venue() {
        let body = notification_body(&meetup());
        assert!(body.contains("Meetup"));
        assert!(body.contains("Hall A"));
        assert!(body.contains("2025-01-01 10:00 UTC"));
    }

    #[test]
    fn message_builds_for_a_valid_recipient() {
        assert!(mailer().event_message("alice@example.com", &meetup()).is_ok());
    }

    #[test]
    fn message_rejects_a_malformed_recipient() {
        assert!(matches!(
            mailer().event_message("not an address", &meetup()),
            Err(MailError::Address(_))
        ));
    }
}
