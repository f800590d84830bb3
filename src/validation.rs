use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::errors::{ApiError, FieldError};
use crate::models::Role;

/// Runs the declarative rules on a DTO and short-circuits the request with a
/// structured per-field error list before any handler logic executes.
pub fn run<T: Validate>(dto: &T) -> Result<(), ApiError> {
    dto.validate()
        .map_err(|errs| ApiError::Validation(collect(&errs)))
}

pub fn collect(errs: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = Vec::new();
    for (field, errors) in errs.field_errors() {
        for err in errors {
            fields.push(FieldError {
                field: field.to_string(),
                message: err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string()),
            });
        }
    }
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

pub fn validate_role(role: &str) -> Result<(), ValidationError> {
    match Role::parse(role) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("role")),
    }
}

pub fn validate_event_date(raw: &str) -> Result<(), ValidationError> {
    match parse_event_date(raw) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("date")),
    }
}

/// Accepts RFC 3339 as well as the datetime-local formats the frontend submits
/// (`2025-01-01T10:00` and `2025-01-01T10:00:00`), normalized to UTC.
pub fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}
