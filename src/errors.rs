use actix_web::{
    error,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use derive_more::{Display, Error};
use log::error;

/// One entry of the `{"errors": [...]}` validation response body.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Display, Error)]
pub enum ApiError {
    #[display(fmt = "validation failed")]
    Validation(#[error(not(source))] Vec<FieldError>),

    #[display(fmt = "{} not found", _0)]
    NotFound(#[error(not(source))] &'static str),

    #[display(fmt = "{}", _0)]
    Conflict(#[error(not(source))] String),

    #[display(fmt = "Not authorized")]
    Unauthorized,

    #[display(fmt = "Only the organizer may do that")]
    Forbidden,

    #[display(fmt = "{}", _0)]
    BadRequest(#[error(not(source))] String),

    #[display(fmt = "database error")]
    Database,
}

impl error::ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        builder.insert_header(ContentType::json());
        match self {
            ApiError::Validation(errors) => builder.json(serde_json::json!({ "errors": errors })),
            other => builder.json(serde_json::json!({ "message": other.to_string() })),
        }
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Database => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        error!("database error: {:?}", err);
        ApiError::Database
    }
}

/// Maps a fetch-by-id failure to a 404 for the named resource, anything else
/// to the generic persistence error.
pub fn db_err(resource: &'static str) -> impl FnOnce(sqlx::Error) -> ApiError {
    move |err| match err {
        sqlx::Error::RowNotFound => ApiError::NotFound(resource),
        other => other.into(),
    }
}
