use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type EventResult<T> = Result<T, EventError>;

/// Convert EventError to AppError for standardized error responses
impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::NotFound(id) => AppError::NotFound(format!("Event {} not found", id)),
            EventError::Validation(msg) => AppError::BadRequest(msg),
            EventError::Database(msg) => AppError::InternalServerError(msg),
            EventError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for EventError {
    fn into_response(self) -> Response {
        // Convert to AppError for the standardized error response format
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for EventError {
    fn from(err: mongodb::error::Error) -> Self {
        EventError::Database(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for EventError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        EventError::Database(format!("BSON serialization error: {}", err))
    }
}
