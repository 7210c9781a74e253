use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(i64),

    #[error("Event not found: {0}")]
    EventNotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => AppError::NotFound(format!("User {} not found", id)),
            UserError::EventNotFound(id) => AppError::NotFound(format!("Event {} not found", id)),
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::Database(msg) => AppError::InternalServerError(msg),
            UserError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Database(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for UserError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        UserError::Database(format!("BSON serialization error: {}", err))
    }
}

impl From<mongodb::bson::de::Error> for UserError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        UserError::Database(format!("BSON deserialization error: {}", err))
    }
}
