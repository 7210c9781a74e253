use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("Event not found: {0}")]
    EventNotFound(Uuid),

    /// An empty county match set is reported as NotFound, unlike the other
    /// list reports which return empty lists.
    #[error("No events found in county '{0}'")]
    CountyNotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ReportResult<T> = Result<T, ReportError>;

/// Convert ReportError to AppError for standardized error responses
impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::UserNotFound(id) => AppError::NotFound(format!("User {} not found", id)),
            ReportError::EventNotFound(id) => {
                AppError::NotFound(format!("Event {} not found", id))
            }
            ReportError::CountyNotFound(county) => {
                AppError::NotFound(format!("No events found in county '{}'", county))
            }
            ReportError::Validation(msg) => AppError::BadRequest(msg),
            ReportError::Database(msg) => AppError::InternalServerError(msg),
            ReportError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ReportError {
    fn from(err: mongodb::error::Error) -> Self {
        ReportError::Database(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for ReportError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        ReportError::Database(format!("BSON serialization error: {}", err))
    }
}

impl From<mongodb::bson::de::Error> for ReportError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        ReportError::Database(format!("BSON deserialization error: {}", err))
    }
}
