use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error};

use crate::checkin::CheckInError;
use crate::store::StoreError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error")]
    DatabaseError(#[from] StoreError),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            // Rejected check-ins are routine at the door.
            AppError::ValidationError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => {
                debug!(error = ?self, message = %msg, "Request rejected");
            }
            AppError::InternalServerError(msg) => {
                error!(error = ?self, message = %msg, "Application error");
            }
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
        }
    }
}

impl From<CheckInError> for AppError {
    fn from(err: CheckInError) -> Self {
        let message = err.notification().message;
        match err {
            CheckInError::NotFound => AppError::NotFound(message),
            CheckInError::Unapproved(_) => AppError::Forbidden(message),
            CheckInError::AlreadyCheckedIn { .. } => AppError::Conflict(message),
            CheckInError::StoreUnavailable(source) => AppError::DatabaseError(source),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level message to the client
        let public_message = match &self {
            AppError::ValidationError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                "Check-in service is temporarily unavailable".to_string()
            }
        };

        error_response(code, public_message, None, status)
    }
}
