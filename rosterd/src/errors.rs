use crate::db::errors::DbError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required but not provided, or credentials invalid
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Authenticated but not allowed to perform the operation
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Malformed caller input or business rule violation
    #[error("{message}")]
    Validation { message: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Conflict with existing state, e.g. duplicate username or license number
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Conflict { .. } => StatusCode::CONFLICT,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                // A dangling reference means the referenced entity does not
                // exist; surfaced the same way as a failed lookup.
                DbError::ForeignKeyViolation { .. } => StatusCode::NOT_FOUND,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message
                .clone()
                .unwrap_or_else(|| "Authentication required".to_string()),
            Error::Forbidden { message } => message.clone(),
            Error::Validation { message } => message.clone(),
            Error::NotFound { resource, id } => {
                format!("{resource} with ID {id} not found")
            }
            Error::Conflict { message } => message.clone(),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                violation @ DbError::UniqueViolation { .. } => {
                    if violation.violates_column("drivers.license_number") {
                        "A driver with this license number already exists".to_string()
                    } else if violation.violates_column("users.username") {
                        "Username already registered".to_string()
                    } else {
                        "Resource already exists".to_string()
                    }
                }
                DbError::ForeignKeyViolation { .. } => "Referenced resource not found".to_string(),
                DbError::Other(_) => "Database error occurred".to_string(),
            },
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Unauthenticated { .. } | Error::Forbidden { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::Validation { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
            Error::Conflict { .. } => {
                tracing::warn!("Conflict error: {}", self);
            }
        }

        let status = self.status_code();
        let user_message = self.user_message();

        match &self {
            // Conflicts get a structured JSON body so clients can present them
            Error::Conflict { .. } | Error::Database(DbError::UniqueViolation { .. }) => {
                let body = serde_json::json!({ "message": user_message });
                (status, axum::response::Json(body)).into_response()
            }
            // Bearer challenge on authentication failures
            Error::Unauthenticated { .. } => {
                (status, [(header::WWW_AUTHENTICATE, "Bearer")], user_message).into_response()
            }
            _ => (status, user_message).into_response(),
        }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
