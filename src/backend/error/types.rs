/**
 * Backend Error Types
 *
 * This module defines the error taxonomy used by the stores, the session
 * resolver, the token issuer and the HTTP handlers.
 *
 * # Error Categories
 *
 * - `NotFound` - session, group, user or submission absent
 * - `Conflict` - duplicate user or group
 * - `Unauthorized` - missing, invalid or expired access token
 * - `Forbidden` - refresh token mismatch or not a group member
 * - `HandlerError` - malformed request parameters
 * - `Internal` / `Database` - unexpected failures; logged, never detailed to clients
 *
 * Session creation races are not an error: the store absorbs them and hands
 * back the winning session.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

/// Backend-specific error types
///
/// Each variant maps to one HTTP status through `status_code()`.
///
/// # Usage
///
/// ```rust
/// use standup::backend::error::BackendError;
///
/// let err = BackendError::not_found("session 7 not found");
/// assert_eq!(err.status_code().as_u16(), 404);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., missing query parameter)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// The requested entity does not exist
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// A uniqueness constraint was violated
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Credentials missing, invalid or expired
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Credentials valid but not allowed to perform the action
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Unexpected failure outside of the database
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// Shared error (validation, serialization)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result alias used throughout the backend
pub type BackendResult<T> = Result<T, BackendError>;

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Shorthand for a 400 handler error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `NotFound` - 404
    /// - `Conflict` - 409
    /// - `Unauthorized` - 401
    /// - `Forbidden` - 403
    /// - `SharedError` - 400 for validation, 500 for serialization
    /// - everything else - 500
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::SharedError(err) => match err {
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Internal { .. } | Self::SerializationError(_) | Self::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the client-facing error message
    ///
    /// Server-side failures are reported generically; their details only go
    /// to the log.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. }
            | Self::NotFound { message }
            | Self::Conflict { message }
            | Self::Unauthorized { message }
            | Self::Forbidden { message } => message.clone(),
            Self::SharedError(err @ SharedError::ValidationError { .. }) => err.to_string(),
            _ => "internal server error".to_string(),
        }
    }

    /// Whether this error indicates a server-side failure worth logging
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }
}

/// Whether a database error is a unique-constraint violation (SQLSTATE 23505)
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error() {
        let error = BackendError::handler(StatusCode::BAD_REQUEST, "Invalid request");
        match error {
            BackendError::HandlerError { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "Invalid request");
            }
            _ => panic!("Expected HandlerError"),
        }
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            BackendError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BackendError::conflict("x").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            BackendError::unauthorized("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            BackendError::forbidden("x").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            BackendError::internal("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            BackendError::Database(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_shared_error() {
        let backend_error: BackendError = SharedError::validation("timezone", "bad").into();
        assert_eq!(backend_error.status_code(), StatusCode::BAD_REQUEST);
        assert!(backend_error.message().contains("timezone"));
    }

    #[test]
    fn test_internal_details_hidden() {
        let error = BackendError::internal("connection reset by peer");
        assert_eq!(error.message(), "internal server error");
        assert!(error.is_internal());
        assert!(!BackendError::forbidden("no").is_internal());
    }

    #[test]
    fn test_unique_violation_detection() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
