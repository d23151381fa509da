//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Everything a caller can observe collapses into four categories:
//! invalid input, invalid credentials (generic per step), too many
//! attempts (with a retry-after hint), and a generic server error.
//! Store and mailer detail stays in server-side logs.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed request input, rejected before touching any store
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    /// Wrong password, unknown or ineligible account - one generic
    /// outcome so nothing reveals which factor failed
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Wrong, expired, or missing one-time code - same collapse for the
    /// second step
    #[error("Invalid verification code")]
    InvalidCode,

    /// Throttle lock engaged; communicates a wait, never a reason
    #[error("Too many attempts")]
    TooManyAttempts { retry_after_secs: u64 },

    /// Session cookie absent, token invalid/expired, or account no
    /// longer eligible
    #[error("Session not found or expired")]
    SessionInvalid,

    /// Email already has an account (provisioning)
    #[error("Email is already registered")]
    EmailTaken,

    /// Mail dispatch failed in strict mode
    #[error("Mail dispatch failed: {0}")]
    Mail(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials | AuthError::InvalidCode | AuthError::SessionInvalid => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::TooManyAttempts { .. } => StatusCode::TOO_MANY_REQUESTS,
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::Mail(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidInput(_) => ErrorKind::BadRequest,
            AuthError::InvalidCredentials | AuthError::InvalidCode | AuthError::SessionInvalid => {
                ErrorKind::Unauthorized
            }
            AuthError::TooManyAttempts { .. } => ErrorKind::TooManyRequests,
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::Mail(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError with a caller-safe message
    ///
    /// Server-side failures keep their detail in logs only.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Mail(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::new(self.kind(), "Internal server error")
            }
            AuthError::TooManyAttempts { retry_after_secs } => {
                AppError::new(self.kind(), "Too many attempts").with_action(format!(
                    "Please try again in {} seconds",
                    retry_after_secs
                ))
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Mail(msg) => {
                tracing::error!(message = %msg, "Mail dispatch error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::InvalidCode => {
                tracing::warn!("Invalid verification code attempt");
            }
            AuthError::TooManyAttempts { retry_after_secs } => {
                tracing::warn!(retry_after_secs, "Throttled login attempt");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();

        let mut response = self.to_app_error().into_response();
        if let AuthError::TooManyAttempts { retry_after_secs } = &self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::InvalidInput("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::TooManyAttempts { retry_after_secs: 60 }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AuthError::SessionInvalid.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_do_not_leak_detail() {
        let err = AuthError::Internal("connection string postgres://user:pw@host".into());
        assert_eq!(err.to_app_error().message(), "Internal server error");

        let err = AuthError::Mail("smtp password rejected".into());
        assert_eq!(err.to_app_error().message(), "Internal server error");
    }

    #[test]
    fn test_retry_after_header_is_set() {
        let response = AuthError::TooManyAttempts { retry_after_secs: 90 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER),
            Some(&HeaderValue::from_static("90"))
        );
    }
}
