//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Account exists but is deactivated
    #[error("Account is inactive")]
    AccountInactive,

    /// Email already registered
    #[error("Email already registered")]
    EmailTaken,

    /// Phone number already registered
    #[error("Phone number already registered")]
    PhoneTaken,

    /// No user for the given identity
    #[error("User not found")]
    UserNotFound,

    /// No live OTP for the phone (never issued, expired, or consumed)
    #[error("No valid OTP for this phone number")]
    OtpNotFound,

    /// OTP attempt ceiling reached; the record is burned
    #[error("Too many attempts, request a new code")]
    TooManyAttempts,

    /// Submitted OTP does not match
    #[error("Invalid code")]
    InvalidCode,

    /// TOTP two-factor is not set up or not confirmed for this user
    #[error("Two-factor authentication is not enabled")]
    TotpNotEnabled,

    /// TOTP code for this time step was already accepted once
    #[error("Code already used, wait for the next one")]
    CodeAlreadyUsed,

    /// Submitted TOTP code does not validate within the window
    #[error("Invalid authenticator code")]
    InvalidTotpCode,

    /// Bearer token failed to decode or carries no subject
    #[error("Invalid token")]
    InvalidToken,

    /// No usable bearer token on a protected endpoint
    #[error("Authentication required")]
    Unauthorized,

    /// Authenticated, but the role is not in the allow-set
    #[error("Insufficient role")]
    Forbidden,

    /// Password fails policy at registration
    #[error("Password validation failed: {0}")]
    PasswordValidation(String),

    /// Request field fails validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// SMS delivery capability is not configured
    #[error("SMS delivery is not available")]
    SmsUnavailable,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    ///
    /// The kind carries the HTTP status of the response.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::InvalidCode
            | AuthError::InvalidTotpCode
            | AuthError::CodeAlreadyUsed
            | AuthError::InvalidToken
            | AuthError::Unauthorized => ErrorKind::Unauthorized,
            AuthError::AccountInactive | AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::EmailTaken | AuthError::PhoneTaken => ErrorKind::Conflict,
            AuthError::UserNotFound | AuthError::OtpNotFound => ErrorKind::NotFound,
            AuthError::TooManyAttempts => ErrorKind::TooManyRequests,
            AuthError::TotpNotEnabled => ErrorKind::UnprocessableEntity,
            AuthError::PasswordValidation(_) | AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::SmsUnavailable => ErrorKind::ServiceUnavailable,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::TooManyAttempts => {
                tracing::warn!("OTP attempt ceiling reached");
            }
            AuthError::CodeAlreadyUsed => {
                tracing::warn!("TOTP replay within the same time step");
            }
            AuthError::SmsUnavailable => {
                tracing::warn!("SMS delivery requested but not configured");
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
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<platform::password::PasswordPolicyError> for AuthError {
    fn from(err: platform::password::PasswordPolicyError) -> Self {
        AuthError::PasswordValidation(err.to_string())
    }
}

impl From<platform::password::PasswordHashError> for AuthError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<platform::secretbox::SecretBoxError> for AuthError {
    fn from(err: platform::secretbox::SecretBoxError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
