//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::email::EmailError;
use crate::services::profiles::ProfileError;
use crate::services::vendors::VendorError;

/// Application-level error type for the marketplace.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Vendor operation failed.
    #[error("Vendor error: {0}")]
    Vendor(#[from] VendorError),

    /// Profile operation failed.
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Email delivery failed.
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Internal(_)
                | Self::Email(_)
                | Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash)
                | Self::Vendor(
                    VendorError::Repository(_)
                        | VendorError::Email(_)
                        | VendorError::Auth(AuthError::Repository(_) | AuthError::PasswordHash)
                )
                | Self::Profile(ProfileError::Repository(_))
        )
    }
}

/// Status for an auth failure, shared by the direct auth surface and the
/// vendor-onboarding wrapper so both registration paths answer alike.
const fn auth_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidCredentials | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
        AuthError::AccountInactive => StatusCode::FORBIDDEN,
        AuthError::UserAlreadyExists => StatusCode::CONFLICT,
        AuthError::WeakPassword(_)
        | AuthError::InvalidEmail(_)
        | AuthError::InvalidRegistration(_)
        | AuthError::InvalidActivationLink => StatusCode::BAD_REQUEST,
        AuthError::Repository(_) | AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client-safe message for an auth failure.
fn auth_message(err: &AuthError) -> String {
    match err {
        AuthError::InvalidCredentials | AuthError::UserNotFound => "Invalid credentials".to_string(),
        AuthError::AccountInactive => {
            "Account not activated; check your email for the activation link".to_string()
        }
        AuthError::UserAlreadyExists => {
            "An account with this email or username already exists".to_string()
        }
        AuthError::WeakPassword(msg) | AuthError::InvalidRegistration(msg) => msg.clone(),
        AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
        AuthError::InvalidActivationLink => "Invalid activation link".to_string(),
        AuthError::Repository(_) | AuthError::PasswordHash => "Internal server error".to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Email(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(err) => auth_status(err),
            Self::Vendor(err) => match err {
                VendorError::NotFound => StatusCode::NOT_FOUND,
                VendorError::AlreadyExists | VendorError::DuplicateHours => StatusCode::CONFLICT,
                VendorError::EmptyName
                | VendorError::InvalidName(_)
                | VendorError::NameTooLong { .. }
                | VendorError::UnsupportedFileType => StatusCode::BAD_REQUEST,
                VendorError::Auth(inner) => auth_status(inner),
                VendorError::Email(_) | VendorError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Profile(err) => match err {
                ProfileError::NotFound => StatusCode::NOT_FOUND,
                ProfileError::InvalidCoordinates(_)
                | ProfileError::IncompleteCoordinates
                | ProfileError::UnsupportedFileType => StatusCode::BAD_REQUEST,
                ProfileError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Email(_) => "Notification delivery failed".to_string(),
            Self::Auth(err) => auth_message(err),
            Self::Vendor(err) => match err {
                VendorError::Repository(_) | VendorError::Email(_) => {
                    "Internal server error".to_string()
                }
                VendorError::Auth(inner) => auth_message(inner),
                other => other.to_string(),
            },
            Self::Profile(err) => match err {
                ProfileError::Repository(_) => "Internal server error".to_string(),
                other => other.to_string(),
            },
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("vendor spice-route".to_string());
        assert_eq!(err.to_string(), "Not found: vendor spice-route");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Vendor(VendorError::UnsupportedFileType)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_vendor_registration_matches_auth_statuses() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        // Both registration paths must answer a taken email/username alike.
        assert_eq!(
            get_status(AppError::Vendor(VendorError::Auth(
                AuthError::UserAlreadyExists
            ))),
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
        );
        assert_eq!(
            get_status(AppError::Vendor(VendorError::Auth(
                AuthError::UserAlreadyExists
            ))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Vendor(VendorError::Auth(
                AuthError::AccountInactive
            ))),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Vendor(VendorError::Auth(
                AuthError::WeakPassword("too short".to_string())
            ))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_client_message_hides_internal_detail() {
        let err = AppError::Database(RepositoryError::NotFound);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
