//! Unified error handling for admin.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::backend::ApiError;
use crate::services::AdminAuthError;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// REST backend call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] ApiError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Sign-in failed outside the form's control.
    #[error("Auth error: {0}")]
    Auth(#[from] AdminAuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User lacks permission.
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
    fn backend(&self) -> Option<&ApiError> {
        match self {
            Self::Backend(e) | Self::Auth(AdminAuthError::Backend(e)) => Some(e),
            _ => None,
        }
    }

    fn is_server_error(&self) -> bool {
        match self.backend() {
            Some(e) => !matches!(
                e,
                ApiError::Unauthorized
                    | ApiError::Forbidden
                    | ApiError::NotFound(_)
                    | ApiError::Validation(_)
                    | ApiError::RateLimited(_)
            ),
            None => matches!(
                self,
                Self::Session(_) | Self::Internal(_) | Self::Auth(AdminAuthError::Session(_))
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        // An expired token sends the admin back through login.
        if matches!(self.backend(), Some(ApiError::Unauthorized)) {
            return Redirect::to("/auth/login?expired=1").into_response();
        }

        let (status, message) = match (&self, self.backend()) {
            (_, Some(ApiError::Forbidden)) => {
                (StatusCode::FORBIDDEN, "Admin access required".to_string())
            }
            (_, Some(ApiError::NotFound(_))) => (StatusCode::NOT_FOUND, "Not found".to_string()),
            (_, Some(ApiError::Validation(message))) => (StatusCode::BAD_REQUEST, message.clone()),
            (_, Some(ApiError::RateLimited(_))) => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests, please try again shortly".to_string(),
            ),
            (_, Some(_)) => (
                StatusCode::BAD_GATEWAY,
                "External service error".to_string(),
            ),
            (Self::NotFound(_), None) => (StatusCode::NOT_FOUND, self.to_string()),
            (Self::Forbidden(_), None) => (StatusCode::FORBIDDEN, self.to_string()),
            (Self::BadRequest(_), None) => (StatusCode::BAD_REQUEST, self.to_string()),
            (Self::Auth(err), None) if err.is_user_facing() => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from the signed-in admin.
pub fn set_sentry_user(admin_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use axum::http::header::LOCATION;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order 123".to_string());
        assert_eq!(err.to_string(), "Not found: order 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Backend(ApiError::Forbidden)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Backend(ApiError::Status {
                status: 500,
                message: "boom".to_string()
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_expired_token_redirects_to_login() {
        let response = AppError::Backend(ApiError::Unauthorized).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/auth/login?expired=1")
        );
    }
}
