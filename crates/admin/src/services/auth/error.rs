//! Admin authentication error types.

use thiserror::Error;

use crate::backend::ApiError;

/// Errors that can occur during admin authentication operations.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Invalid email format.
    #[error("{0}")]
    InvalidEmail(#[from] aurelle_core::EmailError),

    /// Wrong email/password pair.
    #[error("incorrect email or password")]
    InvalidCredentials,

    /// Too many attempts; the backend asked us to wait.
    #[error("too many attempts, try again in {0} seconds")]
    RateLimited(u64),

    /// Backend call failed.
    #[error("backend error: {0}")]
    Backend(#[from] ApiError),

    /// Session store failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AdminAuthError {
    /// Whether the message is meant for the person at the login form.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::InvalidEmail(_) | Self::InvalidCredentials | Self::RateLimited(_)
        )
    }
}
