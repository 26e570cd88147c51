//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Login, registration and password reset against the backend
//! - `cart` - Session-held cart mirrored to the backend for customers
//! - `favorites` - Same pattern for favorite fragrances
//! - `checkout` - Quote, validation and order placement
//! - `address_picker` - Cascading PSGC dropdowns

pub mod address_picker;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod favorites;

use thiserror::Error;

use crate::backend::ApiError;
use crate::error::AppError;

pub use auth::{AuthError, AuthService, Registration, SignedIn};
pub use cart::{CartMerge, CartService};
pub use checkout::{CheckoutService, PlaceOrderError};
pub use favorites::FavoritesService;

/// Failure reading or writing state that lives in both the session and the
/// backend.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Backend(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] tower_sessions::session::Error),
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Backend(e) => Self::Backend(e),
            SyncError::Session(e) => Self::Session(e),
        }
    }
}

/// Treat an unavailable backend as success so the session copy stays
/// authoritative until the next successful read.
fn tolerate_outage(result: Result<(), ApiError>, action: &'static str) -> Result<(), ApiError> {
    match result {
        Err(e) if e.is_unavailable() => {
            tracing::warn!(error = %e, action, "Backend unavailable, keeping local copy");
            Ok(())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerate_outage_only_swallows_unavailable() {
        let outage = ApiError::Status {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert!(tolerate_outage(Err(outage), "add").is_ok());
        assert!(matches!(
            tolerate_outage(Err(ApiError::Validation("Out of stock".into())), "add"),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            tolerate_outage(Err(ApiError::Unauthorized), "add"),
            Err(ApiError::Unauthorized)
        ));
    }
}
