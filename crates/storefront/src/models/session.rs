//! Session-related types.
//!
//! Everything the browser kept in local storage lives in the visitor's
//! server-side session instead: identity, the cart mirror, guest favorites
//! and one-shot flash messages.

use aurelle_core::customer::Customer;
use aurelle_core::{CustomerId, Role};
use serde::{Deserialize, Serialize};

use crate::backend::AccessToken;

/// Session-stored customer identity.
///
/// Minimal data to identify the signed-in customer plus the bearer token
/// for backend calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    /// Backend customer ID.
    pub id: CustomerId,
    /// Customer's email address.
    pub email: String,
    /// Name shown in the header.
    pub name: String,
    /// Account role.
    pub role: Role,
    /// Bearer token for the REST backend.
    pub token: AccessToken,
}

impl CurrentCustomer {
    /// Build the session identity from a backend login response.
    #[must_use]
    pub fn new(customer: &Customer, token: AccessToken) -> Self {
        Self {
            id: customer.id,
            email: customer.email.clone(),
            name: customer.display_name().to_string(),
            role: customer.role,
            token,
        }
    }
}

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

impl FlashKind {
    /// CSS modifier class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

/// A one-shot toast message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Info,
            message: message.into(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current signed-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for the cart (guest cart, or mirror of the server cart).
    pub const CART: &str = "cart";

    /// Key for favorites (guest set, or mirror of the server set).
    pub const FAVORITES: &str = "favorites";

    /// Key for the pending flash message.
    pub const FLASH: &str = "flash";
}
