//! Request and response bodies exchanged with the REST backend.
//!
//! Domain records (products, orders, addresses, ...) come straight from
//! `aurelle_core`; only the envelopes live here.

use aurelle_core::cart::CartLine;
use aurelle_core::customer::Customer;
use aurelle_core::{ProductId, Role};
use serde::{Deserialize, Serialize};

use super::AccessToken;

/// Error body returned by the backend.
#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

/// `POST /auth/login`
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /auth/register`
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'a str>,
}

/// Successful login or registration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub token: AccessToken,
    pub customer: Customer,
}

impl AuthSession {
    #[must_use]
    pub const fn role(&self) -> Role {
        self.customer.role
    }
}

/// `POST /auth/forgot-password`
#[derive(Debug, Serialize)]
pub struct ForgotPasswordRequest<'a> {
    pub email: &'a str,
}

/// `POST /auth/reset-password`
#[derive(Debug, Serialize)]
pub struct ResetPasswordRequest<'a> {
    pub token: &'a str,
    pub password: &'a str,
}

/// `GET /cart`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerCart {
    #[serde(default)]
    pub items: Vec<CartLine>,
}

/// `POST /cart/items`
#[derive(Debug, Serialize)]
pub struct AddCartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// `PUT /cart/items/{product_id}`
#[derive(Debug, Serialize)]
pub struct UpdateCartItem {
    pub quantity: u32,
}

/// An entry of `GET /favorites`, also the body of `POST /favorites`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub product_id: ProductId,
}
