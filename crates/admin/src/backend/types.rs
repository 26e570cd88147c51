//! Request and response bodies exchanged with the REST backend.

use aurelle_core::OrderStatus;
use aurelle_core::customer::Customer;
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

/// Successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub token: AccessToken,
    pub customer: Customer,
}

/// `PATCH /admin/orders/{id}/status`
#[derive(Debug, Serialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}
