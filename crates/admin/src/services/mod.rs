//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Password sign-in against the REST backend, session setup

pub mod auth;

pub use auth::{AdminAuthError, AdminAuthService};
