//! Core types for Aurelle.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod password;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::Money;
pub use password::{Password, PasswordError};
pub use status::*;
