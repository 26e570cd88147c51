//! Session-held models for the storefront.
//!
//! Domain records come from `aurelle_core`; this module only holds what the
//! storefront keeps per visitor.

pub mod session;

pub use session::{CurrentCustomer, Flash, FlashKind, keys as session_keys};
