//! Admin-side models: the session identity and product form validation.

pub mod product;
pub mod session;

pub use product::{ProductDraft, ProductDraftError, ProductInput};
pub use session::{CurrentAdmin, Flash, FlashKind, keys as session_keys};
