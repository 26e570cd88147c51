//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (stricter CSP for admin)
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Auth guard (`RequireAdmin` extractor on every dashboard route)

pub mod auth;
pub mod flash;
pub mod layout;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    AdminAuthRejection, RequireAdmin, clear_current_admin, current_admin, set_current_admin,
};
pub use flash::{push_flash, take_flash};
pub use layout::AdminLayout;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, session_layer};
