//! Data every dashboard page needs: who is signed in, the active section and
//! the pending flash message.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use super::auth::current_admin;
use super::flash::take_flash;
use crate::models::Flash;

/// Shared layout context, extracted per request.
///
/// Extracting it consumes the pending flash message, so only handlers that
/// render a page should ask for it.
#[derive(Debug, Clone, Default)]
pub struct AdminLayout {
    pub admin_name: Option<String>,
    pub current_path: String,
    pub flash: Option<Flash>,
}

impl AdminLayout {
    /// Whether `prefix` is the active navigation section.
    #[must_use]
    pub fn is_active(&self, prefix: &str) -> bool {
        if prefix == "/" {
            self.current_path == "/"
        } else {
            self.current_path.starts_with(prefix)
        }
    }
}

impl<S> FromRequestParts<S> for AdminLayout
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let mut layout = Self {
            current_path: parts.uri.path().to_string(),
            ..Self::default()
        };
        if let Some(session) = parts.extensions.get::<Session>().cloned() {
            layout.admin_name = current_admin(&session).await.map(|a| a.name);
            layout.flash = take_flash(&session).await;
        }
        Ok(layout)
    }
}
