//! Data every full page needs: header badges, the login modal and the
//! pending toast.

use aurelle_core::cart::Cart;
use aurelle_core::favorites::Favorites;
use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use super::auth::safe_next;
use super::flash::take_flash;
use crate::models::{CurrentCustomer, Flash, session_keys};

/// Shared layout context, extracted per request.
///
/// Extracting it consumes the pending flash message, so only handlers that
/// render a page should ask for it.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    pub customer_name: Option<String>,
    pub cart_count: u32,
    pub favorites_count: usize,
    pub flash: Option<Flash>,
    /// `?login=1` opens the sign-in dialog on page load.
    pub show_login_modal: bool,
    /// Where the sign-in dialog returns to.
    pub login_next: String,
    pub current_path: String,
}

impl PageLayout {
    /// Whether a customer is signed in.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.customer_name.is_some()
    }

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

fn query_param(parts: &Parts, name: &str) -> Option<String> {
    let query = parts.uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

impl<S> FromRequestParts<S> for PageLayout
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let current_path = parts.uri.path().to_string();
        let show_login_modal = query_param(parts, "login").is_some_and(|v| v == "1");
        let next = query_param(parts, "next");
        let login_next = safe_next(next.as_deref().or(Some(current_path.as_str()))).to_string();

        let mut layout = Self {
            show_login_modal,
            login_next,
            current_path,
            ..Self::default()
        };

        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Ok(layout);
        };

        layout.customer_name = session
            .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
            .await
            .ok()
            .flatten()
            .map(|c| c.name);
        layout.cart_count = session
            .get::<Cart>(session_keys::CART)
            .await
            .ok()
            .flatten()
            .map_or(0, |cart| cart.item_count());
        layout.favorites_count = session
            .get::<Favorites>(session_keys::FAVORITES)
            .await
            .ok()
            .flatten()
            .map_or(0, |f| f.len());
        layout.flash = take_flash(&session).await;

        Ok(layout)
    }
}
