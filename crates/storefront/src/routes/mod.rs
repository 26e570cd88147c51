//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//!
//! # Products
//! GET  /products               - Listing with search, filters, sort, pages
//! GET  /products/{id}          - Product detail
//!
//! # Cart (session cart, mirrored to the backend for customers)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add a product
//! POST /cart/update            - Change a quantity (0 removes)
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//!
//! # Checkout (requires auth)
//! GET  /checkout               - Address, payment method and totals
//! POST /checkout               - Place the order
//!
//! # Favorites
//! GET  /favorites              - Favorited products
//! POST /favorites/toggle       - Toggle a favorite
//!
//! # Account (requires auth)
//! GET  /account                               - Overview
//! GET  /account/orders                        - Order history
//! GET  /account/orders/{id}                   - Order detail
//! POST /account/orders/{id}/cancel            - Cancel a pending order
//! GET  /account/addresses                     - Saved addresses
//! GET  /account/addresses/new                 - Address form
//! POST /account/addresses                     - Create (or refresh the picker)
//! GET  /account/addresses/{id}/edit           - Edit form
//! POST /account/addresses/{id}                - Update (or refresh the picker)
//! POST /account/addresses/{id}/delete         - Delete
//! POST /account/addresses/{id}/default        - Make default
//! GET  /account/payment-methods               - Saved payment methods
//! GET  /account/payment-methods/new           - Payment method form
//! POST /account/payment-methods               - Create
//! POST /account/payment-methods/{id}/delete   - Delete
//! POST /account/payment-methods/{id}/default  - Make default
//! GET  /account/notifications                 - Notifications
//! POST /account/notifications/{id}/read       - Mark one read
//! POST /account/notifications/read-all        - Mark all read
//!
//! # Auth
//! GET|POST /auth/login, /auth/register, /auth/forgot-password, /auth/reset-password
//! POST /auth/logout
//!
//! # JSON
//! GET  /api/locations/{level}  - Options for the cascading address picker
//! GET  /api/cart/summary       - Header badge data
//!
//! # Offline support
//! GET  /sw.js                  - Service worker
//! GET  /manifest.webmanifest   - Web app manifest
//! GET  /offline                - Offline fallback page
//! ```

pub mod account;
pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod favorites;
pub mod home;
pub mod products;
pub mod pwa;

use axum::{
    Router,
    http::{HeaderMap, header::ACCEPT},
    routing::{get, post},
};
use tower_sessions::Session;

use crate::backend::ApiError;
use crate::error::AppError;
use crate::middleware::{api_rate_limiter, auth_rate_limiter, push_flash, safe_next};
use crate::models::Flash;
use crate::services::SyncError;
use crate::state::AppState;

/// Whether the client asked for JSON (the enhanced forms in `app.js` do).
#[must_use]
pub fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}

/// Same-site path from a `redirect_to` form field, or `fallback`.
#[must_use]
pub fn return_to(candidate: Option<&str>, fallback: &str) -> String {
    match candidate {
        Some(path) if !path.is_empty() && safe_next(Some(path)) == path => path.to_string(),
        _ => fallback.to_string(),
    }
}

/// Uppercase the first letter of a sentence-case validation message.
#[must_use]
pub fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Show a backend refusal as a toast. Anything else is an error page.
///
/// # Errors
///
/// Returns the original error when it is not a refusal the customer can act on.
pub async fn flash_rejection(session: &Session, err: SyncError) -> Result<(), AppError> {
    match err {
        SyncError::Backend(ApiError::Validation(message) | ApiError::NotFound(message)) => {
            push_flash(session, Flash::error(message)).await;
            Ok(())
        }
        other => Err(other.into()),
    }
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the favorites routes router.
pub fn favorites_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::index))
        .route("/toggle", post(favorites::toggle))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/orders", get(account::orders::index))
        .route("/orders/{id}", get(account::orders::show))
        .route("/orders/{id}/cancel", post(account::orders::cancel))
        .route(
            "/addresses",
            get(account::addresses::index).post(account::addresses::create),
        )
        .route("/addresses/new", get(account::addresses::new))
        .route("/addresses/{id}", post(account::addresses::update))
        .route("/addresses/{id}/edit", get(account::addresses::edit))
        .route("/addresses/{id}/delete", post(account::addresses::delete))
        .route(
            "/addresses/{id}/default",
            post(account::addresses::make_default),
        )
        .route(
            "/payment-methods",
            get(account::payment_methods::index).post(account::payment_methods::create),
        )
        .route("/payment-methods/new", get(account::payment_methods::new))
        .route(
            "/payment-methods/{id}/delete",
            post(account::payment_methods::delete),
        )
        .route(
            "/payment-methods/{id}/default",
            post(account::payment_methods::make_default),
        )
        .route("/notifications", get(account::notifications::index))
        .route(
            "/notifications/{id}/read",
            post(account::notifications::mark_read),
        )
        .route(
            "/notifications/read-all",
            post(account::notifications::mark_all_read),
        )
}

/// Create the auth routes router.
///
/// Form posts are rate limited per client IP.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
        .route("/forgot-password", get(auth::forgot_password_page))
        .route("/reset-password", get(auth::reset_password_page))
        .route("/logout", post(auth::logout))
        .merge(limited)
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/locations/{level}", get(api::locations))
        .route("/cart/summary", get(api::cart_summary))
        .layer(api_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::show).post(checkout::place_order))
        .nest("/favorites", favorites_routes())
        .nest("/account", account_routes())
        .nest("/auth", auth_routes())
        .nest("/api", api_routes())
        .route("/sw.js", get(pwa::service_worker))
        .route("/manifest.webmanifest", get(pwa::manifest))
        .route("/offline", get(pwa::offline))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_wants_json() {
        let mut headers = HeaderMap::new();
        assert!(!wants_json(&headers));
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,*/*"));
        assert!(!wants_json(&headers));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        assert!(wants_json(&headers));
    }

    #[test]
    fn test_return_to_only_allows_local_paths() {
        assert_eq!(return_to(Some("/products/3"), "/cart"), "/products/3");
        assert_eq!(return_to(Some("https://evil.example"), "/cart"), "/cart");
        assert_eq!(return_to(Some(""), "/cart"), "/cart");
        assert_eq!(return_to(None, "/cart"), "/cart");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("choose a shipping address"), "Choose a shipping address");
        assert_eq!(capitalize(""), "");
    }

    #[tokio::test]
    async fn test_validation_refusal_becomes_toast() {
        let session = crate::test_support::session();
        let refused = SyncError::Backend(ApiError::Validation("Out of stock".to_string()));
        flash_rejection(&session, refused).await.unwrap();
        assert_eq!(
            crate::middleware::take_flash(&session).await,
            Some(Flash::error("Out of stock"))
        );

        let outage = SyncError::Backend(ApiError::Status {
            status: 503,
            message: "down".to_string(),
        });
        assert!(flash_rejection(&session, outage).await.is_err());
    }
}
