//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Health check
//! GET  /health/ready                - Readiness (session database)
//!
//! # Auth (password sign-in against the REST backend)
//! GET  /auth/login                  - Login page
//! POST /auth/login                  - Sign in
//! POST /auth/logout                 - Sign out
//!
//! # Dashboard
//! GET  /                            - Overview
//! GET  /api/stats                   - Overview figures as JSON
//!
//! # Products
//! GET  /products                    - Listing (?q=&category=)
//! POST /products                    - Create
//! GET  /products/new                - New product form
//! GET  /products/{id}/edit          - Edit form
//! POST /products/{id}               - Update
//! POST /products/{id}/delete        - Delete
//!
//! # Orders
//! GET  /orders                      - Listing (?status=&q=)
//! GET  /orders/{id}                 - Detail
//! POST /orders/{id}/status          - Move to the next status
//!
//! # Customers
//! GET  /customers                   - Listing (?q=)
//! GET  /customers/{id}              - Detail with order history
//! ```

pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod orders;
pub mod products;

use askama::Template;
use axum::{
    Router,
    response::Html,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the admin router (everything except health checks and static files).
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .route("/", get(dashboard::index))
        .route("/api/stats", get(dashboard::stats))
        .route("/products", get(products::index).post(products::create))
        .route("/products/new", get(products::new))
        .route("/products/{id}", post(products::update))
        .route("/products/{id}/edit", get(products::edit))
        .route("/products/{id}/delete", post(products::delete))
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", post(orders::update_status))
        .route("/customers", get(customers::index))
        .route("/customers/{id}", get(customers::show))
}

/// Render a template, falling back to a plain error body.
pub(crate) fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Date shown in listings, e.g. `Sep 14, 2026`.
pub(crate) fn short_date(at: chrono::DateTime<chrono::Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

/// Treat blank query-string values as absent.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
