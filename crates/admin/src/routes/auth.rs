//! Authentication route handlers for admin.
//!
//! Password sign-in against the REST backend; the role check happens per
//! request in [`RequireAdmin`](crate::middleware::RequireAdmin).

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::render;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{AdminLayout, current_admin};
use crate::services::{AdminAuthError, AdminAuthService};
use crate::state::AppState;

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: AdminLayout,
    pub email: String,
    pub next: String,
    pub error: Option<String>,
    pub expired: bool,
}

/// Query parameters on the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
    #[serde(default)]
    pub expired: Option<String>,
}

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/logout", post(logout))
}

/// Only same-site relative paths are allowed as post-login targets.
fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

/// Render the login page.
///
/// GET /auth/login
#[instrument(skip(session, layout))]
pub async fn login_page(
    session: Session,
    layout: AdminLayout,
    Query(query): Query<LoginQuery>,
) -> Response {
    // Already signed in as an admin: nothing to do here.
    if current_admin(&session)
        .await
        .is_some_and(|a| a.role.is_admin())
    {
        return Redirect::to(&safe_next(query.next.as_deref())).into_response();
    }

    render(&LoginTemplate {
        layout,
        email: String::new(),
        next: safe_next(query.next.as_deref()),
        error: None,
        expired: query.expired.is_some(),
    })
    .into_response()
}

/// Sign in.
///
/// POST /auth/login
#[instrument(skip(state, session, layout, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    layout: AdminLayout,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let next = safe_next(form.next.as_deref());

    match AdminAuthService::new(state.client(), &session)
        .login(&form.email, &form.password)
        .await
    {
        Ok(_) => Ok(Redirect::to(&next).into_response()),
        Err(e) if e.is_user_facing() => {
            let status = if matches!(e, AdminAuthError::RateLimited(_)) {
                StatusCode::TOO_MANY_REQUESTS
            } else {
                StatusCode::UNAUTHORIZED
            };
            let page = LoginTemplate {
                layout,
                email: form.email.trim().to_string(),
                next,
                error: Some(e.to_string()),
                expired: false,
            };
            Ok((status, render(&page)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Logout and clear session.
///
/// POST /auth/logout
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect, AppError> {
    AdminAuthService::new(state.client(), &session)
        .logout()
        .await?;
    Ok(Redirect::to("/auth/login"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/orders?status=pending")), "/orders?status=pending");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
