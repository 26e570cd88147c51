//! Authentication route handlers.
//!
//! Handles login, registration and password reset against the REST backend.
//! The login form is also embedded in the layout's modal dialog, which posts
//! here with a `next` path to return to.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::capitalize;
use crate::backend::ApiError;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAuth, PageLayout, push_flash, safe_next};
use crate::models::Flash;
use crate::services::{AuthError, AuthService, Registration, SignedIn};
use crate::state::AppState;

/// Tells the browser to drop the service worker's caches on logout.
const CLEAR_SITE_DATA: HeaderName = HeaderName::from_static("clear-site-data");

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
    pub next: Option<String>,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    #[serde(default)]
    pub email: String,
}

/// Reset password form data.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for the login and register pages.
#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    pub next: Option<String>,
    /// Set when an expired token sent the customer here.
    pub expired: Option<String>,
}

/// Query parameters for the reset page (from the emailed link).
#[derive(Debug, Deserialize)]
pub struct ResetQuery {
    pub token: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: PageLayout,
    pub email: String,
    pub next: String,
    pub error: Option<String>,
    pub notice: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: PageLayout,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub next: String,
    pub error: Option<String>,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub layout: PageLayout,
    pub email: String,
    pub error: Option<String>,
    pub sent: bool,
}

/// Reset password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub layout: PageLayout,
    pub token: String,
    pub error: Option<String>,
}

/// Message to show on the form, or the error to escalate.
fn form_error(err: AuthError) -> Result<String, AppError> {
    match err {
        err if err.is_user_facing() => Ok(capitalize(&err.to_string())),
        AuthError::Backend(ApiError::RateLimited(_)) => {
            Ok("Too many attempts. Please wait a moment and try again.".to_string())
        }
        AuthError::Backend(e) if e.is_unavailable() => {
            tracing::warn!(error = %e, "Auth request failed, backend unavailable");
            Ok("Sign-in is temporarily unavailable. Please try again shortly.".to_string())
        }
        err => Err(err.into()),
    }
}

/// The toast shown after sign-in. Guest items that did not reach the account
/// take precedence over the greeting.
fn welcome_flash(signed_in: &SignedIn, greeting: String) -> Flash {
    match signed_in.unsaved_cart_items {
        0 => Flash::success(greeting),
        1 => Flash::error("1 item from your cart could not be saved to your account"),
        n => Flash::error(format!(
            "{n} items from your cart could not be saved to your account"
        )),
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page. Signed-in customers go straight to `next`.
pub async fn login_page(
    auth: OptionalAuth,
    layout: PageLayout,
    Query(query): Query<AuthQuery>,
) -> Response {
    let next = safe_next(query.next.as_deref()).to_string();
    if auth.0.is_some() {
        return Redirect::to(&next).into_response();
    }
    LoginTemplate {
        layout,
        email: String::new(),
        next,
        error: None,
        notice: query
            .expired
            .is_some()
            .then(|| "Your session has expired. Please sign in again.".to_string()),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, layout, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    layout: PageLayout,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let next = safe_next(form.next.as_deref()).to_string();

    match AuthService::new(state.backend(), &session)
        .login(&form.email, &form.password)
        .await
    {
        Ok(signed_in) => {
            let greeting = format!("Welcome back, {}!", signed_in.customer.name);
            push_flash(&session, welcome_flash(&signed_in, greeting)).await;
            Ok(Redirect::to(&next).into_response())
        }
        Err(e) => {
            let error = form_error(e)?;
            Ok(LoginTemplate {
                layout,
                email: form.email,
                next,
                error: Some(error),
                notice: None,
            }
            .into_response())
        }
    }
}

/// Handle logout. Clears the session and the offline caches.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Response, AppError> {
    AuthService::new(state.backend(), &session).logout().await?;
    push_flash(&session, Flash::info("You have been signed out")).await;
    Ok((
        [(CLEAR_SITE_DATA, HeaderValue::from_static("\"cache\""))],
        Redirect::to("/"),
    )
        .into_response())
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    auth: OptionalAuth,
    layout: PageLayout,
    Query(query): Query<AuthQuery>,
) -> Response {
    let next = safe_next(query.next.as_deref()).to_string();
    if auth.0.is_some() {
        return Redirect::to(&next).into_response();
    }
    RegisterTemplate {
        layout,
        name: String::new(),
        email: String::new(),
        phone: String::new(),
        next,
        error: None,
    }
    .into_response()
}

/// Handle registration form submission.
#[instrument(skip(state, session, layout, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    layout: PageLayout,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let next = safe_next(form.next.as_deref()).to_string();
    let registration = Registration {
        name: form.name.clone(),
        email: form.email.clone(),
        phone: form.phone.clone(),
        password: form.password,
        password_confirmation: form.password_confirmation,
    };

    match AuthService::new(state.backend(), &session)
        .register(&registration)
        .await
    {
        Ok(signed_in) => {
            let greeting = format!("Welcome to Aurelle, {}!", signed_in.customer.name);
            push_flash(&session, welcome_flash(&signed_in, greeting)).await;
            Ok(Redirect::to(&next).into_response())
        }
        Err(e) => {
            let error = form_error(e)?;
            Ok(RegisterTemplate {
                layout,
                name: form.name,
                email: form.email,
                phone: form.phone,
                next,
                error: Some(error),
            }
            .into_response())
        }
    }
}

// =============================================================================
// Password Reset Routes
// =============================================================================

/// Display the forgot password page.
pub async fn forgot_password_page(layout: PageLayout) -> impl IntoResponse {
    ForgotPasswordTemplate {
        layout,
        email: String::new(),
        error: None,
        sent: false,
    }
}

/// Handle forgot password form submission.
///
/// Unknown emails get the same confirmation as known ones.
#[instrument(skip(state, session, layout))]
pub async fn forgot_password(
    State(state): State<AppState>,
    session: Session,
    layout: PageLayout,
    Form(form): Form<ForgotPasswordForm>,
) -> Result<Response, AppError> {
    let result = AuthService::new(state.backend(), &session)
        .forgot_password(&form.email)
        .await;
    let (error, sent) = match result {
        Ok(()) => (None, true),
        Err(e) => (Some(form_error(e)?), false),
    };
    Ok(ForgotPasswordTemplate {
        layout,
        email: form.email,
        error,
        sent,
    }
    .into_response())
}

/// Display the reset password page.
pub async fn reset_password_page(
    layout: PageLayout,
    Query(query): Query<ResetQuery>,
) -> impl IntoResponse {
    ResetPasswordTemplate {
        layout,
        token: query.token.unwrap_or_default(),
        error: None,
    }
}

/// Handle reset password form submission.
#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    layout: PageLayout,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Response, AppError> {
    match AuthService::new(state.backend(), &session)
        .reset_password(&form.token, &form.password, &form.password_confirmation)
        .await
    {
        Ok(()) => {
            push_flash(
                &session,
                Flash::success("Your password has been updated. Please sign in."),
            )
            .await;
            Ok(Redirect::to("/auth/login").into_response())
        }
        Err(e) => Ok(ResetPasswordTemplate {
            layout,
            token: form.token,
            error: Some(form_error(e)?),
        }
        .into_response()),
    }
}
