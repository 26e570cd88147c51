//! Authentication middleware and extractors for admin.
//!
//! Provides the extractor that guards every dashboard route.

use askama::Template;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::filters;
use crate::middleware::AdminLayout;
use crate::models::{CurrentAdmin, session_keys};

/// Extractor that requires a signed-in account with the admin role.
///
/// Visitors without a session are redirected to the login page (401 for
/// `/api/` requests); signed-in accounts without the admin role get 403.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub CurrentAdmin);

/// Error returned when the admin guard refuses a request.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin { next: String },
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Signed in, but not as an admin.
    Forbidden { name: String },
}

/// Page shown to signed-in accounts without the admin role.
#[derive(Template)]
#[template(path = "forbidden.html")]
struct ForbiddenTemplate {
    layout: AdminLayout,
    name: String,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => {
                Redirect::to(&format!("/auth/login?next={}", urlencoding::encode(&next)))
                    .into_response()
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden { name } => {
                let page = ForbiddenTemplate {
                    layout: AdminLayout::default(),
                    name,
                };
                let body = page.render().unwrap_or_else(|e| {
                    tracing::error!(error = %e, "Failed to render forbidden page");
                    "Admin access required".to_string()
                });
                (StatusCode::FORBIDDEN, Html(body)).into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let is_api = parts.uri.path().starts_with("/api/");

        let admin = match parts.extensions.get::<Session>() {
            Some(session) => current_admin(session).await,
            None => None,
        };

        let Some(admin) = admin else {
            if is_api {
                return Err(AdminAuthRejection::Unauthorized);
            }
            let next = if parts.method == axum::http::Method::GET {
                parts
                    .uri
                    .path_and_query()
                    .map_or_else(|| parts.uri.path().to_string(), ToString::to_string)
            } else {
                "/".to_string()
            };
            return Err(AdminAuthRejection::RedirectToLogin { next });
        };

        if !admin.role.is_admin() {
            tracing::warn!(customer_id = %admin.id, path = %parts.uri.path(), "Non-admin refused");
            return Err(AdminAuthRejection::Forbidden { name: admin.name });
        }

        Ok(Self(admin))
    }
}

/// Read the signed-in account from the session.
pub async fn current_admin(session: &Session) -> Option<CurrentAdmin> {
    session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
}

/// Helper to set the current admin in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use aurelle_core::{CustomerId, Role};
    use axum::http::{Request, header::LOCATION};
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::backend::AccessToken;

    fn account(role: Role) -> CurrentAdmin {
        CurrentAdmin {
            id: CustomerId::new(3),
            email: "ops@aurelle.ph".to_string(),
            name: "Ops".to_string(),
            role,
            token: AccessToken::new("tok_admin"),
        }
    }

    async fn guard(uri: &str, role: Option<Role>) -> Result<RequireAdmin, AdminAuthRejection> {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        if let Some(role) = role {
            set_current_admin(&session, &account(role)).await.unwrap();
        }
        let mut request = Request::builder().uri(uri).body(()).unwrap();
        request.extensions_mut().insert(session);
        let (mut parts, ()) = request.into_parts();
        RequireAdmin::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_admin_passes() {
        let RequireAdmin(admin) = guard("/orders", Some(Role::Admin)).await.unwrap();
        assert_eq!(admin.name, "Ops");
    }

    #[tokio::test]
    async fn test_guest_redirected_with_next() {
        let response = guard("/orders?status=pending", None)
            .await
            .err()
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/auth/login?next=%2Forders%3Fstatus%3Dpending"
        );
    }

    #[tokio::test]
    async fn test_guest_api_gets_401() {
        let rejection = guard("/api/stats", None).await.err().unwrap();
        assert!(matches!(rejection, AdminAuthRejection::Unauthorized));
    }

    #[tokio::test]
    async fn test_customer_gets_403() {
        let response = guard("/", Some(Role::Customer))
            .await
            .err()
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
