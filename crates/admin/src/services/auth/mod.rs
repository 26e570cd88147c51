//! Admin authentication service.
//!
//! Credentials are checked by the REST backend. The dashboard only keeps the
//! returned token and role in its own session; the role itself is enforced
//! per request by [`RequireAdmin`](crate::middleware::RequireAdmin).

mod error;

pub use error::AdminAuthError;

use aurelle_core::Email;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::backend::{AdminClient, ApiError};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    client: &'a AdminClient,
    session: &'a Session,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(client: &'a AdminClient, session: &'a Session) -> Self {
        Self { client, session }
    }

    /// Sign in with email and password.
    ///
    /// Accounts without the admin role are signed in too, and then refused
    /// page by page with 403.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` for a wrong email/password
    /// pair.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentAdmin, AdminAuthError> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(AdminAuthError::InvalidCredentials);
        }

        let auth = match self.client.login(email.as_str(), password).await {
            Ok(auth) => auth,
            Err(ApiError::Unauthorized | ApiError::Validation(_) | ApiError::NotFound(_)) => {
                return Err(AdminAuthError::InvalidCredentials);
            }
            Err(ApiError::RateLimited(secs)) => return Err(AdminAuthError::RateLimited(secs)),
            Err(e) => return Err(e.into()),
        };

        // New id on privilege change.
        self.session.cycle_id().await?;

        let admin = CurrentAdmin {
            id: auth.customer.id,
            email: auth.customer.email.clone(),
            name: auth.customer.display_name().to_string(),
            role: auth.customer.role,
            token: auth.token,
        };
        set_current_admin(self.session, &admin).await?;

        if admin.role.is_admin() {
            set_sentry_user(&admin.id, Some(&admin.email));
            info!(admin_id = %admin.id, "Admin signed in");
        } else {
            warn!(customer_id = %admin.id, "Non-admin account signed in to the dashboard");
        }

        Ok(admin)
    }

    /// Sign out.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AdminAuthError> {
        clear_current_admin(self.session).await?;
        self.session.cycle_id().await?;
        clear_sentry_user();
        Ok(())
    }
}
