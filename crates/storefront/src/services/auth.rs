//! Authentication service.
//!
//! Credentials are checked by the REST backend. This service validates input
//! before it leaves the web tier, establishes the session (cycling its id)
//! and folds the guest cart and favorites into the customer's account.

use aurelle_core::address::normalize_mobile;
use aurelle_core::{Email, EmailError, Password, PasswordError};
use thiserror::Error;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use super::{CartService, FavoritesService, SyncError};
use crate::backend::types::AuthSession;
use crate::backend::{ApiError, BackendClient};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_customer, set_current_customer};
use crate::models::{CurrentCustomer, session_keys};

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidEmail(#[from] EmailError),

    #[error("{0}")]
    WeakPassword(#[from] PasswordError),

    #[error("enter a mobile number like 0917 123 4567")]
    InvalidPhone,

    #[error("enter your name")]
    MissingName,

    #[error("incorrect email or password")]
    InvalidCredentials,

    /// Admin accounts use the admin dashboard.
    #[error("this account signs in on the admin dashboard")]
    AdminAccount,

    /// The backend refused the request with a message for the user.
    #[error("{0}")]
    Rejected(String),

    #[error("backend error: {0}")]
    Backend(#[from] ApiError),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AuthError {
    /// Whether the message is meant for the person filling in the form.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Backend(_) | Self::Session(_))
    }
}

impl From<SyncError> for AuthError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Backend(e) => Self::Backend(e),
            SyncError::Session(e) => Self::Session(e),
        }
    }
}

/// Map backend rejections to messages the form can show.
fn rejection(err: ApiError) -> AuthError {
    match err {
        ApiError::Unauthorized => AuthError::InvalidCredentials,
        ApiError::Validation(message) | ApiError::NotFound(message) => {
            AuthError::Rejected(message)
        }
        other => AuthError::Backend(other),
    }
}

/// A customer who just signed in or registered.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub customer: CurrentCustomer,
    /// Bottles from the guest cart that could not be saved to the account.
    pub unsaved_cart_items: u32,
}

/// Registration form input.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Authentication service.
pub struct AuthService<'a> {
    backend: &'a BackendClient,
    session: &'a Session,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(backend: &'a BackendClient, session: &'a Session) -> Self {
        Self { backend, session }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a wrong email/password
    /// pair and `AuthError::AdminAccount` for admin accounts.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<SignedIn, AuthError> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let auth = self
            .backend
            .login(email.as_str(), password)
            .await
            .map_err(rejection)?;
        if auth.role().is_admin() {
            warn!(customer_id = %auth.customer.id, "Admin account tried the storefront login");
            return Err(AuthError::AdminAccount);
        }

        self.establish(auth).await
    }

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, or `AuthError::Rejected`
    /// when the backend refuses (email already registered).
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: &Registration) -> Result<SignedIn, AuthError> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingName);
        }
        let email = Email::parse(&form.email)?;
        let phone = match form.phone.trim() {
            "" => None,
            raw => Some(normalize_mobile(raw).ok_or(AuthError::InvalidPhone)?),
        };
        let password = Password::with_confirmation(&form.password, &form.password_confirmation)?;

        let auth = self
            .backend
            .register(name, email.as_str(), password.expose(), phone.as_deref())
            .await
            .map_err(rejection)?;
        info!(customer_id = %auth.customer.id, "Customer registered");

        self.establish(auth).await
    }

    /// Store the signed-in customer and merge guest state.
    async fn establish(&self, auth: AuthSession) -> Result<SignedIn, AuthError> {
        let guest_cart = CartService::new(self.backend, self.session, None)
            .local()
            .await?;
        let guest_favorites = FavoritesService::new(self.backend, self.session, None)
            .local()
            .await?;

        // New id on privilege change.
        self.session.cycle_id().await?;

        let customer = CurrentCustomer::new(&auth.customer, auth.token);
        set_current_customer(self.session, &customer).await?;

        let cart_merge = CartService::new(self.backend, self.session, Some(&customer))
            .merge_on_login(&guest_cart)
            .await?;
        FavoritesService::new(self.backend, self.session, Some(&customer))
            .merge_on_login(&guest_favorites)
            .await?;

        set_sentry_user(&customer.id, Some(&customer.email));
        add_breadcrumb("auth", "Customer signed in", None);
        info!(customer_id = %customer.id, "Customer signed in");

        Ok(SignedIn {
            customer,
            unsaved_cart_items: cart_merge.unsaved_count(),
        })
    }

    /// Sign out, dropping everything tied to the account.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AuthError> {
        clear_current_customer(self.session).await?;
        self.session
            .remove_value(session_keys::CART)
            .await?;
        self.session
            .remove_value(session_keys::FAVORITES)
            .await?;
        self.session.cycle_id().await?;
        clear_sentry_user();
        Ok(())
    }

    /// Ask for a reset link. Unknown emails look like success.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed email or a backend failure.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        match self.backend.forgot_password(email.as_str()).await {
            Ok(()) | Err(ApiError::NotFound(_)) => Ok(()),
            Err(e) => Err(rejection(e)),
        }
    }

    /// Set a new password with the emailed token.
    ///
    /// # Errors
    ///
    /// Returns a policy error, or `AuthError::Rejected` for an expired token.
    #[instrument(skip_all)]
    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<(), AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::Rejected(
                "this reset link is invalid or has expired".to_string(),
            ));
        }
        let password = Password::with_confirmation(password, confirmation)?;
        self.backend
            .reset_password(token.trim(), password.expose())
            .await
            .map_err(rejection)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aurelle_core::ProductId;
    use aurelle_core::cart::Cart;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::test_support::{backend, offline_backend, product, session};

    fn auth_body(role: &str) -> serde_json::Value {
        json!({
            "token": "tok-123",
            "customer": {
                "id": 42,
                "name": "Bea Santos",
                "email": "bea@example.ph",
                "role": role
            }
        })
    }

    async fn mount_empty_account(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/cart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/favorites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_login_establishes_session_and_merges_guest_cart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("customer")))
            .mount(&server)
            .await;
        mount_empty_account(&server).await;
        Mock::given(method("POST"))
            .and(path("/cart/items"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let session = session();
        CartService::new(&backend, &session, None)
            .add(&product(1, "Santal Noir", 250_000, 4), 1)
            .await
            .unwrap();

        let signed_in = AuthService::new(&backend, &session)
            .login("Bea@Example.ph", "hunter2hunter2")
            .await
            .unwrap();
        let customer = signed_in.customer;

        assert_eq!(customer.name, "Bea Santos");
        assert_eq!(signed_in.unsaved_cart_items, 0);
        let stored = session
            .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, customer.id);
        let cart = session
            .get::<Cart>(session_keys::CART)
            .await
            .unwrap()
            .unwrap();
        assert!(cart.line(ProductId::new(1)).is_some());
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let session = session();
        let result = AuthService::new(&backend, &session)
            .login("bea@example.ph", "wrong-pass1")
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_admin_cannot_sign_in_to_storefront() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("admin")))
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let session = session();
        let result = AuthService::new(&backend, &session)
            .login("bea@example.ph", "hunter2hunter2")
            .await;
        assert!(matches!(result, Err(AuthError::AdminAccount)));
        assert!(
            session
                .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_register_validates_before_calling_backend() {
        let backend = offline_backend();
        let session = session();
        let service = AuthService::new(&backend, &session);

        let mut form = Registration {
            name: "Bea".to_string(),
            email: "bea@example.ph".to_string(),
            phone: "12345".to_string(),
            password: "hunter2hunter2".to_string(),
            password_confirmation: "hunter2hunter2".to_string(),
        };
        assert!(matches!(
            service.register(&form).await,
            Err(AuthError::InvalidPhone)
        ));

        form.phone = String::new();
        form.password_confirmation = "different1".to_string();
        assert!(matches!(
            service.register(&form).await,
            Err(AuthError::WeakPassword(PasswordError::Mismatch))
        ));
    }

    #[tokio::test]
    async fn test_register_surfaces_backend_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({ "message": "Email is already registered" })),
            )
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let session = session();
        let form = Registration {
            name: "Bea".to_string(),
            email: "bea@example.ph".to_string(),
            phone: "0917 123 4567".to_string(),
            password: "hunter2hunter2".to_string(),
            password_confirmation: "hunter2hunter2".to_string(),
        };
        let err = AuthService::new(&backend, &session)
            .register(&form)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Email is already registered");
    }

    #[tokio::test]
    async fn test_forgot_password_hides_unknown_accounts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/forgot-password"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let session = session();
        AuthService::new(&backend, &session)
            .forgot_password("nobody@example.ph")
            .await
            .unwrap();
    }
}
