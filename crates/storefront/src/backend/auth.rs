//! Authentication endpoints.

use aurelle_core::customer::Customer;
use reqwest::Method;
use tracing::instrument;

use super::types::{
    AuthSession, ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
};
use super::{AccessToken, ApiError, BackendClient};

impl BackendClient {
    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for wrong credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        let request = self
            .request(Method::POST, "/auth/login", None)
            .json(&LoginRequest { email, password });
        self.execute(request).await
    }

    /// Create an account. The backend signs the new customer in.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if the email is taken or input is rejected.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        phone: Option<&str>,
    ) -> Result<AuthSession, ApiError> {
        let request = self.request(Method::POST, "/auth/register", None).json(
            &RegisterRequest {
                name,
                email,
                password,
                phone,
            },
        );
        self.execute(request).await
    }

    /// Ask the backend to email a password reset link.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/auth/forgot-password", None)
            .json(&ForgotPasswordRequest { email });
        self.execute_empty(request).await
    }

    /// Set a new password using the token from the reset email.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for an expired or unknown token.
    #[instrument(skip(self, token, password))]
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/auth/reset-password", None)
            .json(&ResetPasswordRequest { token, password });
        self.execute_empty(request).await
    }

    /// The account behind a token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the token is no longer valid.
    #[instrument(skip(self, token))]
    pub async fn me(&self, token: &AccessToken) -> Result<Customer, ApiError> {
        self.execute(self.request(Method::GET, "/auth/me", Some(token)))
            .await
    }
}
