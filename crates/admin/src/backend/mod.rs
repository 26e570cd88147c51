//! Admin client for the REST backend.
//!
//! Every call after login carries the signed-in admin's bearer token; the
//! backend enforces the admin role on `/admin/*` endpoints as well. Nothing
//! is cached: the dashboard always shows live data.
//!
//! # Example
//!
//! ```rust,ignore
//! use aurelle_admin::backend::AdminClient;
//!
//! let client = AdminClient::new(&config.backend)?;
//! let session = client.login(&email, &password).await?;
//! let orders = client.list_orders(&session.token).await?;
//! ```

mod customers;
mod orders;
mod products;
pub mod types;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::instrument;

use crate::config::BackendConfig;

use types::{AuthSession, LoginRequest, MessageBody};

/// Errors returned by the REST backend client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The bearer token is missing, expired or revoked.
    #[error("Unauthorized")]
    Unauthorized,

    /// The token is valid but lacks the admin role.
    #[error("Forbidden")]
    Forbidden,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend rejected the input.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether the backend could not be reached or failed on its side.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Bearer token issued by the backend at login.
///
/// Stored in the session. Never logged: `Debug` is redacted.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

impl Serialize for AccessToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for AccessToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

// =============================================================================
// AdminClient
// =============================================================================

/// Client for the admin endpoints of the Aurelle REST backend.
///
/// Cheap to clone; all clones share the HTTP connection pool.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl AdminClient {
    /// Create a new admin client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("aurelle-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// Exchange credentials for a bearer token.
    ///
    /// The role check happens in the caller; the backend issues tokens to
    /// customers too.
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

    /// Start a request to `path`, attaching the bearer token when given.
    fn request(&self, method: Method, path: &str, token: Option<&AccessToken>) -> RequestBuilder {
        let url = format!("{}{path}", self.inner.base_url);
        let builder = self.inner.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    /// Send a request and return the raw body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }

        let message = error_message(&body);
        match status {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(message)),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(ApiError::Validation(message))
            }
            _ => {
                tracing::error!(
                    status = %status,
                    body = %body.chars().take(500).collect::<String>(),
                    "Backend returned non-success status"
                );
                Err(ApiError::Status {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    /// Send a request and parse the JSON response.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request whose response body is irrelevant.
    async fn execute_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<MessageBody>(body).map_or_else(
        |_| body.chars().take(200).collect(),
        |parsed| parsed.message,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::time::Duration;

    use aurelle_core::Role;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    pub(crate) fn client_for(server: &MockServer) -> AdminClient {
        AdminClient::new(&BackendConfig::new(&server.uri(), Duration::from_secs(5))).unwrap()
    }

    pub(crate) fn token() -> AccessToken {
        AccessToken::new("tok_admin")
    }

    #[tokio::test]
    async fn test_login_returns_role() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(serde_json::json!({
                "email": "ops@aurelle.ph",
                "password": "Sillage2026"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "tok_admin",
                "customer": {"id": 1, "name": "Ops", "email": "ops@aurelle.ph", "role": "admin"}
            })))
            .mount(&server)
            .await;

        let session = client_for(&server)
            .login("ops@aurelle.ph", "Sillage2026")
            .await
            .unwrap();
        assert_eq!(session.customer.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/orders"))
            .and(header("authorization", "Bearer tok_admin"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "message": "admin role required"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/customers"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(matches!(
            client.list_orders(&token()).await,
            Err(ApiError::Forbidden)
        ));
        let err = client.list_customers(&token()).await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        assert_eq!(format!("{:?}", token()), "AccessToken([REDACTED])");
    }
}
