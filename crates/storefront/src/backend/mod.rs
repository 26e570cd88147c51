//! REST backend client.
//!
//! # Architecture
//!
//! - The backend is the source of truth; nothing is synced locally
//! - JSON over HTTPS, bearer token per customer request
//! - In-memory caching via `moka` for the catalog (5 minutes) and PSGC
//!   locations (24 hours), plus a last-known-good product list served when
//!   the backend is down
//!
//! # Example
//!
//! ```rust,ignore
//! use aurelle_storefront::backend::BackendClient;
//!
//! let client = BackendClient::new(&config.backend)?;
//! let products = client.list_products().await?;
//! let session = client.login(&email, &password).await?;
//! let cart = client.get_cart(&session.token).await?;
//! ```

mod account;
mod auth;
mod cache;
mod catalog;
mod locations;
mod shopping;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::config::BackendConfig;

use cache::{CacheKey, CacheValue};
use types::MessageBody;

/// Errors returned by the REST backend client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The bearer token is missing, expired or revoked.
    #[error("Unauthorized")]
    Unauthorized,

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
    ///
    /// Local fallbacks only apply to these errors; a 4xx is an answer.
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
// BackendClient
// =============================================================================

/// Client for the Aurelle REST backend.
///
/// Cheap to clone; all clones share the HTTP connection pool and caches.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
    /// Products and product details (5 minutes).
    cache: Cache<CacheKey, CacheValue>,
    /// Last successful product list, served while the backend is down.
    last_known_good: Cache<CacheKey, CacheValue>,
    /// PSGC location lists (24 hours).
    locations: Cache<String, Arc<Vec<aurelle_core::address::Location>>>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend
    /// initialization failure).
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("aurelle-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();
        let last_known_good = Cache::builder()
            .max_capacity(10)
            .time_to_live(Duration::from_secs(24 * 60 * 60))
            .build();
        let locations = Cache::builder()
            .max_capacity(5000)
            .time_to_live(Duration::from_secs(24 * 60 * 60))
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
                last_known_good,
                locations,
            }),
        })
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
///
/// The backend answers errors with `{"message": "..."}`; anything else is
/// passed through, truncated.
fn error_message(body: &str) -> String {
    serde_json::from_str::<MessageBody>(body).map_or_else(
        |_| body.chars().take(200).collect(),
        |parsed| parsed.message,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_unavailable() {
        assert!(
            ApiError::Status {
                status: 503,
                message: String::new()
            }
            .is_unavailable()
        );
        assert!(
            !ApiError::Status {
                status: 409,
                message: String::new()
            }
            .is_unavailable()
        );
        assert!(!ApiError::Unauthorized.is_unavailable());
        assert!(!ApiError::Validation("bad".to_string()).is_unavailable());
    }

    #[test]
    fn test_error_message_prefers_json_message() {
        assert_eq!(error_message(r#"{"message":"Email taken"}"#), "Email taken");
        assert_eq!(error_message("plain failure"), "plain failure");
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("tok_live_abc123");
        assert_eq!(format!("{token:?}"), "AccessToken([REDACTED])");
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, r#""tok_live_abc123""#);
        let back: AccessToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back.expose(), "tok_live_abc123");
    }
}
