//! Service worker, web app manifest and offline fallback page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::filters;
use crate::middleware::PageLayout;
use crate::offline::{ServiceWorker, WebManifest};

const SERVICE_WORKER_ALLOWED: HeaderName = HeaderName::from_static("service-worker-allowed");

/// Offline fallback page template.
///
/// Precached by the service worker, so it renders without session data.
#[derive(Template, WebTemplate)]
#[template(path = "offline.html")]
pub struct OfflineTemplate {
    pub layout: PageLayout,
}

/// Serve `/sw.js`.
///
/// Browsers re-check the worker on navigation; `no-cache` makes that check
/// hit the server so a new build's cache name takes effect.
pub async fn service_worker() -> Response {
    match ServiceWorker::current().render() {
        Ok(script) => (
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/javascript; charset=utf-8"),
                ),
                (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
                (SERVICE_WORKER_ALLOWED, HeaderValue::from_static("/")),
            ],
            script,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render service worker");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Serve `/manifest.webmanifest`.
pub async fn manifest() -> Response {
    (
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/manifest+json"),
        )],
        Json(WebManifest::default()),
    )
        .into_response()
}

/// Serve the offline fallback page.
pub async fn offline() -> impl IntoResponse {
    OfflineTemplate {
        layout: PageLayout::default(),
    }
}
