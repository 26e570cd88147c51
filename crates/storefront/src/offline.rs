//! Service worker and offline support.
//!
//! The worker script is rendered from a template so its cache name changes
//! whenever the stylesheet or script does, which makes `activate` drop the
//! stale caches. The routing table in the script mirrors [`strategy_for`].

use askama::Template;
use axum::http::Method;
use serde::Serialize;

/// How the service worker answers a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheStrategy {
    /// Try the network, fall back to the cache, then the offline page.
    NetworkFirst,
    /// Serve from cache, fetching and storing on a miss.
    CacheFirst,
    /// Never touch the cache.
    NetworkOnly,
}

/// Path prefixes served cache-first.
pub const CACHE_FIRST_PREFIXES: &[&str] = &["/static/"];

/// Exact paths served cache-first.
pub const CACHE_FIRST_PATHS: &[&str] = &["/manifest.webmanifest"];

/// File extensions served cache-first wherever they live.
pub const CACHE_FIRST_EXTENSIONS: &[&str] = &[".png", ".svg", ".ico", ".webp"];

/// Paths the worker must never cache.
pub const NETWORK_ONLY_PATHS: &[&str] = &["/sw.js"];

/// Offline fallback page, precached on install.
pub const OFFLINE_PATH: &str = "/offline";

/// Pick the caching strategy for a request.
#[must_use]
pub fn strategy_for(method: &Method, path: &str) -> CacheStrategy {
    if method != Method::GET || NETWORK_ONLY_PATHS.contains(&path) {
        return CacheStrategy::NetworkOnly;
    }
    let cache_first = CACHE_FIRST_PREFIXES.iter().any(|p| path.starts_with(p))
        || CACHE_FIRST_PATHS.contains(&path)
        || CACHE_FIRST_EXTENSIONS.iter().any(|ext| path.ends_with(ext));
    if cache_first {
        CacheStrategy::CacheFirst
    } else {
        CacheStrategy::NetworkFirst
    }
}

/// Content hash of `static/css/main.css`, computed by the build script.
pub const CSS_HASH: &str = env!("CSS_HASH");

/// Content hash of `static/js/app.js`, computed by the build script.
pub const JS_HASH: &str = env!("JS_HASH");

/// The rendered `sw.js`.
#[derive(Template)]
#[template(path = "sw.js", escape = "none")]
pub struct ServiceWorker {
    pub cache_name: String,
    pub shell_assets: Vec<String>,
    pub offline_path: &'static str,
    pub cache_first_prefixes: &'static [&'static str],
    pub cache_first_paths: &'static [&'static str],
    pub cache_first_extensions: &'static [&'static str],
    pub network_only_paths: &'static [&'static str],
}

impl ServiceWorker {
    /// The worker for this build.
    #[must_use]
    pub fn current() -> Self {
        Self::new(CSS_HASH, JS_HASH)
    }

    /// A worker whose cache name is derived from the asset hashes.
    #[must_use]
    pub fn new(css_hash: &str, js_hash: &str) -> Self {
        Self {
            cache_name: format!(
                "aurelle-{}-{css_hash}{js_hash}",
                env!("CARGO_PKG_VERSION")
            ),
            shell_assets: vec![
                "/".to_string(),
                OFFLINE_PATH.to_string(),
                format!("/static/css/main.css?v={css_hash}"),
                format!("/static/js/app.js?v={js_hash}"),
                "/static/icons/icon.svg".to_string(),
                "/manifest.webmanifest".to_string(),
            ],
            offline_path: OFFLINE_PATH,
            cache_first_prefixes: CACHE_FIRST_PREFIXES,
            cache_first_paths: CACHE_FIRST_PATHS,
            cache_first_extensions: CACHE_FIRST_EXTENSIONS,
            network_only_paths: NETWORK_ONLY_PATHS,
        }
    }
}

/// Web app manifest (`/manifest.webmanifest`).
#[derive(Debug, Serialize)]
pub struct WebManifest {
    pub name: &'static str,
    pub short_name: &'static str,
    pub start_url: &'static str,
    pub scope: &'static str,
    pub display: &'static str,
    pub background_color: &'static str,
    pub theme_color: &'static str,
    pub icons: Vec<ManifestIcon>,
}

#[derive(Debug, Serialize)]
pub struct ManifestIcon {
    pub src: &'static str,
    pub sizes: &'static str,
    #[serde(rename = "type")]
    pub mime_type: &'static str,
    pub purpose: &'static str,
}

impl Default for WebManifest {
    fn default() -> Self {
        Self {
            name: "Aurelle Perfumery",
            short_name: "Aurelle",
            start_url: "/",
            scope: "/",
            display: "standalone",
            background_color: "#faf7f2",
            theme_color: "#3b2f2a",
            icons: vec![ManifestIcon {
                src: "/static/icons/icon.svg",
                sizes: "any",
                mime_type: "image/svg+xml",
                purpose: "any maskable",
            }],
        }
    }
}
