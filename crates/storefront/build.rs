//! Build script for storefront crate.
//!
//! Computes content hashes for the stylesheet and the script. Templates
//! append them as `?v=` query strings and the service worker folds them into
//! its cache name, so a changed asset invalidates every cached copy.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    hash_asset("static/css/main.css", "CSS_HASH");
    hash_asset("static/js/app.js", "JS_HASH");
}

/// Hash a static asset and expose the first 8 hex chars as `env!(var)`.
fn hash_asset(relative_path: &str, var: &str) {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let path = Path::new(&manifest_dir).join(relative_path);

    println!("cargo:rerun-if-changed={}", path.display());

    let content = match fs::read(&path) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {relative_path}: {e}");
            println!("cargo:rustc-env={var}=dev");
            return;
        }
    };

    let hash = format!("{:x}", Sha256::digest(&content));
    let short_hash = hash.get(..8).unwrap_or(&hash);
    println!("cargo:rustc-env={var}={short_hash}");
}
