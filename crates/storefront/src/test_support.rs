//! Fixtures shared by unit tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use aurelle_core::catalog::{Category, Product};
use aurelle_core::{CustomerId, Money, ProductId, Role};
use chrono::{TimeZone, Utc};
use tower_sessions::{MemoryStore, Session};

use crate::backend::{AccessToken, BackendClient};
use crate::config::BackendConfig;
use crate::models::CurrentCustomer;

/// A fresh in-memory session.
pub fn session() -> Session {
    Session::new(None, Arc::new(MemoryStore::default()), None)
}

/// A client pointed at `url` (a wiremock server, or a closed port).
pub fn backend(url: &str) -> BackendClient {
    BackendClient::new(&BackendConfig::new(url, Duration::from_secs(2))).unwrap()
}

/// A client whose every request fails to connect.
pub fn offline_backend() -> BackendClient {
    backend("http://127.0.0.1:9")
}

pub fn customer() -> CurrentCustomer {
    CurrentCustomer {
        id: CustomerId::new(7),
        email: "bea@example.ph".to_string(),
        name: "Bea".to_string(),
        role: Role::Customer,
        token: AccessToken::new("token-7"),
    }
}

pub fn product(id: i32, name: &str, centavos: i64, stock: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        brand: "Aurelle".to_string(),
        description: String::new(),
        category: Category::Unisex,
        size_ml: 50,
        price: Money::from_centavos(centavos),
        stock,
        notes: vec!["sandalwood".to_string()],
        image_url: None,
        created_at: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
    }
}
