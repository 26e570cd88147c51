//! Admin dashboard access control and stats over HTTP.

#![allow(clippy::unwrap_used)]

use aurelle_core::Money;
use aurelle_integration_tests::{TestApp, auth_session_json, product_json, spawn_admin};
use reqwest::StatusCode;
use reqwest::header::LOCATION;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn sign_in(app: &TestApp, id: i32, email: &str, role: &str) -> reqwest::Response {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_session_json(id, email, role)))
        .mount(&app.backend)
        .await;
    app.post_form(
        "/auth/login",
        &[("email", email), ("password", "hunter2hunter2"), ("next", "/")],
    )
    .await
}

fn order_json(id: i32, status: &str, total: &str) -> Value {
    json!({
        "id": id,
        "number": format!("AUR-2026-{id:06}"),
        "customer_id": 7,
        "customer_email": "bea@example.ph",
        "status": status,
        "payment_status": "paid",
        "items": [{
            "product_id": 1,
            "name": "Ambre Nuit",
            "brand": "Maison Aurelle",
            "unit_price": total,
            "quantity": 1
        }],
        "subtotal": total,
        "shipping_fee": "0.00",
        "total": total,
        "shipping_address": "12 Mabini St, Brgy. San Antonio, Makati City, NCR",
        "payment_label": "Visa ending 4242",
        "placed_at": "2026-09-14T08:30:00Z"
    })
}

#[tokio::test]
async fn test_guest_is_sent_to_login() {
    let app = spawn_admin().await;

    let resp = app.get("/orders?status=pending").await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(LOCATION).unwrap(),
        "/auth/login?next=%2Forders%3Fstatus%3Dpending"
    );
}

#[tokio::test]
async fn test_guest_api_call_is_unauthorized() {
    let app = spawn_admin().await;

    let resp = app.get("/api/stats").await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customer_account_is_forbidden() {
    let app = spawn_admin().await;

    let resp = sign_in(&app, 7, "bea@example.ph", "customer").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    for page in ["/", "/products", "/orders", "/customers"] {
        let resp = app.get(page).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{page}");
    }
}

#[tokio::test]
async fn test_admin_sees_dashboard_stats() {
    let app = spawn_admin().await;
    Mock::given(method("GET"))
        .and(path("/admin/orders"))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            order_json(1, "pending", "4500.00"),
            order_json(2, "delivered", "3000.00"),
            order_json(3, "cancelled", "9999.00"),
        ])))
        .mount(&app.backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/products"))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            product_json(1, "Ambre Nuit", "4500.00", 12),
            product_json(2, "Vetiver Sec", "3000.00", 3),
        ])))
        .mount(&app.backend)
        .await;

    let resp = sign_in(&app, 1, "owner@aurelle.ph", "admin").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(LOCATION).unwrap(), "/");

    let resp = app.get("/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await.unwrap();
    assert!(html.contains("AUR-2026-000001"));
    assert!(html.contains("Vetiver Sec"));

    let stats: Value = app.get("/api/stats").await.json().await.unwrap();
    assert_eq!(stats["order_count"], 3);
    assert_eq!(stats["pending_count"], 1);
    assert_eq!(stats["product_count"], 2);
    assert_eq!(stats["low_stock_count"], 1);
    let revenue: Money = serde_json::from_value(stats["revenue"].clone()).unwrap();
    assert_eq!(revenue, Money::from_centavos(750_000));
}

#[tokio::test]
async fn test_wrong_password_rerenders_login() {
    let app = spawn_admin().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&app.backend)
        .await;

    let resp = app
        .post_form(
            "/auth/login",
            &[("email", "owner@aurelle.ph"), ("password", "nope")],
        )
        .await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let resp = app.get("/").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}
