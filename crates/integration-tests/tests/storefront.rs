//! Storefront flows driven over HTTP against a fake backend.

#![allow(clippy::unwrap_used)]

use aurelle_integration_tests::{auth_session_json, product_json, spawn_storefront};
use reqwest::StatusCode;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, LOCATION};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_guest_cart_totals_follow_added_lines() {
    let app = spawn_storefront().await;
    Mock::given(method("GET"))
        .and(path("/products/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json(
            1,
            "Ambre Nuit",
            "3500.00",
            5,
        )))
        .mount(&app.backend)
        .await;

    let resp = app
        .post_form_json("/cart/add", &[("product_id", "1"), ("quantity", "2")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["item_count"], 2);
    assert_eq!(body["subtotal"], "₱7,000.00");

    // The badge endpoint reads the same session copy.
    let resp = app.get("/api/cart/summary").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["item_count"], 2);
    assert_eq!(body["subtotal"], "₱7,000.00");
}

#[tokio::test]
async fn test_adding_beyond_stock_is_refused() {
    let app = spawn_storefront().await;
    Mock::given(method("GET"))
        .and(path("/products/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json(
            3,
            "Vetiver Sec",
            "2800.00",
            2,
        )))
        .mount(&app.backend)
        .await;

    let resp = app
        .post_form_json("/cart/add", &[("product_id", "3"), ("quantity", "3")])
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Only 2 left of Vetiver Sec");

    let body: Value = app.get("/api/cart/summary").await.json().await.unwrap();
    assert_eq!(body["item_count"], 0);
}

#[tokio::test]
async fn test_oversized_quantity_is_capped_not_overflowed() {
    let app = spawn_storefront().await;
    Mock::given(method("GET"))
        .and(path("/products/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json(
            3,
            "Vetiver Sec",
            "2800.00",
            5,
        )))
        .mount(&app.backend)
        .await;

    let resp = app
        .post_form_json("/cart/add", &[("product_id", "3"), ("quantity", "1")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .post_form_json(
            "/cart/add",
            &[("product_id", "3"), ("quantity", "4294967295")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "You can have at most 10 of Vetiver Sec in your cart");

    let resp = app
        .post_form_json("/cart/add", &[("product_id", "3"), ("quantity", "4")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["item_count"], 5);
}

#[tokio::test]
async fn test_updating_beyond_stock_is_refused() {
    let app = spawn_storefront().await;
    Mock::given(method("GET"))
        .and(path("/products/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json(
            3,
            "Vetiver Sec",
            "2800.00",
            2,
        )))
        .mount(&app.backend)
        .await;

    app.post_form_json("/cart/add", &[("product_id", "3"), ("quantity", "1")])
        .await;

    let resp = app
        .post_form_json("/cart/update", &[("product_id", "3"), ("quantity", "9")])
        .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Only 2 left of Vetiver Sec");

    let body: Value = app.get("/api/cart/summary").await.json().await.unwrap();
    assert_eq!(body["item_count"], 1);

    let resp = app
        .post_form_json("/cart/update", &[("product_id", "3"), ("quantity", "2")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["item_count"], 2);
    assert_eq!(body["subtotal"], "₱5,600.00");
}

#[tokio::test]
async fn test_guest_checkout_redirects_to_login() {
    let app = spawn_storefront().await;

    let resp = app.get("/checkout").await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(LOCATION).unwrap(),
        "/auth/login?next=%2Fcheckout"
    );
}

#[tokio::test]
async fn test_service_worker_is_served_uncached_at_root_scope() {
    let app = spawn_storefront().await;

    let resp = app.get("/sw.js").await;

    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert!(
        headers
            .get(CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("application/javascript")
    );
    assert_eq!(headers.get(CACHE_CONTROL).unwrap(), "no-cache");
    assert_eq!(headers.get("service-worker-allowed").unwrap(), "/");
}

#[tokio::test]
async fn test_login_pushes_guest_cart_and_favorites() {
    let app = spawn_storefront().await;
    Mock::given(method("GET"))
        .and(path("/products/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json(
            1,
            "Ambre Nuit",
            "3500.00",
            5,
        )))
        .mount(&app.backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(auth_session_json(7, "bea@example.ph", "customer")),
        )
        .mount(&app.backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .and(header("authorization", "Bearer token-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&app.backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/cart/items"))
        .and(body_json(json!({ "product_id": 1, "quantity": 2 })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "product_id": 4 }])))
        .mount(&app.backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/favorites"))
        .and(body_json(json!({ "product_id": 2 })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/favorites"))
        .and(body_json(json!({ "product_id": 9 })))
        .respond_with(ResponseTemplate::new(204))
        .mount(&app.backend)
        .await;

    app.post_form_json("/cart/add", &[("product_id", "1"), ("quantity", "2")])
        .await;
    let resp = app
        .post_form_json("/favorites/toggle", &[("product_id", "2")])
        .await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["favorited"], true);

    let resp = app
        .post_form(
            "/auth/login",
            &[
                ("email", "bea@example.ph"),
                ("password", "correct horse"),
                ("next", "/cart"),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(LOCATION).unwrap(), "/cart");

    let body: Value = app.get("/api/cart/summary").await.json().await.unwrap();
    assert_eq!(body["item_count"], 2);
    assert_eq!(body["subtotal"], "₱7,000.00");

    let resp = app
        .post_form_json("/favorites/toggle", &[("product_id", "9")])
        .await;
    let body: Value = resp.json().await.unwrap();
    // 2 from the guest, 4 from the server, and 9 just now.
    assert_eq!(body["count"], 3);
}
