//! Checkout: quote, validation against fresh catalog data, placement.
//!
//! Placing an order never falls back to local state. If the backend is down
//! the customer sees the error and their cart stays as it was.

use aurelle_core::address::Address;
use aurelle_core::cart::Cart;
use aurelle_core::order::{CheckoutError, CheckoutRequest, Order, OrderQuote, ShippingPolicy};
use aurelle_core::payment::PaymentMethod;
use thiserror::Error;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use super::{CartService, SyncError};
use crate::backend::{ApiError, BackendClient};
use crate::error::{AppError, add_breadcrumb};
use crate::models::CurrentCustomer;

/// Why an order could not be placed.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// The cart or the form failed validation; shown to the customer.
    #[error(transparent)]
    Invalid(#[from] CheckoutError),
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl From<ApiError> for PlaceOrderError {
    fn from(err: ApiError) -> Self {
        Self::Sync(SyncError::Backend(err))
    }
}

impl From<PlaceOrderError> for AppError {
    fn from(err: PlaceOrderError) -> Self {
        match err {
            PlaceOrderError::Invalid(e) => Self::BadRequest(e.to_string()),
            PlaceOrderError::Sync(e) => e.into(),
        }
    }
}

/// Everything the checkout page shows.
#[derive(Debug, Clone)]
pub struct CheckoutSummary {
    pub cart: Cart,
    pub quote: OrderQuote,
    pub addresses: Vec<Address>,
    pub payment_methods: Vec<PaymentMethod>,
}

pub struct CheckoutService<'a> {
    backend: &'a BackendClient,
    session: &'a Session,
    customer: &'a CurrentCustomer,
    shipping: &'a ShippingPolicy,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(
        backend: &'a BackendClient,
        session: &'a Session,
        customer: &'a CurrentCustomer,
        shipping: &'a ShippingPolicy,
    ) -> Self {
        Self {
            backend,
            session,
            customer,
            shipping,
        }
    }

    const fn cart(&self) -> CartService<'a> {
        CartService::new(self.backend, self.session, Some(self.customer))
    }

    /// Cart, totals and the customer's saved addresses and payment methods.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart or the saved details cannot be loaded.
    #[instrument(skip(self), fields(customer_id = %self.customer.id))]
    pub async fn summary(&self) -> Result<CheckoutSummary, SyncError> {
        let cart = self.cart().load().await?;
        let quote = OrderQuote::for_cart(&cart, self.shipping);
        let addresses = self.backend.list_addresses(&self.customer.token).await?;
        let payment_methods = self
            .backend
            .list_payment_methods(&self.customer.token)
            .await?;

        Ok(CheckoutSummary {
            cart,
            quote,
            addresses,
            payment_methods,
        })
    }

    /// Validate the cart against fresh product data and place the order.
    ///
    /// On success the cart is cleared locally and, best-effort, on the
    /// backend.
    ///
    /// # Errors
    ///
    /// Returns `PlaceOrderError::Invalid` for an empty cart, missing
    /// selections or stock problems, and `PlaceOrderError::Sync` when the
    /// backend refuses or is unreachable.
    #[instrument(skip(self, request), fields(customer_id = %self.customer.id))]
    pub async fn place_order(&self, request: &CheckoutRequest) -> Result<Order, PlaceOrderError> {
        let cart = self.cart().load().await?;

        self.backend.invalidate_products().await;
        let products = self.backend.list_products().await?;
        let order = request.validate(&cart, &products)?;

        let placed = self
            .backend
            .place_order(&self.customer.token, &order)
            .await?;
        info!(order_number = %placed.number, total = %placed.total, "Order placed");
        add_breadcrumb("checkout", "Order placed", Some(&[("order", placed.number.as_str())]));

        if let Err(e) = self.cart().clear().await {
            warn!(error = %e, "Failed to clear cart after placing order");
        }
        self.backend.invalidate_products().await;

        Ok(placed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aurelle_core::cart::CartLine;
    use aurelle_core::{AddressId, PaymentMethodId};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::models::session_keys;
    use crate::test_support::{backend, customer, product, session};

    fn product_json(id: i32, stock: u32) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Santal Noir",
            "brand": "Aurelle",
            "category": "unisex",
            "size_ml": 50,
            "price": "2500.00",
            "stock": stock,
            "created_at": "2026-03-01T00:00:00Z"
        })
    }

    async fn mount_cart(server: &MockServer, quantity: u32) {
        Mock::given(method("GET"))
            .and(path("/cart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "product_id": 1,
                    "name": "Santal Noir",
                    "brand": "Aurelle",
                    "unit_price": "2500.00",
                    "quantity": quantity
                }]
            })))
            .mount(server)
            .await;
    }

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            address_id: Some(AddressId::new(3)),
            payment_method_id: Some(PaymentMethodId::new(4)),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_insufficient_stock_blocks_order() {
        let server = MockServer::start().await;
        mount_cart(&server, 3).await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(1, 2)])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let session = session();
        let customer = customer();
        let shipping = ShippingPolicy::default();

        let result = CheckoutService::new(&backend, &session, &customer, &shipping)
            .place_order(&request())
            .await;
        assert!(matches!(
            result,
            Err(PlaceOrderError::Invalid(CheckoutError::InsufficientStock { available: 2, .. }))
        ));
    }

    #[tokio::test]
    async fn test_successful_order_clears_cart() {
        let server = MockServer::start().await;
        mount_cart(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(1, 5)])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 100,
                "number": "AUR-000100",
                "status": "pending",
                "payment_status": "unpaid",
                "items": [{
                    "product_id": 1,
                    "name": "Santal Noir",
                    "brand": "Aurelle",
                    "unit_price": "2500.00",
                    "quantity": 1
                }],
                "subtotal": "2500.00",
                "shipping_fee": "150.00",
                "total": "2650.00",
                "shipping_address": "12 Mabini St, Lahug, Cebu City",
                "payment_label": "Cash on delivery",
                "placed_at": "2026-03-02T08:00:00Z"
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/cart"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let session = session();
        let customer = customer();
        let shipping = ShippingPolicy::default();

        let order = CheckoutService::new(&backend, &session, &customer, &shipping)
            .place_order(&request())
            .await
            .unwrap();
        assert_eq!(order.number, "AUR-000100");
        let cart = session
            .get::<Cart>(session_keys::CART)
            .await
            .unwrap()
            .unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_backend_outage_during_placement_keeps_cart() {
        let server = MockServer::start().await;
        mount_cart(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(1, 5)])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let session = session();
        let customer = customer();
        let shipping = ShippingPolicy::default();

        let result = CheckoutService::new(&backend, &session, &customer, &shipping)
            .place_order(&request())
            .await;
        assert!(matches!(result, Err(PlaceOrderError::Sync(SyncError::Backend(_)))));
        let cart = session
            .get::<Cart>(session_keys::CART)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            cart,
            Cart::from_lines([CartLine::from_product(&product(1, "Santal Noir", 250_000, 5), 1)])
        );
    }
}
