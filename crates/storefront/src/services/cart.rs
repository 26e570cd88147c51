//! Cart service.
//!
//! The session always holds a copy of the cart. For guests it is the only
//! copy; for signed-in customers it mirrors the backend cart and absorbs
//! mutations while the backend is unreachable.

use aurelle_core::ProductId;
use aurelle_core::cart::{Cart, CartLine, CartReconciliation, reconcile_on_login};
use aurelle_core::catalog::Product;
use tower_sessions::Session;
use tracing::{instrument, warn};

use super::{SyncError, tolerate_outage};
use crate::backend::BackendClient;
use crate::models::{CurrentCustomer, session_keys};

/// Cart operations for one visitor.
pub struct CartService<'a> {
    backend: &'a BackendClient,
    session: &'a Session,
    customer: Option<&'a CurrentCustomer>,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(
        backend: &'a BackendClient,
        session: &'a Session,
        customer: Option<&'a CurrentCustomer>,
    ) -> Self {
        Self {
            backend,
            session,
            customer,
        }
    }

    /// The cart held in the session, without touching the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read.
    pub async fn local(&self) -> Result<Cart, SyncError> {
        Ok(self
            .session
            .get::<Cart>(session_keys::CART)
            .await?
            .unwrap_or_default())
    }

    async fn save(&self, cart: &Cart) -> Result<(), SyncError> {
        self.session.insert(session_keys::CART, cart).await?;
        Ok(())
    }

    /// The current cart. Customers get a fresh copy from the backend, or the
    /// session mirror when the backend is unavailable.
    ///
    /// # Errors
    ///
    /// Returns an error if the session fails or the backend rejects the
    /// request (expired token, for instance).
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Cart, SyncError> {
        let Some(customer) = self.customer else {
            return self.local().await;
        };

        match self.backend.get_cart(&customer.token).await {
            Ok(cart) => {
                self.save(&cart).await?;
                Ok(cart)
            }
            Err(e) if e.is_unavailable() => {
                warn!(error = %e, "Backend unavailable, using session cart");
                self.local().await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Add `quantity` bottles of `product`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session fails or the backend rejects the line.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add(&self, product: &Product, quantity: u32) -> Result<Cart, SyncError> {
        let mut cart = self.local().await?;
        cart.add(CartLine::from_product(product, quantity));

        if let Some(customer) = self.customer {
            tolerate_outage(
                self.backend
                    .add_cart_item(&customer.token, product.id, quantity)
                    .await,
                "cart.add",
            )?;
        }

        self.save(&cart).await?;
        Ok(cart)
    }

    /// Set the quantity of a line. Zero removes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the session fails or the backend rejects the change.
    #[instrument(skip(self))]
    pub async fn update(&self, product_id: ProductId, quantity: u32) -> Result<Cart, SyncError> {
        if quantity == 0 {
            return self.remove(product_id).await;
        }

        let mut cart = self.local().await?;
        cart.set_quantity(product_id, quantity);

        if let Some(customer) = self.customer {
            let quantity = cart.line(product_id).map_or(quantity, |l| l.quantity);
            tolerate_outage(
                self.backend
                    .update_cart_item(&customer.token, product_id, quantity)
                    .await,
                "cart.update",
            )?;
        }

        self.save(&cart).await?;
        Ok(cart)
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the session fails or the backend rejects the change.
    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: ProductId) -> Result<Cart, SyncError> {
        let mut cart = self.local().await?;
        cart.remove(product_id);

        if let Some(customer) = self.customer {
            tolerate_outage(
                self.backend
                    .remove_cart_item(&customer.token, product_id)
                    .await,
                "cart.remove",
            )?;
        }

        self.save(&cart).await?;
        Ok(cart)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session fails or the backend rejects the change.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), SyncError> {
        if let Some(customer) = self.customer {
            tolerate_outage(
                self.backend.clear_cart(&customer.token).await,
                "cart.clear",
            )?;
        }
        self.save(&Cart::new()).await
    }

    /// Fold the guest cart into the customer's server cart after login.
    ///
    /// A non-empty server cart wins. Otherwise the guest lines are pushed one
    /// by one and the session keeps only the lines the backend accepted. The
    /// first failed push stops the merge; that line and the rest come back in
    /// [`CartMerge::unsaved`] so the caller can tell the customer.
    ///
    /// # Errors
    ///
    /// Returns an error only if the session cannot be written.
    #[instrument(skip(self, guest), fields(guest_lines = guest.lines().len()))]
    pub async fn merge_on_login(&self, guest: &Cart) -> Result<CartMerge, SyncError> {
        let Some(customer) = self.customer else {
            return Ok(CartMerge::saved(guest.clone()));
        };

        let server = match self.backend.get_cart(&customer.token).await {
            Ok(cart) => cart,
            Err(e) => {
                warn!(error = %e, "Could not load server cart, keeping guest cart");
                self.save(guest).await?;
                return Ok(CartMerge {
                    cart: guest.clone(),
                    unsaved: guest.lines().to_vec(),
                });
            }
        };

        let merge = match reconcile_on_login(guest, &server) {
            CartReconciliation::KeepServer | CartReconciliation::Nothing => {
                CartMerge::saved(server)
            }
            CartReconciliation::PushGuest(lines) => {
                let mut pushed = Vec::with_capacity(lines.len());
                let mut unsaved = Vec::new();
                let mut pending = lines.into_iter();
                while let Some(line) = pending.next() {
                    if let Err(e) = self
                        .backend
                        .add_cart_item(&customer.token, line.product_id, line.quantity)
                        .await
                    {
                        warn!(
                            error = %e,
                            product_id = %line.product_id,
                            "Failed to push guest cart line"
                        );
                        unsaved.push(line);
                        unsaved.extend(pending.by_ref());
                        break;
                    }
                    pushed.push(line);
                }
                CartMerge {
                    cart: Cart::from_lines(pushed),
                    unsaved,
                }
            }
        };

        self.save(&merge.cart).await?;
        Ok(merge)
    }
}

/// Result of folding a guest cart into an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartMerge {
    /// The cart now held in the session.
    pub cart: Cart,
    /// Guest lines the account did not receive.
    pub unsaved: Vec<CartLine>,
}

impl CartMerge {
    const fn saved(cart: Cart) -> Self {
        Self {
            cart,
            unsaved: Vec::new(),
        }
    }

    /// Bottles from the guest cart that did not make it to the account.
    #[must_use]
    pub fn unsaved_count(&self) -> u32 {
        self.unsaved.iter().map(|l| l.quantity).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use aurelle_core::Money;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::test_support::{backend, customer, offline_backend, product, session};

    fn line(id: i32, centavos: i64, quantity: u32) -> CartLine {
        CartLine::from_product(&product(id, &format!("Eau {id}"), centavos, 10), quantity)
    }

    #[tokio::test]
    async fn test_guest_cart_lives_in_session() {
        let backend = offline_backend();
        let session = session();
        let service = CartService::new(&backend, &session, None);

        service
            .add(&product(1, "Santal Noir", 250_000, 4), 2)
            .await
            .unwrap();
        let cart = service.update(ProductId::new(1), 3).await.unwrap();

        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal(), Money::from_centavos(750_000));
        assert_eq!(service.load().await.unwrap(), cart);
    }

    #[tokio::test]
    async fn test_merge_pushes_guest_lines_into_empty_server_cart() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/cart/items"))
            .respond_with(ResponseTemplate::new(204))
            .expect(2)
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let session = session();
        let customer = customer();
        let guest = Cart::from_lines([line(1, 100_000, 1), line(2, 50_000, 2)]);

        let merge = CartService::new(&backend, &session, Some(&customer))
            .merge_on_login(&guest)
            .await
            .unwrap();
        assert_eq!(merge.cart, guest);
        assert!(merge.unsaved.is_empty());
    }

    #[tokio::test]
    async fn test_merge_reports_lines_the_backend_refused() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/cart/items"))
            .and(body_partial_json(json!({ "product_id": 1 })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/cart/items"))
            .and(body_partial_json(json!({ "product_id": 2 })))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/cart/items"))
            .and(body_partial_json(json!({ "product_id": 3 })))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let session = session();
        let customer = customer();
        let guest = Cart::from_lines([
            line(1, 100_000, 1),
            line(2, 50_000, 2),
            line(3, 75_000, 1),
        ]);

        let merge = CartService::new(&backend, &session, Some(&customer))
            .merge_on_login(&guest)
            .await
            .unwrap();

        assert_eq!(merge.cart, Cart::from_lines([line(1, 100_000, 1)]));
        let unsaved: Vec<_> = merge.unsaved.iter().map(|l| l.product_id).collect();
        assert_eq!(unsaved, [ProductId::new(2), ProductId::new(3)]);
        assert_eq!(merge.unsaved_count(), 3);
        let stored = session.get::<Cart>(session_keys::CART).await.unwrap().unwrap();
        assert_eq!(stored, merge.cart);
    }

    #[tokio::test]
    async fn test_merge_keeps_non_empty_server_cart() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "product_id": 9,
                    "name": "Oud Royale",
                    "brand": "Aurelle",
                    "unit_price": "4200.00",
                    "quantity": 1
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/cart/items"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let session = session();
        let customer = customer();
        let guest = Cart::from_lines([line(1, 100_000, 1)]);

        let merged = CartService::new(&backend, &session, Some(&customer))
            .merge_on_login(&guest)
            .await
            .unwrap()
            .cart;
        assert_eq!(merged.lines().len(), 1);
        assert_eq!(merged.lines()[0].product_id, ProductId::new(9));
    }

    #[tokio::test]
    async fn test_customer_mutation_survives_backend_outage() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/cart/items/1"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let session = session();
        session
            .insert(
                session_keys::CART,
                Cart::from_lines([line(1, 100_000, 1), line(2, 50_000, 1)]),
            )
            .await
            .unwrap();
        let customer = customer();

        let cart = CartService::new(&backend, &session, Some(&customer))
            .remove(ProductId::new(1))
            .await
            .unwrap();
        assert_eq!(cart.item_count(), 1);
    }

    #[tokio::test]
    async fn test_customer_mutation_rejected_by_backend_is_not_saved() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/cart/items/1"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({ "message": "Only 2 left" })),
            )
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let session = session();
        session
            .insert(session_keys::CART, Cart::from_lines([line(1, 100_000, 1)]))
            .await
            .unwrap();
        let customer = customer();
        let service = CartService::new(&backend, &session, Some(&customer));

        let result = service.update(ProductId::new(1), 5).await;
        assert!(matches!(result, Err(SyncError::Backend(_))));
        assert_eq!(service.local().await.unwrap().item_count(), 1);
    }
}
