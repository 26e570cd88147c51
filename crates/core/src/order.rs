//! Orders, shipping fees and checkout validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::Cart;
use crate::catalog::Product;
use crate::types::{
    AddressId, CustomerId, Money, OrderId, OrderStatus, PaymentMethodId, PaymentStatus, ProductId,
};

/// A line on a placed order. Prices are frozen at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// A placed order as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Customer-facing reference, e.g. `AUR-2026-000123`.
    pub number: String,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
    /// Shipping address rendered on one line at order time.
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub payment_label: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub placed_at: DateTime<Utc>,
}

impl Order {
    /// Total number of bottles on the order.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Whether the customer may still cancel.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        self.status.is_cancellable()
    }
}

/// Flat-rate shipping with a free-shipping threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    pub flat_fee: Money,
    pub free_threshold: Money,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            flat_fee: Money::from_centavos(15_000),
            free_threshold: Money::from_centavos(300_000),
        }
    }
}

impl ShippingPolicy {
    /// Shipping fee for a given subtotal. Empty carts ship for free.
    #[must_use]
    pub fn fee_for(&self, subtotal: Money) -> Money {
        if !subtotal.is_positive() || subtotal >= self.free_threshold {
            Money::ZERO
        } else {
            self.flat_fee
        }
    }

    /// How much more the customer must spend for free shipping.
    #[must_use]
    pub fn remaining_for_free(&self, subtotal: Money) -> Option<Money> {
        (subtotal.is_positive() && subtotal < self.free_threshold)
            .then(|| Money::new(self.free_threshold.amount() - subtotal.amount()))
    }
}

/// Price breakdown shown on the cart and checkout pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderQuote {
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
}

impl OrderQuote {
    /// Quote a cart under a shipping policy.
    #[must_use]
    pub fn for_cart(cart: &Cart, policy: &ShippingPolicy) -> Self {
        let subtotal = cart.subtotal();
        let shipping_fee = policy.fee_for(subtotal);
        Self {
            subtotal,
            shipping_fee,
            total: subtotal + shipping_fee,
        }
    }
}

/// Reasons an order cannot be placed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("your cart is empty")]
    EmptyCart,
    #[error("choose a shipping address")]
    MissingAddress,
    #[error("choose a payment method")]
    MissingPaymentMethod,
    #[error("{name} is no longer available")]
    Unavailable { name: String },
    #[error("only {available} left of {name}")]
    InsufficientStock { name: String, available: u32 },
}

/// Checkout form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub address_id: Option<AddressId>,
    #[serde(default)]
    pub payment_method_id: Option<PaymentMethodId>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Order payload sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceOrder {
    pub address_id: AddressId,
    pub payment_method_id: PaymentMethodId,
    pub items: Vec<PlaceOrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One requested line of a [`PlaceOrder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl CheckoutRequest {
    /// Validate against the cart and fresh catalog data.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, checking the cart before the form
    /// fields and stock last.
    pub fn validate(&self, cart: &Cart, products: &[Product]) -> Result<PlaceOrder, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let address_id = self.address_id.ok_or(CheckoutError::MissingAddress)?;
        let payment_method_id = self
            .payment_method_id
            .ok_or(CheckoutError::MissingPaymentMethod)?;

        for line in cart.lines() {
            let product = products
                .iter()
                .find(|p| p.id == line.product_id)
                .ok_or_else(|| CheckoutError::Unavailable {
                    name: line.name.clone(),
                })?;
            if !product.is_in_stock() {
                return Err(CheckoutError::Unavailable {
                    name: line.name.clone(),
                });
            }
            if line.quantity > product.stock {
                return Err(CheckoutError::InsufficientStock {
                    name: line.name.clone(),
                    available: product.stock,
                });
            }
        }

        let notes = self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned);

        Ok(PlaceOrder {
            address_id,
            payment_method_id,
            items: cart
                .lines()
                .iter()
                .map(|l| PlaceOrderItem {
                    product_id: l.product_id,
                    quantity: l.quantity,
                })
                .collect(),
            notes,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::CartLine;
    use crate::catalog::tests::product;

    fn cart_of(products: &[(&Product, u32)]) -> Cart {
        Cart::from_lines(
            products
                .iter()
                .map(|(p, q)| CartLine::from_product(p, *q)),
        )
    }

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            address_id: Some(AddressId::new(1)),
            payment_method_id: Some(PaymentMethodId::new(2)),
            notes: Some("  leave at guardhouse ".to_string()),
        }
    }

    #[test]
    fn test_shipping_fee_threshold() {
        let policy = ShippingPolicy::default();
        assert_eq!(policy.fee_for(Money::ZERO), Money::ZERO);
        assert_eq!(policy.fee_for(Money::from_centavos(299_999)), Money::from_centavos(15_000));
        assert_eq!(policy.fee_for(Money::from_centavos(300_000)), Money::ZERO);
        assert_eq!(
            policy.remaining_for_free(Money::from_centavos(250_000)),
            Some(Money::from_centavos(50_000))
        );
        assert_eq!(policy.remaining_for_free(Money::from_centavos(300_000)), None);
    }

    #[test]
    fn test_quote_total_is_subtotal_plus_shipping() {
        let oud = product(1, "Oud", "Lumen", 120_000, 5);
        let quote = OrderQuote::for_cart(&cart_of(&[(&oud, 2)]), &ShippingPolicy::default());
        assert_eq!(quote.subtotal, Money::from_centavos(240_000));
        assert_eq!(quote.shipping_fee, Money::from_centavos(15_000));
        assert_eq!(quote.total, Money::from_centavos(255_000));
    }

    #[test]
    fn test_validate_builds_order_payload() {
        let oud = product(1, "Oud", "Lumen", 120_000, 5);
        let order = request().validate(&cart_of(&[(&oud, 2)]), &[oud.clone()]).unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items.first().map(|i| i.quantity), Some(2));
        assert_eq!(order.notes.as_deref(), Some("leave at guardhouse"));
    }

    #[test]
    fn test_validate_rejects_empty_cart_first() {
        let empty = CheckoutRequest::default();
        assert_eq!(empty.validate(&Cart::new(), &[]), Err(CheckoutError::EmptyCart));
    }

    #[test]
    fn test_validate_requires_address_and_payment() {
        let oud = product(1, "Oud", "Lumen", 120_000, 5);
        let cart = cart_of(&[(&oud, 1)]);
        let mut req = request();
        req.address_id = None;
        assert_eq!(req.validate(&cart, &[oud.clone()]), Err(CheckoutError::MissingAddress));
        let mut req = request();
        req.payment_method_id = None;
        assert_eq!(
            req.validate(&cart, &[oud]),
            Err(CheckoutError::MissingPaymentMethod)
        );
    }

    #[test]
    fn test_validate_checks_stock() {
        let oud = product(1, "Oud", "Lumen", 120_000, 1);
        let cart = cart_of(&[(&oud, 3)]);
        assert_eq!(
            request().validate(&cart, &[oud]),
            Err(CheckoutError::InsufficientStock {
                name: "Oud".to_string(),
                available: 1
            })
        );
    }

    #[test]
    fn test_validate_rejects_missing_or_sold_out_products() {
        let oud = product(1, "Oud", "Lumen", 120_000, 0);
        let cart = cart_of(&[(&oud, 1)]);
        assert!(matches!(
            request().validate(&cart, &[oud]),
            Err(CheckoutError::Unavailable { .. })
        ));
        assert!(matches!(
            request().validate(&cart, &[]),
            Err(CheckoutError::Unavailable { .. })
        ));
    }
}
