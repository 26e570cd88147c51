//! Shopping cart arithmetic and guest/server reconciliation.
//!
//! A [`Cart`] is the same shape whether it lives in a guest's session or is
//! mirrored from the backend for a signed-in customer. Totals are always
//! derived from the lines; nothing caches a subtotal.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{Money, ProductId};

/// Most bottles of a single fragrance allowed in one cart.
pub const MAX_LINE_QUANTITY: u32 = 10;

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub brand: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub unit_price: Money,
    pub quantity: u32,
}

impl CartLine {
    /// Build a line from a catalog product.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            brand: product.brand.clone(),
            image_url: product.image_url.clone(),
            unit_price: product.price,
            quantity: quantity.min(MAX_LINE_QUANTITY),
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// A cart: an ordered list of lines with unique product ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from lines, folding duplicate products together.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            cart.add(line);
        }
        cart
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Add a line. An existing line for the same product has its quantity
    /// increased (and its price refreshed). Quantities are capped at
    /// [`MAX_LINE_QUANTITY`]; a zero-quantity add is ignored.
    ///
    /// Returns the resulting quantity for the product.
    pub fn add(&mut self, line: CartLine) -> u32 {
        if line.quantity == 0 {
            return self.line(line.product_id).map_or(0, |l| l.quantity);
        }
        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == line.product_id)
        {
            existing.quantity = existing
                .quantity
                .saturating_add(line.quantity)
                .min(MAX_LINE_QUANTITY);
            existing.unit_price = line.unit_price;
            existing.name = line.name;
            existing.brand = line.brand;
            existing.image_url = line.image_url;
            return existing.quantity;
        }
        let quantity = line.quantity.min(MAX_LINE_QUANTITY);
        self.lines.push(CartLine { quantity, ..line });
        quantity
    }

    /// Set the quantity for a product. Zero removes the line.
    ///
    /// Returns `false` when the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id);
        }
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity.min(MAX_LINE_QUANTITY);
                true
            }
            None => false,
        }
    }

    /// Remove a product. Returns `false` when it was not in the cart.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of bottles.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of every line total.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

/// What to do with a guest cart when its owner signs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartReconciliation {
    /// The server already has a cart; it wins and the guest cart is dropped.
    KeepServer,
    /// The server cart is empty; these guest lines should be pushed to it.
    PushGuest(Vec<CartLine>),
    /// Neither side has anything.
    Nothing,
}

/// Decide how to merge a guest cart into the customer's server cart.
///
/// There is no per-line conflict resolution: a non-empty server cart wins.
#[must_use]
pub fn reconcile_on_login(guest: &Cart, server: &Cart) -> CartReconciliation {
    if !server.is_empty() {
        CartReconciliation::KeepServer
    } else if guest.is_empty() {
        CartReconciliation::Nothing
    } else {
        CartReconciliation::PushGuest(guest.lines().to_vec())
    }
}
