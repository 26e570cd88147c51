//! Favorite fragrances.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// A set of favorited products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites(BTreeSet<ProductId>);

impl Favorites {
    /// Build a set from product ids.
    #[must_use]
    pub fn from_ids(ids: impl IntoIterator<Item = ProductId>) -> Self {
        Self(ids.into_iter().collect())
    }

    /// Flip the favorite state of a product. Returns the new state.
    pub fn toggle(&mut self, product_id: ProductId) -> bool {
        if self.0.remove(&product_id) {
            false
        } else {
            self.0.insert(product_id);
            true
        }
    }

    /// Mark a product as favorite.
    pub fn insert(&mut self, product_id: ProductId) -> bool {
        self.0.insert(product_id)
    }

    /// Unmark a product.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        self.0.remove(&product_id)
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.0.contains(&product_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Product ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.0.iter().copied()
    }

    /// Ids present here but missing from `server`.
    ///
    /// Signing in merges guest favorites by plain union, so these are the
    /// ids to push to the backend.
    #[must_use]
    pub fn union_missing(&self, server: &Self) -> Vec<ProductId> {
        self.0.difference(&server.0).copied().collect()
    }

    /// Add every id from `other`.
    pub fn extend(&mut self, other: &Self) {
        self.0.extend(other.0.iter().copied());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_state() {
        let mut favorites = Favorites::default();
        assert!(favorites.toggle(ProductId::new(3)));
        assert!(favorites.contains(ProductId::new(3)));
        assert!(!favorites.toggle(ProductId::new(3)));
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_union_missing_returns_guest_only_ids() {
        let guest = Favorites::from_ids([1, 2, 3].map(ProductId::new));
        let server = Favorites::from_ids([2, 4].map(ProductId::new));
        assert_eq!(
            guest.union_missing(&server),
            vec![ProductId::new(1), ProductId::new(3)]
        );

        let mut merged = server;
        merged.extend(&guest);
        assert_eq!(merged.len(), 4);
    }
}
