//! Cart and favorites endpoints. All require a customer token.

use aurelle_core::cart::Cart;
use aurelle_core::favorites::Favorites;
use aurelle_core::ProductId;
use reqwest::Method;
use tracing::instrument;

use super::types::{AddCartItem, FavoriteEntry, ServerCart, UpdateCartItem};
use super::{AccessToken, ApiError, BackendClient};

impl BackendClient {
    // =========================================================================
    // Cart
    // =========================================================================

    /// The customer's server-side cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn get_cart(&self, token: &AccessToken) -> Result<Cart, ApiError> {
        let cart: ServerCart = self
            .execute(self.request(Method::GET, "/cart", Some(token)))
            .await?;
        Ok(Cart::from_lines(cart.items))
    }

    /// Add a quantity of a product to the server cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn add_cart_item(
        &self,
        token: &AccessToken,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/cart/items", Some(token))
            .json(&AddCartItem {
                product_id,
                quantity,
            });
        self.execute_empty(request).await
    }

    /// Set the quantity of a server cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn update_cart_item(
        &self,
        token: &AccessToken,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let request = self
            .request(Method::PUT, &format!("/cart/items/{product_id}"), Some(token))
            .json(&UpdateCartItem { quantity });
        self.execute_empty(request).await
    }

    /// Remove a line from the server cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn remove_cart_item(
        &self,
        token: &AccessToken,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        self.execute_empty(self.request(
            Method::DELETE,
            &format!("/cart/items/{product_id}"),
            Some(token),
        ))
        .await
    }

    /// Empty the server cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn clear_cart(&self, token: &AccessToken) -> Result<(), ApiError> {
        self.execute_empty(self.request(Method::DELETE, "/cart", Some(token)))
            .await
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// The customer's favorited product ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn get_favorites(&self, token: &AccessToken) -> Result<Favorites, ApiError> {
        let entries: Vec<FavoriteEntry> = self
            .execute(self.request(Method::GET, "/favorites", Some(token)))
            .await?;
        Ok(Favorites::from_ids(entries.into_iter().map(|e| e.product_id)))
    }

    /// Mark a product as favorite.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn add_favorite(
        &self,
        token: &AccessToken,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "/favorites", Some(token))
            .json(&FavoriteEntry { product_id });
        self.execute_empty(request).await
    }

    /// Unmark a favorite.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn remove_favorite(
        &self,
        token: &AccessToken,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        self.execute_empty(self.request(
            Method::DELETE,
            &format!("/favorites/{product_id}"),
            Some(token),
        ))
        .await
    }
}
