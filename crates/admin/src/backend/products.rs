//! Product management endpoints.

use aurelle_core::ProductId;
use aurelle_core::catalog::Product;
use reqwest::Method;
use tracing::instrument;

use super::{AccessToken, AdminClient, ApiError};
use crate::models::ProductInput;

impl AdminClient {
    /// Every product, including out-of-stock ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn list_products(&self, token: &AccessToken) -> Result<Vec<Product>, ApiError> {
        self.execute(self.request(Method::GET, "/admin/products", Some(token)))
            .await
    }

    /// A single product, for the edit form.
    ///
    /// There is no admin detail endpoint; the public one is used.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown ids.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn get_product(
        &self,
        token: &AccessToken,
        id: ProductId,
    ) -> Result<Product, ApiError> {
        self.execute(self.request(Method::GET, &format!("/products/{id}"), Some(token)))
            .await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if the backend rejects the input.
    #[instrument(skip(self, token, input), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        token: &AccessToken,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let request = self
            .request(Method::POST, "/admin/products", Some(token))
            .json(input);
        self.execute(request).await
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown ids.
    #[instrument(skip(self, token, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        token: &AccessToken,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let request = self
            .request(Method::PUT, &format!("/admin/products/{id}"), Some(token))
            .json(input);
        self.execute(request).await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown ids.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn delete_product(&self, token: &AccessToken, id: ProductId) -> Result<(), ApiError> {
        self.execute_empty(self.request(
            Method::DELETE,
            &format!("/admin/products/{id}"),
            Some(token),
        ))
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aurelle_core::catalog::Category;
    use aurelle_core::Money;
    use rust_decimal::Decimal;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::backend::tests::{client_for, token};

    #[tokio::test]
    async fn test_create_product_sends_input() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/products"))
            .and(body_partial_json(serde_json::json!({
                "name": "Santal Noir",
                "category": "unisex",
                "price": "4250.00"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 31,
                "name": "Santal Noir",
                "brand": "Maison Aurelle",
                "category": "unisex",
                "size_ml": 50,
                "price": "4250.00",
                "stock": 12,
                "created_at": "2026-03-01T00:00:00Z"
            })))
            .mount(&server)
            .await;

        let input = ProductInput {
            name: "Santal Noir".to_string(),
            brand: "Maison Aurelle".to_string(),
            description: String::new(),
            category: Category::Unisex,
            size_ml: 50,
            price: Money::new(Decimal::new(425_000, 2)),
            stock: 12,
            notes: vec![],
            image_url: None,
        };
        let product = client_for(&server)
            .create_product(&token(), &input)
            .await
            .unwrap();
        assert_eq!(product.id, ProductId::new(31));
    }
}
