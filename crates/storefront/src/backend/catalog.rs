//! Product endpoints, cached.

use std::sync::Arc;

use aurelle_core::ProductId;
use aurelle_core::catalog::Product;
use reqwest::Method;
use tracing::{debug, instrument, warn};

use super::cache::{CacheKey, CacheValue};
use super::{ApiError, BackendClient};

impl BackendClient {
    /// The whole catalog.
    ///
    /// Served from cache for 5 minutes. When the backend is unavailable the
    /// last list fetched in the past 24 hours is returned instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails and no fallback list exists.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        match self
            .execute::<Vec<Product>>(self.request(Method::GET, "/products", None))
            .await
        {
            Ok(products) => {
                let products = Arc::new(products);
                self.inner
                    .cache
                    .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
                    .await;
                self.inner
                    .last_known_good
                    .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
                    .await;
                Ok(products)
            }
            Err(e) if e.is_unavailable() => {
                if let Some(CacheValue::Products(stale)) =
                    self.inner.last_known_good.get(&CacheKey::Products).await
                {
                    warn!(error = %e, "Backend unavailable, serving last known product list");
                    return Ok(stale);
                }
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown ids.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        match self
            .execute::<Product>(self.request(Method::GET, &format!("/products/{id}"), None))
            .await
        {
            Ok(product) => {
                self.inner
                    .cache
                    .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
                    .await;
                Ok(product)
            }
            Err(e) if e.is_unavailable() => {
                if let Some(CacheValue::Products(stale)) =
                    self.inner.last_known_good.get(&CacheKey::Products).await
                    && let Some(product) = stale.iter().find(|p| p.id == id)
                {
                    warn!(error = %e, "Backend unavailable, serving cached product");
                    return Ok(product.clone());
                }
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch the given products, skipping ids the catalog no longer has.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    pub async fn products_by_ids(
        &self,
        ids: impl IntoIterator<Item = ProductId>,
    ) -> Result<Vec<Product>, ApiError> {
        let catalog = self.list_products().await?;
        Ok(ids
            .into_iter()
            .filter_map(|id| catalog.iter().find(|p| p.id == id).cloned())
            .collect())
    }

    /// Drop cached catalog entries so the next read goes to the backend.
    pub async fn invalidate_products(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
