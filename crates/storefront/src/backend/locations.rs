//! PSGC location lookups for the address picker, cached for 24 hours.

use std::sync::Arc;

use aurelle_core::address::Location;
use reqwest::Method;
use tracing::{debug, instrument};

use super::{ApiError, BackendClient};
use crate::services::address_picker::LocationDirectory;

impl BackendClient {
    /// Fetch a location list, caching it by path.
    #[instrument(skip(self))]
    async fn locations(&self, path: String) -> Result<Arc<Vec<Location>>, ApiError> {
        if let Some(cached) = self.inner.locations.get(&path).await {
            debug!("Cache hit for locations");
            return Ok(cached);
        }
        let mut locations: Vec<Location> = self
            .execute(self.request(Method::GET, &path, None))
            .await?;
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        let locations = Arc::new(locations);
        self.inner
            .locations
            .insert(path, Arc::clone(&locations))
            .await;
        Ok(locations)
    }
}

impl LocationDirectory for BackendClient {
    async fn regions(&self) -> Result<Arc<Vec<Location>>, ApiError> {
        self.locations("/locations/regions".to_string()).await
    }

    async fn provinces(&self, region: &str) -> Result<Arc<Vec<Location>>, ApiError> {
        self.locations(format!("/locations/regions/{}/provinces", encode(region)))
            .await
    }

    async fn cities_in_region(&self, region: &str) -> Result<Arc<Vec<Location>>, ApiError> {
        self.locations(format!("/locations/regions/{}/cities", encode(region)))
            .await
    }

    async fn cities_in_province(&self, province: &str) -> Result<Arc<Vec<Location>>, ApiError> {
        self.locations(format!("/locations/provinces/{}/cities", encode(province)))
            .await
    }

    async fn barangays(&self, city: &str) -> Result<Arc<Vec<Location>>, ApiError> {
        self.locations(format!("/locations/cities/{}/barangays", encode(city)))
            .await
    }
}

fn encode(code: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(code)
}
