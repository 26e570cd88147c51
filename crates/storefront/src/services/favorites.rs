//! Favorites service.
//!
//! Guests keep favorites in the session. Customers keep them on the backend
//! with a session mirror; signing in merges the two by union.

use aurelle_core::ProductId;
use aurelle_core::favorites::Favorites;
use tower_sessions::Session;
use tracing::{instrument, warn};

use super::{SyncError, tolerate_outage};
use crate::backend::BackendClient;
use crate::models::{CurrentCustomer, session_keys};

pub struct FavoritesService<'a> {
    backend: &'a BackendClient,
    session: &'a Session,
    customer: Option<&'a CurrentCustomer>,
}

impl<'a> FavoritesService<'a> {
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

    /// The session copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read.
    pub async fn local(&self) -> Result<Favorites, SyncError> {
        Ok(self
            .session
            .get::<Favorites>(session_keys::FAVORITES)
            .await?
            .unwrap_or_default())
    }

    async fn save(&self, favorites: &Favorites) -> Result<(), SyncError> {
        self.session
            .insert(session_keys::FAVORITES, favorites)
            .await?;
        Ok(())
    }

    /// Current favorites, refreshed from the backend for customers.
    ///
    /// # Errors
    ///
    /// Returns an error if the session fails or the backend rejects the token.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Favorites, SyncError> {
        let Some(customer) = self.customer else {
            return self.local().await;
        };

        match self.backend.get_favorites(&customer.token).await {
            Ok(favorites) => {
                self.save(&favorites).await?;
                Ok(favorites)
            }
            Err(e) if e.is_unavailable() => {
                warn!(error = %e, "Backend unavailable, using session favorites");
                self.local().await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Flip a product's favorite state. Returns whether it is now a favorite.
    ///
    /// # Errors
    ///
    /// Returns an error if the session fails or the backend rejects the change.
    #[instrument(skip(self))]
    pub async fn toggle(&self, product_id: ProductId) -> Result<bool, SyncError> {
        let mut favorites = self.local().await?;
        let favorited = favorites.toggle(product_id);

        if let Some(customer) = self.customer {
            let result = if favorited {
                self.backend.add_favorite(&customer.token, product_id).await
            } else {
                self.backend
                    .remove_favorite(&customer.token, product_id)
                    .await
            };
            tolerate_outage(result, "favorites.toggle")?;
        }

        self.save(&favorites).await?;
        Ok(favorited)
    }

    /// Union the guest favorites into the customer's after login.
    ///
    /// # Errors
    ///
    /// Returns an error only if the session cannot be written.
    #[instrument(skip(self, guest), fields(guest_favorites = guest.len()))]
    pub async fn merge_on_login(&self, guest: &Favorites) -> Result<Favorites, SyncError> {
        let Some(customer) = self.customer else {
            return Ok(guest.clone());
        };

        let mut merged = match self.backend.get_favorites(&customer.token).await {
            Ok(server) => server,
            Err(e) => {
                warn!(error = %e, "Could not load server favorites, keeping guest favorites");
                self.save(guest).await?;
                return Ok(guest.clone());
            }
        };

        for product_id in guest.union_missing(&merged) {
            match self.backend.add_favorite(&customer.token, product_id).await {
                Ok(()) => {
                    merged.insert(product_id);
                }
                Err(e) => {
                    warn!(error = %e, %product_id, "Failed to push guest favorite");
                }
            }
        }

        self.save(&merged).await?;
        Ok(merged)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::test_support::{backend, customer, offline_backend, session};

    #[tokio::test]
    async fn test_guest_toggle() {
        let backend = offline_backend();
        let session = session();
        let service = FavoritesService::new(&backend, &session, None);

        assert!(service.toggle(ProductId::new(3)).await.unwrap());
        assert!(service.local().await.unwrap().contains(ProductId::new(3)));
        assert!(!service.toggle(ProductId::new(3)).await.unwrap());
        assert!(service.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_merge_is_a_union() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/favorites"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "product_id": 1 }, { "product_id": 2 }])),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/favorites"))
            .and(body_json(json!({ "product_id": 5 })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend(&server.uri());
        let session = session();
        let customer = customer();
        let guest = Favorites::from_ids([ProductId::new(2), ProductId::new(5)]);

        let merged = FavoritesService::new(&backend, &session, Some(&customer))
            .merge_on_login(&guest)
            .await
            .unwrap();
        assert_eq!(
            merged,
            Favorites::from_ids([1, 2, 5].map(ProductId::new))
        );
    }
}
