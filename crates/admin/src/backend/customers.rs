//! Customer lookup endpoints.

use aurelle_core::CustomerId;
use aurelle_core::customer::Customer;
use aurelle_core::order::Order;
use reqwest::Method;
use tracing::instrument;

use super::{AccessToken, AdminClient, ApiError};

impl AdminClient {
    /// Every customer account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn list_customers(&self, token: &AccessToken) -> Result<Vec<Customer>, ApiError> {
        self.execute(self.request(Method::GET, "/admin/customers", Some(token)))
            .await
    }

    /// A single customer.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown ids.
    #[instrument(skip(self, token), fields(customer_id = %id))]
    pub async fn get_customer(
        &self,
        token: &AccessToken,
        id: CustomerId,
    ) -> Result<Customer, ApiError> {
        self.execute(self.request(Method::GET, &format!("/admin/customers/{id}"), Some(token)))
            .await
    }

    /// Orders placed by one customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(customer_id = %id))]
    pub async fn customer_orders(
        &self,
        token: &AccessToken,
        id: CustomerId,
    ) -> Result<Vec<Order>, ApiError> {
        self.execute(self.request(
            Method::GET,
            &format!("/admin/customers/{id}/orders"),
            Some(token),
        ))
        .await
    }
}
