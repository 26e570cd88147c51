//! Order management endpoints.

use aurelle_core::order::Order;
use aurelle_core::{OrderId, OrderStatus};
use reqwest::Method;
use tracing::instrument;

use super::types::StatusUpdate;
use super::{AccessToken, AdminClient, ApiError};

impl AdminClient {
    /// Every order, newest first as returned by the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn list_orders(&self, token: &AccessToken) -> Result<Vec<Order>, ApiError> {
        self.execute(self.request(Method::GET, "/admin/orders", Some(token)))
            .await
    }

    /// A single order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown ids.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn get_order(&self, token: &AccessToken, id: OrderId) -> Result<Order, ApiError> {
        self.execute(self.request(Method::GET, &format!("/admin/orders/{id}"), Some(token)))
            .await
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if the backend refuses the transition.
    #[instrument(skip(self, token), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        token: &AccessToken,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let request = self
            .request(
                Method::PATCH,
                &format!("/admin/orders/{id}/status"),
                Some(token),
            )
            .json(&StatusUpdate { status });
        self.execute(request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::backend::tests::{client_for, token};

    #[tokio::test]
    async fn test_update_status_patches_order() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/admin/orders/7/status"))
            .and(body_json(serde_json::json!({"status": "shipped"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 7,
                "number": "AUR-2026-000007",
                "status": "shipped",
                "items": [],
                "subtotal": "0",
                "shipping_fee": "0",
                "total": "0",
                "placed_at": "2026-05-04T08:00:00Z"
            })))
            .mount(&server)
            .await;

        let order = client_for(&server)
            .update_order_status(&token(), OrderId::new(7), OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
    }
}
