//! Orders, addresses, payment methods and notifications.

use aurelle_core::address::{Address, NewAddress};
use aurelle_core::notification::Notification;
use aurelle_core::order::{Order, PlaceOrder};
use aurelle_core::payment::{NewPaymentMethod, PaymentMethod};
use aurelle_core::{AddressId, NotificationId, OrderId, PaymentMethodId};
use reqwest::Method;
use tracing::instrument;

use super::{AccessToken, ApiError, BackendClient};

impl BackendClient {
    // =========================================================================
    // Orders
    // =========================================================================

    /// Order history, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn list_orders(&self, token: &AccessToken) -> Result<Vec<Order>, ApiError> {
        let mut orders: Vec<Order> = self
            .execute(self.request(Method::GET, "/orders", Some(token)))
            .await?;
        orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        Ok(orders)
    }

    /// A single order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the order does not belong to the customer.
    #[instrument(skip(self, token))]
    pub async fn get_order(&self, token: &AccessToken, id: OrderId) -> Result<Order, ApiError> {
        self.execute(self.request(Method::GET, &format!("/orders/{id}"), Some(token)))
            .await
    }

    /// Place an order. Never retried.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if the backend rejects the order (stock
    /// changed, address removed, ...).
    #[instrument(skip(self, token, order), fields(items = order.items.len()))]
    pub async fn place_order(
        &self,
        token: &AccessToken,
        order: &PlaceOrder,
    ) -> Result<Order, ApiError> {
        let request = self.request(Method::POST, "/orders", Some(token)).json(order);
        self.execute(request).await
    }

    /// Cancel a pending or processing order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if the order can no longer be cancelled.
    #[instrument(skip(self, token))]
    pub async fn cancel_order(&self, token: &AccessToken, id: OrderId) -> Result<Order, ApiError> {
        self.execute(self.request(
            Method::POST,
            &format!("/orders/{id}/cancel"),
            Some(token),
        ))
        .await
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// Saved addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn list_addresses(&self, token: &AccessToken) -> Result<Vec<Address>, ApiError> {
        let mut addresses: Vec<Address> = self
            .execute(self.request(Method::GET, "/addresses", Some(token)))
            .await?;
        addresses.sort_by_key(|a| !a.is_default);
        Ok(addresses)
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, address))]
    pub async fn create_address(
        &self,
        token: &AccessToken,
        address: &NewAddress,
    ) -> Result<Address, ApiError> {
        let request = self
            .request(Method::POST, "/addresses", Some(token))
            .json(address);
        self.execute(request).await
    }

    /// Replace an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, address))]
    pub async fn update_address(
        &self,
        token: &AccessToken,
        id: AddressId,
        address: &NewAddress,
    ) -> Result<Address, ApiError> {
        let request = self
            .request(Method::PUT, &format!("/addresses/{id}"), Some(token))
            .json(address);
        self.execute(request).await
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_address(&self, token: &AccessToken, id: AddressId) -> Result<(), ApiError> {
        self.execute_empty(self.request(Method::DELETE, &format!("/addresses/{id}"), Some(token)))
            .await
    }

    /// Make an address the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn set_default_address(
        &self,
        token: &AccessToken,
        id: AddressId,
    ) -> Result<(), ApiError> {
        self.execute_empty(self.request(
            Method::POST,
            &format!("/addresses/{id}/default"),
            Some(token),
        ))
        .await
    }

    // =========================================================================
    // Payment methods
    // =========================================================================

    /// Saved payment methods, default first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn list_payment_methods(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<PaymentMethod>, ApiError> {
        let mut methods: Vec<PaymentMethod> = self
            .execute(self.request(Method::GET, "/payment-methods", Some(token)))
            .await?;
        methods.sort_by_key(|m| !m.is_default);
        Ok(methods)
    }

    /// Save an already masked payment method.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, method), fields(kind = method.kind.as_str()))]
    pub async fn create_payment_method(
        &self,
        token: &AccessToken,
        method: &NewPaymentMethod,
    ) -> Result<PaymentMethod, ApiError> {
        let request = self
            .request(Method::POST, "/payment-methods", Some(token))
            .json(method);
        self.execute(request).await
    }

    /// Delete a payment method.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_payment_method(
        &self,
        token: &AccessToken,
        id: PaymentMethodId,
    ) -> Result<(), ApiError> {
        self.execute_empty(self.request(
            Method::DELETE,
            &format!("/payment-methods/{id}"),
            Some(token),
        ))
        .await
    }

    /// Make a payment method the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn set_default_payment_method(
        &self,
        token: &AccessToken,
        id: PaymentMethodId,
    ) -> Result<(), ApiError> {
        self.execute_empty(self.request(
            Method::POST,
            &format!("/payment-methods/{id}/default"),
            Some(token),
        ))
        .await
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn list_notifications(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<Notification>, ApiError> {
        let mut notifications: Vec<Notification> = self
            .execute(self.request(Method::GET, "/notifications", Some(token)))
            .await?;
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    /// Mark one notification read.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn mark_notification_read(
        &self,
        token: &AccessToken,
        id: NotificationId,
    ) -> Result<(), ApiError> {
        self.execute_empty(self.request(
            Method::POST,
            &format!("/notifications/{id}/read"),
            Some(token),
        ))
        .await
    }

    /// Mark every notification read.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn mark_all_notifications_read(&self, token: &AccessToken) -> Result<(), ApiError> {
        self.execute_empty(self.request(Method::POST, "/notifications/read-all", Some(token)))
            .await
    }
}
