//! Account route handlers.
//!
//! Every page here requires a signed-in customer; guests are sent to
//! `/auth/login?next=<path>` by [`RequireAuth`].

pub mod addresses;
pub mod notifications;
pub mod orders;
pub mod payment_methods;

use askama::Template;
use askama_web::WebTemplate;
use aurelle_core::notification::unread_count;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use self::orders::OrderView;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{PageLayout, RequireAuth};
use crate::state::AppState;

const RECENT_ORDERS: usize = 3;

/// Account overview template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub layout: PageLayout,
    pub name: String,
    pub email: String,
    pub recent_orders: Vec<OrderView>,
    pub order_count: usize,
    pub default_address: Option<String>,
    pub unread_notifications: usize,
}

/// Display the account overview.
#[instrument(skip(state, layout, customer), fields(customer_id = %customer.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    layout: PageLayout,
) -> Result<impl IntoResponse, AppError> {
    let backend = state.backend();
    let orders = backend.list_orders(&customer.token).await?;
    let addresses = backend.list_addresses(&customer.token).await?;
    let notifications = backend.list_notifications(&customer.token).await?;

    Ok(AccountTemplate {
        layout,
        name: customer.name,
        email: customer.email,
        recent_orders: orders.iter().take(RECENT_ORDERS).map(OrderView::from).collect(),
        order_count: orders.len(),
        default_address: addresses
            .iter()
            .find(|a| a.is_default)
            .map(aurelle_core::address::Address::one_line),
        unread_notifications: unread_count(&notifications),
    })
}
