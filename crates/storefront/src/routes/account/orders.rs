//! Order history route handlers.

use askama::Template;
use askama_web::WebTemplate;
use aurelle_core::OrderId;
use aurelle_core::order::Order;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use tracing::{info, instrument};

use crate::backend::ApiError;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{PageLayout, RequireAuth, push_flash};
use crate::models::Flash;
use crate::state::AppState;

/// Order line display data.
#[derive(Clone)]
pub struct OrderItemView {
    pub name: String,
    pub brand: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// Order display data for templates.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub number: String,
    pub status: String,
    pub status_class: String,
    pub payment_status: String,
    pub placed_at: String,
    pub item_count: u32,
    pub items: Vec<OrderItemView>,
    pub subtotal: String,
    pub shipping_fee: String,
    pub total: String,
    pub shipping_address: String,
    pub payment_label: String,
    pub notes: Option<String>,
    pub cancellable: bool,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            number: order.number.clone(),
            status: order.status.label().to_string(),
            status_class: order.status.as_str().to_string(),
            payment_status: order.payment_status.label().to_string(),
            placed_at: order.placed_at.format("%b %-d, %Y").to_string(),
            item_count: order.item_count(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemView {
                    name: item.name.clone(),
                    brand: item.brand.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price.display(),
                    line_total: item.line_total().display(),
                })
                .collect(),
            subtotal: order.subtotal.display(),
            shipping_fee: order.shipping_fee.display(),
            total: order.total.display(),
            shipping_address: order.shipping_address.clone(),
            payment_label: order.payment_label.clone(),
            notes: order.notes.clone().filter(|n| !n.trim().is_empty()),
            cancellable: order.is_cancellable(),
        }
    }
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub layout: PageLayout,
    pub orders: Vec<OrderView>,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "account/order.html")]
pub struct OrderTemplate {
    pub layout: PageLayout,
    pub order: OrderView,
}

/// Display the order history, newest first.
#[instrument(skip(state, layout, customer), fields(customer_id = %customer.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    layout: PageLayout,
) -> Result<impl IntoResponse, AppError> {
    let orders = state.backend().list_orders(&customer.token).await?;
    Ok(OrdersTemplate {
        layout,
        orders: orders.iter().map(OrderView::from).collect(),
    })
}

/// Display one order.
#[instrument(skip(state, layout, customer), fields(customer_id = %customer.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    layout: PageLayout,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse, AppError> {
    let order = state.backend().get_order(&customer.token, id).await?;
    Ok(OrderTemplate {
        layout,
        order: OrderView::from(&order),
    })
}

/// Cancel a pending or processing order.
#[instrument(skip(state, session, customer), fields(customer_id = %customer.id))]
pub async fn cancel(
    State(state): State<AppState>,
    session: tower_sessions::Session,
    RequireAuth(customer): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Redirect, AppError> {
    let back = Redirect::to(&format!("/account/orders/{id}"));
    let order = state.backend().get_order(&customer.token, id).await?;

    if !order.is_cancellable() {
        push_flash(
            &session,
            Flash::error(format!(
                "Order {} is already {} and can no longer be cancelled",
                order.number,
                order.status.label().to_lowercase()
            )),
        )
        .await;
        return Ok(back);
    }

    match state.backend().cancel_order(&customer.token, id).await {
        Ok(cancelled) => {
            info!(order_number = %cancelled.number, "Order cancelled by customer");
            add_breadcrumb("orders", "Order cancelled", Some(&[("order", cancelled.number.as_str())]));
            push_flash(
                &session,
                Flash::success(format!("Order {} has been cancelled", cancelled.number)),
            )
            .await;
            Ok(back)
        }
        Err(ApiError::Validation(message)) => {
            push_flash(&session, Flash::error(message)).await;
            Ok(back)
        }
        Err(e) => Err(e.into()),
    }
}
