//! Order management route handlers.

use askama::Template;
use aurelle_core::order::Order;
use aurelle_core::{OrderId, OrderStatus};
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use super::{non_blank, render, short_date};
use crate::backend::ApiError;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{AdminLayout, RequireAdmin, push_flash};
use crate::models::Flash;
use crate::state::AppState;

/// Listing filters.
#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
    /// Order number or customer email.
    pub q: Option<String>,
}

/// Status change form.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// One row in an order table.
#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: OrderId,
    pub number: String,
    pub customer: String,
    pub placed_at: String,
    pub item_count: u32,
    pub total: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub payment: &'static str,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            number: order.number.clone(),
            customer: order
                .customer_email
                .clone()
                .unwrap_or_else(|| "Guest".to_string()),
            placed_at: short_date(order.placed_at),
            item_count: order.item_count(),
            total: order.total.display(),
            status: order.status.as_str(),
            status_label: order.status.label(),
            payment: order.payment_status.label(),
        }
    }
}

/// One line on the order detail page.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub name: String,
    pub brand: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
}

/// Status filter tab or transition button.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Orders list page template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub layout: AdminLayout,
    pub orders: Vec<OrderRow>,
    pub statuses: Vec<StatusOption>,
    pub status_filter: String,
    pub search_query: String,
}

/// Order detail page template.
#[derive(Template)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub layout: AdminLayout,
    pub order: OrderRow,
    pub lines: Vec<OrderLineView>,
    pub subtotal: String,
    pub shipping_fee: String,
    pub shipping_address: String,
    pub payment_label: String,
    pub notes: Option<String>,
    pub customer_id: Option<i32>,
    pub next_statuses: Vec<StatusOption>,
}

/// Status filter, then number/email search. Backend order is kept.
fn filter_orders<'a>(orders: &'a [Order], query: &OrderListQuery) -> Vec<&'a Order> {
    let status = non_blank(query.status.as_deref()).and_then(|s| s.parse::<OrderStatus>().ok());
    let needle = non_blank(query.q.as_deref()).map(str::to_lowercase);

    orders
        .iter()
        .filter(|o| status.is_none_or(|s| o.status == s))
        .filter(|o| {
            needle.as_deref().is_none_or(|n| {
                o.number.to_lowercase().contains(n)
                    || o.customer_email
                        .as_deref()
                        .is_some_and(|e| e.to_lowercase().contains(n))
            })
        })
        .collect()
}

/// Orders list page handler.
///
/// GET /orders
#[instrument(skip(admin, state, layout))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    layout: AdminLayout,
    Query(query): Query<OrderListQuery>,
) -> Result<Html<String>, AppError> {
    let orders = state.client().list_orders(&admin.token).await?;
    let rows = filter_orders(&orders, &query)
        .into_iter()
        .map(OrderRow::from)
        .collect();

    let status_filter = query.status.unwrap_or_default();
    Ok(render(&OrdersIndexTemplate {
        layout,
        orders: rows,
        statuses: OrderStatus::ALL
            .into_iter()
            .map(|s| StatusOption {
                value: s.as_str(),
                label: s.label(),
                selected: s.as_str() == status_filter,
            })
            .collect(),
        status_filter,
        search_query: query.q.unwrap_or_default(),
    }))
}

/// Order detail page handler.
///
/// GET /orders/{id}
#[instrument(skip(admin, state, layout))]
pub async fn show(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    layout: AdminLayout,
    Path(id): Path<OrderId>,
) -> Result<Html<String>, AppError> {
    let order = state.client().get_order(&admin.token, id).await?;

    Ok(render(&OrderShowTemplate {
        layout,
        order: OrderRow::from(&order),
        lines: order
            .items
            .iter()
            .map(|i| OrderLineView {
                name: i.name.clone(),
                brand: i.brand.clone(),
                unit_price: i.unit_price.display(),
                quantity: i.quantity,
                line_total: i.line_total().display(),
            })
            .collect(),
        subtotal: order.subtotal.display(),
        shipping_fee: order.shipping_fee.display(),
        shipping_address: order.shipping_address.clone(),
        payment_label: order.payment_label.clone(),
        notes: order.notes.clone().filter(|n| !n.trim().is_empty()),
        customer_id: order.customer_id.map(|c| c.as_i32()),
        next_statuses: order
            .status
            .next_statuses()
            .into_iter()
            .map(|s| StatusOption {
                value: s.as_str(),
                label: s.label(),
                selected: false,
            })
            .collect(),
    }))
}

/// Move an order along its lifecycle.
///
/// The current status is re-read from the backend so a stale page cannot
/// skip or reverse a step.
///
/// POST /orders/{id}/status
#[instrument(skip(admin, state, session, form), fields(status = %form.status))]
pub async fn update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect, AppError> {
    let back = Redirect::to(&format!("/orders/{id}"));

    let Ok(next) = form.status.parse::<OrderStatus>() else {
        push_flash(&session, Flash::error("Unknown order status")).await;
        return Ok(back);
    };

    let order = state.client().get_order(&admin.token, id).await?;
    if !order.status.can_transition_to(next) {
        warn!(from = %order.status, to = %next, "Refused order status change");
        push_flash(
            &session,
            Flash::error(format!(
                "An order that is {} cannot be marked {}",
                order.status.label().to_lowercase(),
                next.label().to_lowercase()
            )),
        )
        .await;
        return Ok(back);
    }

    match state
        .client()
        .update_order_status(&admin.token, id, next)
        .await
    {
        Ok(updated) => {
            info!(order_id = %id, status = %updated.status, "Order status updated");
            push_flash(
                &session,
                Flash::success(format!("{} is now {}", updated.number, updated.status.label())),
            )
            .await;
        }
        Err(ApiError::Validation(message)) => push_flash(&session, Flash::error(message)).await,
        Err(e) => return Err(e.into()),
    }
    Ok(back)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::dashboard::tests::order;

    fn orders() -> Vec<Order> {
        vec![
            order(1, OrderStatus::Pending, 100, 1),
            order(2, OrderStatus::Shipped, 100, 2),
            order(3, OrderStatus::Pending, 100, 3),
        ]
    }

    fn query(status: Option<&str>, q: Option<&str>) -> OrderListQuery {
        OrderListQuery {
            status: status.map(String::from),
            q: q.map(String::from),
        }
    }

    #[test]
    fn test_filter_by_status() {
        let orders = orders();
        let pending = filter_orders(&orders, &query(Some("pending"), None));
        let ids: Vec<i32> = pending.iter().map(|o| o.id.as_i32()).collect();
        assert_eq!(ids, [1, 3]);
    }

    #[test]
    fn test_blank_filters_show_everything() {
        let orders = orders();
        assert_eq!(filter_orders(&orders, &query(Some(""), Some("  "))).len(), 3);
    }

    #[test]
    fn test_search_by_number_or_email() {
        let orders = orders();
        let by_number = filter_orders(&orders, &query(None, Some("aur-2026-000002")));
        assert_eq!(by_number.len(), 1);
        assert_eq!(by_number[0].id.as_i32(), 2);

        let by_email = filter_orders(&orders, &query(Some("pending"), Some("BUYER3@")));
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email[0].id.as_i32(), 3);
    }

    #[test]
    fn test_row_falls_back_to_guest() {
        let mut o = order(9, OrderStatus::Delivered, 123_450, 4);
        o.customer_email = None;
        let row = OrderRow::from(&o);
        assert_eq!(row.customer, "Guest");
        assert_eq!(row.total, "₱1,234.50");
        assert_eq!(row.placed_at, "Sep 4, 2026");
    }
}
