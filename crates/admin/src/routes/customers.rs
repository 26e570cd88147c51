//! Customer route handlers.

use askama::Template;
use aurelle_core::{CustomerId, Money, OrderStatus};
use aurelle_core::customer::Customer;
use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use serde::Deserialize;
use tracing::instrument;

use super::orders::OrderRow;
use super::{non_blank, render, short_date};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{AdminLayout, RequireAdmin};
use crate::state::AppState;

/// Search query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct CustomerListQuery {
    pub q: Option<String>,
}

/// Customer view for templates.
#[derive(Debug, Clone)]
pub struct CustomerView {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_admin: bool,
    pub orders_count: Option<u32>,
    pub total_spent: Option<String>,
    pub created_at: Option<String>,
}

impl From<&Customer> for CustomerView {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.display_name().to_string(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            is_admin: customer.role.is_admin(),
            orders_count: customer.order_count,
            total_spent: customer.total_spent.map(|m| m.display()),
            created_at: customer.created_at.map(short_date),
        }
    }
}

/// Customers list page template.
#[derive(Template)]
#[template(path = "customers/index.html")]
pub struct CustomersIndexTemplate {
    pub layout: AdminLayout,
    pub customers: Vec<CustomerView>,
    pub search_query: String,
}

/// Customer detail page template.
#[derive(Template)]
#[template(path = "customers/show.html")]
pub struct CustomerShowTemplate {
    pub layout: AdminLayout,
    pub customer: CustomerView,
    pub orders: Vec<OrderRow>,
    pub lifetime_total: String,
}

/// Customers list page handler.
///
/// GET /customers
#[instrument(skip(admin, state, layout))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    layout: AdminLayout,
    Query(query): Query<CustomerListQuery>,
) -> Result<Html<String>, AppError> {
    let customers = state.client().list_customers(&admin.token).await?;
    let needle = non_blank(query.q.as_deref()).unwrap_or_default();

    Ok(render(&CustomersIndexTemplate {
        layout,
        customers: customers
            .iter()
            .filter(|c| c.matches_search(needle))
            .map(CustomerView::from)
            .collect(),
        search_query: query.q.unwrap_or_default(),
    }))
}

/// Customer detail page handler.
///
/// GET /customers/{id}
#[instrument(skip(admin, state, layout))]
pub async fn show(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    layout: AdminLayout,
    Path(id): Path<CustomerId>,
) -> Result<Html<String>, AppError> {
    let client = state.client();
    let (customer, orders) = tokio::try_join!(
        client.get_customer(&admin.token, id),
        client.customer_orders(&admin.token, id)
    )?;

    let lifetime_total: Money = orders
        .iter()
        .filter(|o| o.status != OrderStatus::Cancelled)
        .map(|o| o.total)
        .sum();

    Ok(render(&CustomerShowTemplate {
        layout,
        customer: CustomerView::from(&customer),
        orders: orders.iter().map(OrderRow::from).collect(),
        lifetime_total: lifetime_total.display(),
    }))
}
