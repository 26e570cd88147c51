//! Dashboard route handlers.

use askama::Template;
use axum::{Json, extract::State, response::Html};
use serde::Serialize;
use tracing::instrument;

use super::orders::OrderRow;
use super::products::ProductRow;
use super::render;
use crate::dashboard::DashboardStats;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{AdminLayout, RequireAdmin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Orders in one status, for the status breakdown.
#[derive(Debug, Clone)]
pub struct StatusCountView {
    pub status: &'static str,
    pub label: &'static str,
    pub count: usize,
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: AdminLayout,
    pub revenue: String,
    pub order_count: usize,
    pub pending_count: usize,
    pub product_count: usize,
    pub status_counts: Vec<StatusCountView>,
    pub low_stock: Vec<ProductRow>,
    pub low_stock_threshold: u32,
    pub recent_orders: Vec<OrderRow>,
}

/// Dashboard figures for JSON clients.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub revenue: aurelle_core::Money,
    pub order_count: usize,
    pub pending_count: usize,
    pub product_count: usize,
    pub low_stock_count: usize,
}

async fn compute(state: &AppState, admin: &CurrentAdmin) -> Result<DashboardStats, AppError> {
    let client = state.client();
    let (orders, products) = tokio::try_join!(
        client.list_orders(&admin.token),
        client.list_products(&admin.token)
    )?;
    Ok(DashboardStats::compute(
        &orders,
        &products,
        state.config().low_stock_threshold,
    ))
}

/// Dashboard page handler.
///
/// GET /
#[instrument(skip(admin, state, layout))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    layout: AdminLayout,
) -> Result<Html<String>, AppError> {
    let stats = compute(&state, &admin).await?;
    let threshold = state.config().low_stock_threshold;

    let template = DashboardTemplate {
        layout,
        revenue: stats.revenue.display(),
        order_count: stats.order_count,
        pending_count: stats.pending_count,
        product_count: stats.product_count,
        status_counts: stats
            .status_counts
            .iter()
            .map(|c| StatusCountView {
                status: c.status.as_str(),
                label: c.status.label(),
                count: c.count,
            })
            .collect(),
        low_stock: stats
            .low_stock
            .iter()
            .map(|p| ProductRow::new(p, threshold))
            .collect(),
        low_stock_threshold: threshold,
        recent_orders: stats.recent_orders.iter().map(OrderRow::from).collect(),
    };

    Ok(render(&template))
}

/// Dashboard figures as JSON.
///
/// GET /api/stats
#[instrument(skip(admin, state))]
pub async fn stats(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = compute(&state, &admin).await?;
    Ok(Json(StatsResponse {
        revenue: stats.revenue,
        order_count: stats.order_count,
        pending_count: stats.pending_count,
        product_count: stats.product_count,
        low_stock_count: stats.low_stock.len(),
    }))
}
