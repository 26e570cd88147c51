//! Product management route handlers.

use askama::Template;
use aurelle_core::ProductId;
use aurelle_core::catalog::{Category, Product, ProductFilter, SortOrder};
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use super::{non_blank, render};
use crate::backend::ApiError;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{AdminLayout, RequireAdmin, push_flash};
use crate::models::{Flash, ProductDraft};
use crate::state::AppState;

/// Listing filters.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub q: Option<String>,
    pub category: Option<String>,
}

/// One row in a product table.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub category: &'static str,
    pub size_ml: u32,
    pub price: String,
    pub stock: u32,
    pub low_stock: bool,
}

impl ProductRow {
    #[must_use]
    pub fn new(product: &Product, low_stock_threshold: u32) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            brand: product.brand.clone(),
            category: product.category.label(),
            size_ml: product.size_ml,
            price: product.price.display(),
            stock: product.stock,
            low_stock: product.stock <= low_stock_threshold,
        }
    }
}

/// Category choice for filter and form selects.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn category_options(selected: &str) -> Vec<CategoryOption> {
    Category::ALL
        .into_iter()
        .map(|c| CategoryOption {
            value: c.as_str(),
            label: c.label(),
            selected: c.as_str() == selected,
        })
        .collect()
}

/// Products list page template.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: AdminLayout,
    pub products: Vec<ProductRow>,
    pub total: usize,
    pub search_query: String,
    pub categories: Vec<CategoryOption>,
}

/// Create/edit form template.
#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub layout: AdminLayout,
    pub title: String,
    pub action: String,
    pub draft: ProductDraft,
    pub categories: Vec<CategoryOption>,
    pub error: Option<String>,
    /// Set when editing, for the delete button.
    pub product_id: Option<ProductId>,
}

impl ProductFormTemplate {
    fn new_product(layout: AdminLayout, draft: ProductDraft, error: Option<String>) -> Self {
        Self {
            layout,
            title: "New product".to_string(),
            action: "/products".to_string(),
            categories: category_options(&draft.category),
            draft,
            error,
            product_id: None,
        }
    }

    fn edit_product(
        layout: AdminLayout,
        id: ProductId,
        draft: ProductDraft,
        error: Option<String>,
    ) -> Self {
        Self {
            layout,
            title: format!("Edit {}", draft.name.trim()),
            action: format!("/products/{id}"),
            categories: category_options(&draft.category),
            draft,
            error,
            product_id: Some(id),
        }
    }
}

/// Narrow the catalog by search text and category, sorted by name.
fn filter_products<'a>(products: &'a [Product], query: &ProductListQuery) -> Vec<&'a Product> {
    let filter = ProductFilter {
        search: non_blank(query.q.as_deref()).map(String::from),
        category: non_blank(query.category.as_deref()).and_then(|c| c.parse().ok()),
        sort: SortOrder::NameAz,
        ..ProductFilter::default()
    };
    filter.apply(products)
}

/// Products list page handler.
///
/// GET /products
#[instrument(skip(admin, state, layout))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    layout: AdminLayout,
    Query(query): Query<ProductListQuery>,
) -> Result<Html<String>, AppError> {
    let products = state.client().list_products(&admin.token).await?;
    let threshold = state.config().low_stock_threshold;
    let rows: Vec<ProductRow> = filter_products(&products, &query)
        .into_iter()
        .map(|p| ProductRow::new(p, threshold))
        .collect();

    Ok(render(&ProductsIndexTemplate {
        layout,
        total: rows.len(),
        products: rows,
        search_query: query.q.unwrap_or_default(),
        categories: category_options(query.category.as_deref().unwrap_or_default()),
    }))
}

/// New product form.
///
/// GET /products/new
#[instrument(skip_all)]
pub async fn new(RequireAdmin(_admin): RequireAdmin, layout: AdminLayout) -> Html<String> {
    render(&ProductFormTemplate::new_product(
        layout,
        ProductDraft::default(),
        None,
    ))
}

/// Create a product.
///
/// POST /products
#[instrument(skip(admin, state, session, layout, draft), fields(name = %draft.name))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    layout: AdminLayout,
    Form(draft): Form<ProductDraft>,
) -> Result<Response, AppError> {
    let input = match draft.validate() {
        Ok(input) => input,
        Err(e) => {
            let page = ProductFormTemplate::new_product(layout, draft, Some(e.to_string()));
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&page)).into_response());
        }
    };

    match state.client().create_product(&admin.token, &input).await {
        Ok(product) => {
            info!(product_id = %product.id, "Product created");
            push_flash(&session, Flash::success(format!("Added {}", product.name))).await;
            Ok(Redirect::to("/products").into_response())
        }
        Err(ApiError::Validation(message)) => {
            let page = ProductFormTemplate::new_product(layout, draft, Some(message));
            Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&page)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Edit form, prefilled from the backend.
///
/// GET /products/{id}/edit
#[instrument(skip(admin, state, layout))]
pub async fn edit(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    layout: AdminLayout,
    Path(id): Path<ProductId>,
) -> Result<Html<String>, AppError> {
    let product = state.client().get_product(&admin.token, id).await?;
    Ok(render(&ProductFormTemplate::edit_product(
        layout,
        id,
        ProductDraft::from_product(&product),
        None,
    )))
}

/// Update a product.
///
/// POST /products/{id}
#[instrument(skip(admin, state, session, layout, draft))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    layout: AdminLayout,
    Path(id): Path<ProductId>,
    Form(draft): Form<ProductDraft>,
) -> Result<Response, AppError> {
    let input = match draft.validate() {
        Ok(input) => input,
        Err(e) => {
            let page = ProductFormTemplate::edit_product(layout, id, draft, Some(e.to_string()));
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&page)).into_response());
        }
    };

    match state.client().update_product(&admin.token, id, &input).await {
        Ok(product) => {
            info!(product_id = %id, "Product updated");
            push_flash(&session, Flash::success(format!("Saved {}", product.name))).await;
            Ok(Redirect::to("/products").into_response())
        }
        Err(ApiError::Validation(message)) => {
            let page = ProductFormTemplate::edit_product(layout, id, draft, Some(message));
            Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&page)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a product.
///
/// POST /products/{id}/delete
#[instrument(skip(admin, state, session))]
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Redirect, AppError> {
    match state.client().delete_product(&admin.token, id).await {
        Ok(()) => {
            info!(product_id = %id, "Product deleted");
            push_flash(&session, Flash::success("Product deleted")).await;
        }
        Err(ApiError::NotFound(_)) => {
            push_flash(&session, Flash::error("That product no longer exists")).await;
        }
        Err(ApiError::Validation(message)) => {
            push_flash(&session, Flash::error(message)).await;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to("/products"))
}
