//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use aurelle_core::catalog::{Category, Product, ProductFilter, SortOrder};
use aurelle_core::favorites::Favorites;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use super::products::{ProductCardView, session_favorites};
use crate::filters;
use crate::middleware::{OptionalAuth, PageLayout};
use crate::state::AppState;

const NEW_ARRIVALS: usize = 8;
const SHELF_SIZE: usize = 4;

/// A row of products for one category.
#[derive(Clone)]
pub struct ShelfView {
    pub title: String,
    pub href: String,
    pub products: Vec<ProductCardView>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: PageLayout,
    pub new_arrivals: Vec<ProductCardView>,
    pub shelves: Vec<ShelfView>,
    /// Set when the catalog could not be loaded at all.
    pub catalog_unavailable: bool,
}

fn new_arrivals(catalog: &[Product], favorites: &Favorites) -> Vec<ProductCardView> {
    ProductFilter {
        sort: SortOrder::Newest,
        ..ProductFilter::default()
    }
    .apply(catalog)
    .into_iter()
    .take(NEW_ARRIVALS)
    .map(|p| ProductCardView::new(p, favorites))
    .collect()
}

/// One shelf per category, in-stock products only, newest first.
fn shelves(catalog: &[Product], favorites: &Favorites) -> Vec<ShelfView> {
    Category::ALL
        .into_iter()
        .filter_map(|category| {
            let products: Vec<ProductCardView> = ProductFilter {
                category: Some(category),
                in_stock_only: true,
                ..ProductFilter::default()
            }
            .apply(catalog)
            .into_iter()
            .take(SHELF_SIZE)
            .map(|p| ProductCardView::new(p, favorites))
            .collect();
            (!products.is_empty()).then(|| ShelfView {
                title: category.label().to_string(),
                href: format!("/products?category={}", category.as_str()),
                products,
            })
        })
        .collect()
}

/// Display the home page.
///
/// A backend outage renders the page without products rather than failing.
#[instrument(skip(state, session, auth, layout))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
    layout: PageLayout,
) -> impl IntoResponse {
    let favorites = session_favorites(&state, &session, &auth).await;

    match state.backend().list_products().await {
        Ok(catalog) => HomeTemplate {
            layout,
            new_arrivals: new_arrivals(&catalog, &favorites),
            shelves: shelves(&catalog, &favorites),
            catalog_unavailable: false,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Catalog unavailable for home page");
            HomeTemplate {
                layout,
                new_arrivals: Vec::new(),
                shelves: Vec::new(),
                catalog_unavailable: true,
            }
        }
    }
}
