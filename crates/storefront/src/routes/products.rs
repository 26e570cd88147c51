//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use aurelle_core::catalog::{Category, Page, Product, ProductFilter, SortOrder, brands};
use aurelle_core::favorites::Favorites;
use aurelle_core::{Money, ProductId};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAuth, PageLayout};
use crate::services::FavoritesService;
use crate::state::AppState;

/// Number of related products shown on a detail page.
const RELATED_LIMIT: usize = 4;

// =============================================================================
// View Types
// =============================================================================

/// Product card data for grids.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub size: String,
    pub price: String,
    pub image_url: Option<String>,
    pub in_stock: bool,
    pub low_stock: bool,
    pub favorited: bool,
}

impl ProductCardView {
    /// Build a card, marking it favorited when `favorites` holds it.
    #[must_use]
    pub fn new(product: &Product, favorites: &Favorites) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            category: product.category.label().to_string(),
            size: format!("{} ml", product.size_ml),
            price: product.price.display(),
            image_url: product.image_url.clone(),
            in_stock: product.is_in_stock(),
            low_stock: (1..=5).contains(&product.stock),
            favorited: favorites.contains(product.id),
        }
    }
}

/// Full product data for the detail page.
#[derive(Clone)]
pub struct ProductDetailView {
    pub card: ProductCardView,
    pub description: String,
    pub notes: Vec<String>,
    pub stock: u32,
    pub max_quantity: u32,
}

impl ProductDetailView {
    fn new(product: &Product, favorites: &Favorites) -> Self {
        Self {
            card: ProductCardView::new(product, favorites),
            description: product.description.clone(),
            notes: product.notes.clone(),
            stock: product.stock,
            max_quantity: product.stock.min(aurelle_core::cart::MAX_LINE_QUANTITY),
        }
    }
}

/// A `<select>` option.
#[derive(Clone)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

// =============================================================================
// Query Types
// =============================================================================

/// Listing query parameters.
///
/// Kept as raw strings so a malformed value drops that filter instead of
/// rejecting the whole request.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub in_stock: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_price(value: Option<&String>) -> Option<Money> {
    non_empty(value)
        .and_then(|v| v.parse::<Decimal>().ok())
        .filter(|d| !d.is_sign_negative())
        .map(Money::new)
}

impl ListingQuery {
    /// The catalog filter this query describes.
    #[must_use]
    pub fn filter(&self) -> ProductFilter {
        let sort = non_empty(self.sort.as_ref())
            .and_then(|s| SortOrder::ALL.into_iter().find(|o| o.as_str() == s))
            .unwrap_or_default();
        ProductFilter {
            search: non_empty(self.q.as_ref()).map(str::to_owned),
            category: non_empty(self.category.as_ref()).and_then(|c| c.parse::<Category>().ok()),
            brand: non_empty(self.brand.as_ref()).map(str::to_owned),
            min_price: parse_price(self.min_price.as_ref()),
            max_price: parse_price(self.max_price.as_ref()),
            in_stock_only: non_empty(self.in_stock.as_ref()).is_some_and(|v| v != "0"),
            sort,
        }
    }

    /// Requested page number, defaulting to the first.
    #[must_use]
    pub fn page(&self) -> usize {
        non_empty(self.page.as_ref())
            .and_then(|p| p.parse().ok())
            .unwrap_or(1)
    }

    /// Query string for `page`, keeping every active filter.
    #[must_use]
    pub fn page_href(&self, page: usize) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        let params = [
            ("q", &self.q),
            ("category", &self.category),
            ("brand", &self.brand),
            ("min_price", &self.min_price),
            ("max_price", &self.max_price),
            ("in_stock", &self.in_stock),
            ("sort", &self.sort),
        ];
        for (key, value) in params {
            if let Some(value) = non_empty(value.as_ref()) {
                query.append_pair(key, value);
            }
        }
        query.append_pair("page", &page.to_string());
        format!("/products?{}", query.finish())
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: PageLayout,
    pub products: Vec<ProductCardView>,
    pub search: String,
    pub categories: Vec<OptionView>,
    pub brands: Vec<OptionView>,
    pub sorts: Vec<OptionView>,
    pub min_price: String,
    pub max_price: String,
    pub in_stock_only: bool,
    pub total_items: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: PageLayout,
    pub product: ProductDetailView,
    pub related_products: Vec<ProductCardView>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Favorites from the session mirror, for the heart icons.
pub(crate) async fn session_favorites(
    state: &AppState,
    session: &Session,
    auth: &OptionalAuth,
) -> Favorites {
    FavoritesService::new(state.backend(), session, auth.0.as_ref())
        .local()
        .await
        .unwrap_or_default()
}

/// Display product listing page.
#[instrument(skip(state, session, auth, layout))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
    layout: PageLayout,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse, AppError> {
    let catalog = state.backend().list_products().await?;
    let favorites = session_favorites(&state, &session, &auth).await;

    let filter = query.filter();
    let matched = filter.apply(&catalog);
    let page = Page::paginate(&matched, query.page(), Page::<&Product>::DEFAULT_SIZE);

    let categories = Category::ALL
        .into_iter()
        .map(|c| OptionView {
            value: c.as_str().to_string(),
            label: c.label().to_string(),
            selected: filter.category == Some(c),
        })
        .collect();
    let brands = brands(&catalog)
        .into_iter()
        .map(|b| OptionView {
            selected: filter
                .brand
                .as_deref()
                .is_some_and(|f| f.eq_ignore_ascii_case(&b)),
            value: b.clone(),
            label: b,
        })
        .collect();
    let sorts = SortOrder::ALL
        .into_iter()
        .map(|s| OptionView {
            value: s.as_str().to_string(),
            label: s.label().to_string(),
            selected: filter.sort == s,
        })
        .collect();

    Ok(ProductsIndexTemplate {
        layout,
        products: page
            .items
            .iter()
            .map(|p| ProductCardView::new(p, &favorites))
            .collect(),
        search: filter.search.clone().unwrap_or_default(),
        categories,
        brands,
        sorts,
        min_price: filter
            .min_price
            .map(|m| m.amount().to_string())
            .unwrap_or_default(),
        max_price: filter
            .max_price
            .map(|m| m.amount().to_string())
            .unwrap_or_default(),
        in_stock_only: filter.in_stock_only,
        total_items: page.total_items,
        current_page: page.number,
        total_pages: page.total_pages,
        previous_href: page
            .has_previous()
            .then(|| query.page_href(page.number - 1)),
        next_href: page.has_next().then(|| query.page_href(page.number + 1)),
    })
}

/// Related products: same brand or category, most recent first.
fn related<'a>(product: &Product, catalog: &'a [Product]) -> Vec<&'a Product> {
    let mut related: Vec<&Product> = catalog
        .iter()
        .filter(|p| p.id != product.id)
        .filter(|p| p.brand.eq_ignore_ascii_case(&product.brand) || p.category == product.category)
        .collect();
    related.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    related.truncate(RELATED_LIMIT);
    related
}

/// Display product detail page.
#[instrument(skip(state, session, auth, layout))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
    layout: PageLayout,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.backend().get_product(id).await?;
    let favorites = session_favorites(&state, &session, &auth).await;

    // Related products are decoration; a catalog failure leaves them out.
    let related_products = match state.backend().list_products().await {
        Ok(catalog) => related(&product, &catalog)
            .into_iter()
            .map(|p| ProductCardView::new(p, &favorites))
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load related products");
            Vec::new()
        }
    };

    Ok(ProductShowTemplate {
        layout,
        product: ProductDetailView::new(&product, &favorites),
        related_products,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::test_support::product;

    fn query(pairs: &str) -> ListingQuery {
        let uri: axum::http::Uri = format!("/products?{pairs}").parse().unwrap();
        Query::<ListingQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_filter_from_query() {
        let filter = query("q=oud&category=women&min_price=1000&sort=price_high_low&in_stock=1")
            .filter();
        assert_eq!(filter.search.as_deref(), Some("oud"));
        assert_eq!(filter.category, Some(Category::Women));
        assert_eq!(filter.min_price, Some(Money::from_centavos(100_000)));
        assert_eq!(filter.sort, SortOrder::PriceHighLow);
        assert!(filter.in_stock_only);
    }

    #[test]
    fn test_malformed_values_are_ignored() {
        let q = query("category=perfume&min_price=cheap&sort=random&page=two&q=");
        let filter = q.filter();
        assert_eq!(filter, ProductFilter::default());
        assert_eq!(q.page(), 1);
    }

    #[test]
    fn test_page_href_keeps_filters() {
        let q = query("q=santal+noir&brand=Aurelle&page=1");
        assert_eq!(
            q.page_href(2),
            "/products?q=santal+noir&brand=Aurelle&page=2"
        );
    }

    #[test]
    fn test_related_excludes_self_and_caps() {
        let catalog: Vec<Product> = (1..=7)
            .map(|i| product(i, &format!("Scent {i}"), 100_000, 3))
            .collect();
        let related = related(&catalog[0], &catalog);
        assert_eq!(related.len(), RELATED_LIMIT);
        assert!(related.iter().all(|p| p.id != catalog[0].id));
    }

    #[test]
    fn test_card_marks_favorites() {
        let p = product(3, "Santal Noir", 250_000, 0);
        let card = ProductCardView::new(&p, &Favorites::from_ids([ProductId::new(3)]));
        assert!(card.favorited);
        assert!(!card.in_stock);
        assert_eq!(card.price, "₱2,500.00");
    }
}
