//! Product catalog: fragrances, filtering, sorting and pagination.
//!
//! The backend returns the whole catalog in one list; the storefront and the
//! admin dashboard narrow it down in memory with [`ProductFilter`].

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Money, ProductId};

/// Who a fragrance is marketed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Men,
    Women,
    Unisex,
}

impl Category {
    /// Every category, in menu order.
    pub const ALL: [Self; 3] = [Self::Women, Self::Men, Self::Unisex];

    /// Wire value (`snake_case`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Men => "men",
            Self::Women => "women",
            Self::Unisex => "unisex",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Men => "For Him",
            Self::Women => "For Her",
            Self::Unisex => "Unisex",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("invalid category: {s}"))
    }
}

/// A fragrance as mirrored from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    /// Bottle size in milliliters.
    pub size_ml: u32,
    pub price: Money,
    pub stock: u32,
    /// Scent notes (e.g. "bergamot", "oud").
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether at least one bottle is available.
    #[must_use]
    pub const fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Case-insensitive match against name, brand and notes.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.brand.to_lowercase().contains(&needle)
            || self
                .notes
                .iter()
                .any(|note| note.to_lowercase().contains(&needle))
    }
}

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    PriceLowHigh,
    PriceHighLow,
    NameAz,
}

impl SortOrder {
    /// Every sort order, in menu order.
    pub const ALL: [Self; 4] = [
        Self::Newest,
        Self::PriceLowHigh,
        Self::PriceHighLow,
        Self::NameAz,
    ];

    /// Wire value used in query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceLowHigh => "price_low_high",
            Self::PriceHighLow => "price_high_low",
            Self::NameAz => "name_az",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Newest => "Newest",
            Self::PriceLowHigh => "Price: Low to High",
            Self::PriceHighLow => "Price: High to Low",
            Self::NameAz => "Name: A-Z",
        }
    }
}

/// Listing filter built from query-string parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub min_price: Option<Money>,
    #[serde(default)]
    pub max_price: Option<Money>,
    #[serde(default)]
    pub in_stock_only: bool,
    #[serde(default)]
    pub sort: SortOrder,
}

impl ProductFilter {
    /// Whether `product` passes every active criterion.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(search) = &self.search
            && !product.matches_search(search)
        {
            return false;
        }
        if let Some(category) = self.category
            && product.category != category
        {
            return false;
        }
        if let Some(brand) = &self.brand
            && !brand.trim().is_empty()
            && !product.brand.eq_ignore_ascii_case(brand.trim())
        {
            return false;
        }
        if let Some(min) = self.min_price
            && product.price < min
        {
            return false;
        }
        if let Some(max) = self.max_price
            && product.price > max
        {
            return false;
        }
        !(self.in_stock_only && !product.is_in_stock())
    }

    /// Filter then sort. The sort is stable so ties keep backend order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let mut matched: Vec<&Product> = products.iter().filter(|p| self.matches(p)).collect();
        match self.sort {
            SortOrder::Newest => matched.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::PriceLowHigh => matched.sort_by(|a, b| a.price.cmp(&b.price)),
            SortOrder::PriceHighLow => matched.sort_by(|a, b| b.price.cmp(&a.price)),
            SortOrder::NameAz => {
                matched.sort_by_key(|p| p.name.to_lowercase());
            }
        }
        matched
    }
}

/// Distinct brands, sorted case-insensitively, for the filter sidebar.
#[must_use]
pub fn brands(products: &[Product]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for product in products {
        let key = product.brand.to_lowercase();
        if seen.insert(key) {
            out.push(product.brand.clone());
        }
    }
    out.sort_by_key(|b| b.to_lowercase());
    out
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Current page, 1-based.
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T: Clone> Page<T> {
    /// Default page size for product grids.
    pub const DEFAULT_SIZE: usize = 12;

    /// Slice `items` into the requested page, clamping out-of-range numbers.
    #[must_use]
    pub fn paginate(items: &[T], requested: usize, size: usize) -> Self {
        let size = size.max(1);
        let total_items = items.len();
        let total_pages = total_items.div_ceil(size).max(1);
        let number = requested.clamp(1, total_pages);
        let items = items
            .iter()
            .skip((number - 1) * size)
            .take(size)
            .cloned()
            .collect();
        Self {
            items,
            number,
            total_pages,
            total_items,
        }
    }

    /// Whether a previous page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// Whether a next page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.total_pages
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
pub(crate) mod tests {
    use chrono::TimeZone;

    use super::*;

    pub(crate) fn product(id: i32, name: &str, brand: &str, centavos: i64, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            brand: brand.to_string(),
            description: String::new(),
            category: Category::Unisex,
            size_ml: 50,
            price: Money::from_centavos(centavos),
            stock,
            notes: vec!["bergamot".to_string()],
            image_url: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
                + chrono::Duration::days(i64::from(id)),
        }
    }

    fn catalog() -> Vec<Product> {
        let mut oud = product(1, "Oud Royale", "Maison Lumen", 450_000, 3);
        oud.category = Category::Men;
        oud.notes = vec!["oud".to_string(), "saffron".to_string()];
        let mut rose = product(2, "Rose Petal", "Fleur", 180_000, 0);
        rose.category = Category::Women;
        let citrus = product(3, "Citrus Veil", "fleur", 120_000, 10);
        vec![oud, rose, citrus]
    }

    #[test]
    fn test_default_filter_sorts_newest_first() {
        let products = catalog();
        let names: Vec<_> = ProductFilter::default()
            .apply(&products)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, ["Citrus Veil", "Rose Petal", "Oud Royale"]);
    }

    #[test]
    fn test_search_covers_notes_case_insensitively() {
        let products = catalog();
        let filter = ProductFilter {
            search: Some("SAFFRON".to_string()),
            ..ProductFilter::default()
        };
        let result = filter.apply(&products);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Oud Royale");
    }

    #[test]
    fn test_price_range_and_stock() {
        let products = catalog();
        let filter = ProductFilter {
            min_price: Some(Money::from_centavos(150_000)),
            in_stock_only: true,
            sort: SortOrder::PriceLowHigh,
            ..ProductFilter::default()
        };
        let result = filter.apply(&products);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, ProductId::new(1));
    }

    #[test]
    fn test_brand_filter_ignores_case() {
        let products = catalog();
        let filter = ProductFilter {
            brand: Some("FLEUR".to_string()),
            sort: SortOrder::NameAz,
            ..ProductFilter::default()
        };
        let names: Vec<_> = filter.apply(&products).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Citrus Veil", "Rose Petal"]);
    }

    #[test]
    fn test_category_filter() {
        let products = catalog();
        let filter = ProductFilter {
            category: Some(Category::Women),
            ..ProductFilter::default()
        };
        assert_eq!(filter.apply(&products).len(), 1);
    }

    #[test]
    fn test_brands_are_deduplicated() {
        assert_eq!(brands(&catalog()), ["Fleur", "Maison Lumen"]);
    }

    #[test]
    fn test_paginate_clamps_pages() {
        let items: Vec<u32> = (1..=25).collect();
        let page = Page::paginate(&items, 3, 12);
        assert_eq!(page.items, [25]);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_previous());
        assert!(!page.has_next());

        let clamped = Page::paginate(&items, 99, 12);
        assert_eq!(clamped.number, 3);

        let first = Page::paginate(&items, 0, 12);
        assert_eq!(first.number, 1);
        assert_eq!(first.items.len(), 12);
    }

    #[test]
    fn test_paginate_empty_has_one_page() {
        let page = Page::<u32>::paginate(&[], 1, 12);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }
}
