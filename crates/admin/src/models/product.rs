//! Product form validation.

use aurelle_core::Money;
use aurelle_core::catalog::{Category, Product};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest bottle the shop lists, in milliliters.
pub const MAX_SIZE_ML: u32 = 1000;

/// Why a product form was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductDraftError {
    #[error("Name is required")]
    MissingName,
    #[error("Brand is required")]
    MissingBrand,
    #[error("Choose a category")]
    InvalidCategory,
    #[error("Price must be a number greater than zero")]
    InvalidPrice,
    #[error("Stock must be a whole number, zero or more")]
    InvalidStock,
    #[error("Size must be between 1 and {MAX_SIZE_ML} ml")]
    InvalidSize,
    #[error("Image URL must be an http(s) link")]
    InvalidImageUrl,
}

/// Raw product form fields, as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub size_ml: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock: String,
    /// Comma-separated scent notes.
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub image_url: String,
}

/// Validated product fields sent to the backend on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductInput {
    pub name: String,
    pub brand: String,
    pub description: String,
    pub category: Category,
    pub size_ml: u32,
    pub price: Money,
    pub stock: u32,
    pub notes: Vec<String>,
    pub image_url: Option<String>,
}

impl ProductDraft {
    /// Prefill the edit form from an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            brand: product.brand.clone(),
            description: product.description.clone(),
            category: product.category.as_str().to_string(),
            size_ml: product.size_ml.to_string(),
            price: product.price.amount().to_string(),
            stock: product.stock.to_string(),
            notes: product.notes.join(", "),
            image_url: product.image_url.clone().unwrap_or_default(),
        }
    }

    /// Check every field, reporting the first problem found.
    ///
    /// # Errors
    ///
    /// Returns the first `ProductDraftError` in form order.
    pub fn validate(&self) -> Result<ProductInput, ProductDraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProductDraftError::MissingName);
        }
        let brand = self.brand.trim();
        if brand.is_empty() {
            return Err(ProductDraftError::MissingBrand);
        }
        let category = self
            .category
            .parse::<Category>()
            .map_err(|_| ProductDraftError::InvalidCategory)?;
        let size_ml = self
            .size_ml
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|size| (1..=MAX_SIZE_ML).contains(size))
            .ok_or(ProductDraftError::InvalidSize)?;
        let price = self
            .price
            .trim()
            .trim_start_matches(Money::SYMBOL)
            .replace(',', "")
            .parse::<Decimal>()
            .ok()
            .map(Money::new)
            .filter(Money::is_positive)
            .ok_or(ProductDraftError::InvalidPrice)?;
        let stock = self
            .stock
            .trim()
            .parse::<u32>()
            .map_err(|_| ProductDraftError::InvalidStock)?;

        let image_url = match self.image_url.trim() {
            "" => None,
            raw => {
                let parsed = url::Url::parse(raw).map_err(|_| ProductDraftError::InvalidImageUrl)?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(ProductDraftError::InvalidImageUrl);
                }
                Some(raw.to_string())
            }
        };

        Ok(ProductInput {
            name: name.to_string(),
            brand: brand.to_string(),
            description: self.description.trim().to_string(),
            category,
            size_ml,
            price: Money::new(price.amount().round_dp(2)),
            stock,
            notes: self
                .notes
                .split(',')
                .map(str::trim)
                .filter(|note| !note.is_empty())
                .map(str::to_lowercase)
                .collect(),
            image_url,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: " Ambre Nuit ".to_string(),
            brand: "Maison Aurelle".to_string(),
            description: "Warm amber for evenings.".to_string(),
            category: "women".to_string(),
            size_ml: "100".to_string(),
            price: "₱5,450.00".to_string(),
            stock: "0".to_string(),
            notes: "Amber, Vanilla , ,Tonka".to_string(),
            image_url: String::new(),
        }
    }

    #[test]
    fn test_valid_draft() {
        let input = draft().validate().unwrap();
        assert_eq!(input.name, "Ambre Nuit");
        assert_eq!(input.category, Category::Women);
        assert_eq!(input.price, Money::from_centavos(545_000));
        assert_eq!(input.stock, 0);
        assert_eq!(input.notes, vec!["amber", "vanilla", "tonka"]);
        assert_eq!(input.image_url, None);
    }

    #[test]
    fn test_required_text_fields() {
        let mut d = draft();
        d.name = "  ".to_string();
        assert_eq!(d.validate(), Err(ProductDraftError::MissingName));
        let mut d = draft();
        d.brand = String::new();
        assert_eq!(d.validate(), Err(ProductDraftError::MissingBrand));
    }

    #[test]
    fn test_price_must_be_positive() {
        for bad in ["0", "-10", "abc", ""] {
            let mut d = draft();
            d.price = bad.to_string();
            assert_eq!(d.validate(), Err(ProductDraftError::InvalidPrice), "{bad}");
        }
    }

    #[test]
    fn test_stock_cannot_be_negative() {
        let mut d = draft();
        d.stock = "-1".to_string();
        assert_eq!(d.validate(), Err(ProductDraftError::InvalidStock));
    }

    #[test]
    fn test_size_bounds() {
        let mut d = draft();
        d.size_ml = "0".to_string();
        assert_eq!(d.validate(), Err(ProductDraftError::InvalidSize));
        d.size_ml = "1001".to_string();
        assert_eq!(d.validate(), Err(ProductDraftError::InvalidSize));
        d.size_ml = "1000".to_string();
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_image_url_scheme() {
        let mut d = draft();
        d.image_url = "javascript:alert(1)".to_string();
        assert_eq!(d.validate(), Err(ProductDraftError::InvalidImageUrl));
        d.image_url = "https://cdn.aurelle.ph/ambre.jpg".to_string();
        assert_eq!(
            d.validate().unwrap().image_url.as_deref(),
            Some("https://cdn.aurelle.ph/ambre.jpg")
        );
    }
}
