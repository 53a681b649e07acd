//! Product records and the illustrative listing interface.
//!
//! Products are external, read-only data from the cart's perspective. The
//! listing interface accepts filter and sort parameters and returns product
//! records; it is not exercised by any real backend, so the bundled
//! implementation serves from memory.

use futures::future::BoxFuture;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unique identifier for a product
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new `ProductId` from a string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalog product. Immutable from the cart's perspective.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,
    /// Display name
    pub name: String,
    /// Brand name
    pub brand: String,
    /// Category slug
    pub category: String,
    /// Suitable age range
    pub age_range: String,
    /// Primary image
    pub image_url: String,
    /// Image gallery
    pub images: Vec<String>,
    /// Current unit price
    pub price: Decimal,
    /// Original (list) price
    pub original_price: Decimal,
    /// Newly added to the catalog
    pub is_new: bool,
    /// Currently discounted
    pub is_on_sale: bool,
    /// Long-form description
    pub description: String,
    /// Feature bullet points
    pub features: Vec<String>,
}

impl Product {
    /// Creates a product with the given identity and price; remaining fields
    /// default to empty and can be filled with struct update syntax.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            brand: String::new(),
            category: String::new(),
            age_range: String::new(),
            image_url: String::new(),
            images: Vec::new(),
            price,
            original_price: price,
            is_new: false,
            is_on_sale: false,
            description: String::new(),
            features: Vec::new(),
        }
    }
}

/// Inclusive price bounds for filtering
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lower bound, if any
    pub min: Option<Decimal>,
    /// Upper bound, if any
    pub max: Option<Decimal>,
}

impl PriceRange {
    fn contains(&self, price: Decimal) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }
}

/// Filter parameters for a product listing. Empty collections mean "any".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Restrict to these brands
    pub brands: Vec<String>,
    /// Restrict to this category
    pub category: Option<String>,
    /// Restrict to these age ranges
    pub age_ranges: Vec<String>,
    /// Restrict to this price range
    pub price: PriceRange,
}

impl ProductFilter {
    fn matches(&self, product: &Product) -> bool {
        (self.brands.is_empty() || self.brands.contains(&product.brand))
            && self.category.as_ref().is_none_or(|c| *c == product.category)
            && (self.age_ranges.is_empty() || self.age_ranges.contains(&product.age_range))
            && self.price.contains(product.price)
    }
}

/// Sort order for a product listing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    /// Catalog order
    #[default]
    Featured,
    /// New arrivals first
    Newest,
    /// Cheapest first
    PriceLowToHigh,
    /// Most expensive first
    PriceHighToLow,
}

/// A product listing request: filter plus sort
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Filter parameters
    pub filter: ProductFilter,
    /// Sort order
    pub sort: SortBy,
}

/// Errors from the product listing interface
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// The listing backend could not be reached
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// The product listing interface.
///
/// Uses explicit boxed-future returns instead of `async fn` so environments
/// can hold `Arc<dyn ProductCatalog>`.
pub trait ProductCatalog: Send + Sync {
    /// List products matching the query, in the query's sort order
    fn list(&self, query: ProductQuery) -> BoxFuture<'static, Result<Vec<Product>, CatalogError>>;
}

/// In-memory catalog applying filter and sort locally
#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog {
    products: Vec<Product>,
}

impl MemoryCatalog {
    /// Creates a catalog serving the given products
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }
}

impl ProductCatalog for MemoryCatalog {
    fn list(&self, query: ProductQuery) -> BoxFuture<'static, Result<Vec<Product>, CatalogError>> {
        let products = self.products.clone();
        Box::pin(async move {
            let mut matched: Vec<Product> = products
                .into_iter()
                .filter(|p| query.filter.matches(p))
                .collect();

            match query.sort {
                SortBy::Featured => {},
                SortBy::Newest => matched.sort_by_key(|p| !p.is_new),
                SortBy::PriceLowToHigh => matched.sort_by_key(|p| p.price),
                SortBy::PriceHighToLow => {
                    matched.sort_by_key(|p| p.price);
                    matched.reverse();
                },
            }

            Ok(matched)
        })
    }
}
