//! Catalog sources
//!
//! A catalog comes either from an embedded list or from one fetch against a
//! product endpoint. [`FilterParams`] carries the `category` / `search` /
//! `sort` query of the filtering endpoint and implements its matching rules.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::catalog::{SortKey, ALL};
use crate::types::Product;
use crate::Result;

/// Query accepted by the product filtering endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    #[serde(default = "default_all")]
    pub category: String,
    #[serde(default)]
    pub search: String,
    #[serde(default = "default_sort")]
    pub sort: String,
}

fn default_all() -> String {
    ALL.to_string()
}

fn default_sort() -> String {
    "default".to_string()
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            category: default_all(),
            search: String::new(),
            sort: default_sort(),
        }
    }
}

impl FilterParams {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Whether `product` passes the category and search filters.
    ///
    /// `men` and `women` select the `men's` / `women's` category families;
    /// any other category value matches as a case-insensitive substring.
    /// Search matches the title or the category.
    pub fn matches(&self, product: &Product) -> bool {
        let category = product.category.to_lowercase();
        let wanted = self.category.trim().to_lowercase();

        let category_ok = match wanted.as_str() {
            "" | ALL => true,
            "men" => category.starts_with("men's"),
            "women" => category.starts_with("women's"),
            other => category.contains(other),
        };
        if !category_ok {
            return false;
        }

        let search = self.search.trim().to_lowercase();
        search.is_empty()
            || product.title.to_lowercase().contains(&search)
            || category.contains(&search)
    }

    /// Filter then sort. Unknown sort values keep the source order.
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut out: Vec<Product> = products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();
        if let Ok(key) = self.sort.parse::<SortKey>() {
            out.sort_by(|a, b| key.compare(a, b));
        }
        out
    }
}

/// Something that can produce a product list for a query.
#[async_trait]
pub trait ProductFetcher: Send + Sync {
    async fn fetch(&self, params: &FilterParams) -> Result<Vec<Product>>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// In-memory fetcher that applies the filter rules locally.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    products: Vec<Product>,
}

impl StaticFetcher {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl ProductFetcher for StaticFetcher {
    async fn fetch(&self, params: &FilterParams) -> Result<Vec<Product>> {
        Ok(params.apply(&self.products))
    }

    fn describe(&self) -> String {
        format!("static list ({} products)", self.products.len())
    }
}

/// Where the storefront gets its catalog
#[derive(Clone)]
pub enum CatalogSource {
    Embedded(Vec<Product>),
    Remote(Arc<dyn ProductFetcher>),
}

impl CatalogSource {
    pub async fn fetch(&self, params: &FilterParams) -> Result<Vec<Product>> {
        match self {
            CatalogSource::Embedded(products) => Ok(products.clone()),
            CatalogSource::Remote(fetcher) => fetcher.fetch(params).await,
        }
    }
}

impl fmt::Debug for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::Embedded(products) => {
                write!(f, "Embedded({} products)", products.len())
            }
            CatalogSource::Remote(fetcher) => write!(f, "Remote({})", fetcher.describe()),
        }
    }
}
