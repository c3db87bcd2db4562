//! Catalog and its derived view
//!
//! The catalog is the full product list as loaded. The view is the filtered,
//! sorted subsequence currently selected, plus transient pagination state that
//! is reset every time the view is recomputed.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::types::Product;

/// Value that disables the category/subcategory predicate.
pub const ALL: &str = "all";

/// Where the search text is looked for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    #[default]
    Title,
    TitleAndCategory,
}

/// Active filter controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewQuery {
    #[serde(default = "default_all")]
    pub category: String,
    #[serde(default = "default_all")]
    pub subcategory: String,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub scope: SearchScope,
}

fn default_all() -> String {
    ALL.to_string()
}

impl Default for ViewQuery {
    fn default() -> Self {
        Self {
            category: default_all(),
            subcategory: default_all(),
            search: String::new(),
            scope: SearchScope::Title,
        }
    }
}

impl ViewQuery {
    pub fn new(category: &str, subcategory: &str, search: &str) -> Self {
        Self {
            category: normalize_choice(category),
            subcategory: normalize_choice(subcategory),
            search: search.trim().to_string(),
            scope: SearchScope::Title,
        }
    }

    pub fn with_scope(mut self, scope: SearchScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn is_default(&self) -> bool {
        self.category == ALL && self.subcategory == ALL && self.search.is_empty()
    }

    /// Conjunction of the active predicates.
    pub fn matches(&self, product: &Product) -> bool {
        if self.category != ALL && product.category != self.category {
            return false;
        }
        if self.subcategory != ALL && product.subcategory != self.subcategory {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }

        let needle = self.search.to_lowercase();
        product.title.to_lowercase().contains(&needle)
            || (self.scope == SearchScope::TitleAndCategory
                && product.category.to_lowercase().contains(&needle))
    }
}

fn normalize_choice(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        ALL.to_string()
    } else {
        value.to_string()
    }
}

/// Sort order for the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[serde(rename = "price-asc")]
    PriceAsc,
    #[serde(rename = "price-desc")]
    PriceDesc,
    #[serde(rename = "name-asc")]
    NameAsc,
    #[serde(rename = "name-desc")]
    NameDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::PriceAsc,
        SortKey::PriceDesc,
        SortKey::NameAsc,
        SortKey::NameDesc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::PriceAsc => "Price: Low to High",
            SortKey::PriceDesc => "Price: High to Low",
            SortKey::NameAsc => "Name: A to Z",
            SortKey::NameDesc => "Name: Z to A",
        }
    }

    pub fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortKey::PriceAsc => a.price.cmp(&b.price),
            SortKey::PriceDesc => b.price.cmp(&a.price),
            SortKey::NameAsc => compare_titles(&a.title, &b.title),
            SortKey::NameDesc => compare_titles(&b.title, &a.title),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortKey(pub String);

impl fmt::Display for UnknownSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sort key '{}'", self.0)
    }
}

impl std::error::Error for UnknownSortKey {}

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| UnknownSortKey(s.to_string()))
    }
}

/// Dictionary-style title ordering: letters compare case-insensitively first,
/// and lowercase sorts before uppercase on ties.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Catalog plus the currently selected view
#[derive(Debug, Clone)]
pub struct CatalogView {
    products: Vec<Product>,
    /// Indices into `products`, in display order.
    view: Vec<usize>,
    query: ViewQuery,
    sort: Option<SortKey>,
    page_size: Option<usize>,
    expanded: bool,
    loading: bool,
}

impl Default for CatalogView {
    fn default() -> Self {
        Self::new(Vec::new(), None)
    }
}

impl CatalogView {
    pub fn new(products: Vec<Product>, page_size: Option<usize>) -> Self {
        let mut view = Self {
            products: Vec::new(),
            view: Vec::new(),
            query: ViewQuery::default(),
            sort: None,
            page_size,
            expanded: false,
            loading: false,
        };
        view.load(products);
        view
    }

    /// Replace the catalog. Invalid products are logged and skipped; the
    /// current filters and sort are re-applied to the new list.
    pub fn load(&mut self, products: Vec<Product>) -> usize {
        self.products = products
            .into_iter()
            .filter(|p| match p.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!("Skipping product: {}", e);
                    false
                }
            })
            .collect();
        self.recompute();
        debug!("Catalog loaded with {} products", self.products.len());
        self.products.len()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products paired with their catalog position.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &Product)> + '_ {
        self.products.iter().enumerate()
    }

    /// Product at catalog position `position`.
    pub fn get(&self, position: usize) -> Option<&Product> {
        self.products.get(position)
    }

    /// Catalog position of a product borrowed from this view.
    pub fn position_of(&self, product: &Product) -> Option<usize> {
        self.products.iter().position(|p| std::ptr::eq(p, product))
    }

    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    pub fn sort(&self) -> Option<SortKey> {
        self.sort
    }

    pub fn page_size(&self) -> Option<usize> {
        self.page_size
    }

    pub fn set_page_size(&mut self, page_size: Option<usize>) {
        self.page_size = page_size;
        self.expanded = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn find_by_title(&self, title: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.title == title)
    }

    pub fn find_by_id(&self, id: u64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == Some(id))
    }

    /// Apply filters, then the active sort, and collapse pagination.
    pub fn apply_filters(&mut self, query: ViewQuery) {
        self.query = query;
        self.recompute();
    }

    /// Reorder the current view. An unrecognized key leaves the order as is.
    pub fn apply_sort(&mut self, key: &str) {
        match key.parse::<SortKey>() {
            Ok(key) => {
                self.sort = Some(key);
                self.sort_view();
            }
            Err(e) => debug!("Sort ignored: {}", e),
        }
        self.expanded = false;
    }

    /// Reset every control and show the full catalog in catalog order.
    pub fn clear(&mut self) {
        self.query = ViewQuery::default();
        self.sort = None;
        self.recompute();
    }

    /// Reveal the whole view.
    pub fn show_more(&mut self) {
        self.expanded = true;
    }

    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// Every product in the view, in display order.
    pub fn view(&self) -> impl Iterator<Item = &Product> + '_ {
        self.view_entries().map(|(_, p)| p)
    }

    pub fn view_entries(&self) -> impl Iterator<Item = (usize, &Product)> + '_ {
        self.view.iter().map(move |&i| (i, &self.products[i]))
    }

    /// Products currently shown, honoring the page size.
    pub fn visible(&self) -> impl Iterator<Item = &Product> + '_ {
        self.visible_entries().map(|(_, p)| p)
    }

    pub fn visible_entries(&self) -> impl Iterator<Item = (usize, &Product)> + '_ {
        let limit = match (self.expanded, self.page_size) {
            (false, Some(limit)) => limit,
            _ => usize::MAX,
        };
        self.view_entries().take(limit)
    }

    /// Whether a "show more" control belongs under the grid.
    pub fn has_more(&self) -> bool {
        match self.page_size {
            Some(limit) => !self.expanded && self.view.len() > limit,
            None => false,
        }
    }

    /// Up to `count` products flagged as new, in catalog order.
    pub fn featured(&self, count: usize) -> impl Iterator<Item = &Product> + '_ {
        self.featured_entries(count).map(|(_, p)| p)
    }

    pub fn featured_entries(&self, count: usize) -> impl Iterator<Item = (usize, &Product)> + '_ {
        self.entries().filter(|(_, p)| p.is_new).take(count)
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        distinct(self.products.iter().map(|p| p.category.as_str()))
    }

    /// Distinct subcategories in first-seen order.
    pub fn subcategories(&self) -> Vec<&str> {
        distinct(self.products.iter().map(|p| p.subcategory.as_str()))
    }

    fn recompute(&mut self) {
        let query = &self.query;
        self.view = self
            .products
            .iter()
            .enumerate()
            .filter(|(_, p)| query.matches(p))
            .map(|(i, _)| i)
            .collect();
        self.sort_view();
        self.expanded = false;
    }

    fn sort_view(&mut self) {
        if let Some(key) = self.sort {
            let products = &self.products;
            // Stable: ties keep their relative order.
            self.view
                .sort_by(|&a, &b| key.compare(&products[a], &products[b]));
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for v in values {
        if !v.is_empty() && !out.contains(&v) {
            out.push(v);
        }
    }
    out
}
