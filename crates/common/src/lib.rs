//! Storefront Common Library
//!
//! Catalog view, shopping cart, view models and region rendering shared by
//! the storefront web server.

pub mod cart;
pub mod catalog;
pub mod error;
pub mod render;
pub mod seed;
pub mod source;
pub mod storefront;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use cart::{Cart, CartTotals, LineItem, MAX_QUANTITY};
pub use catalog::{CatalogView, SearchScope, SortKey, ViewQuery};
pub use error::{Error, Result};
pub use render::{RegionId, Surface};
pub use source::{CatalogSource, FilterParams, ProductFetcher, StaticFetcher};
pub use storefront::{Event, Storefront, StorefrontOptions};
pub use types::*;

/// Storefront version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
