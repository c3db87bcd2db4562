//! Storefront state holder
//!
//! Owns the cart and the catalog view. Every user interaction arrives as an
//! [`Event`]; [`Storefront::dispatch`] applies it and re-renders the regions it
//! affects before returning, so the next event always sees the finished state.
//! Failures follow a log-and-continue policy and never reach the caller.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::cart::Cart;
use crate::catalog::{CatalogView, SearchScope, ViewQuery, ALL};
use crate::render::{self, RegionId, Surface};
use crate::source::{CatalogSource, FilterParams};
use crate::types::Product;
use crate::view::{CartView, FilterControlsView, GridView};
use crate::{Error, Result};

/// A user interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Event {
    AddToCart {
        title: String,
        /// Catalog position of the clicked card
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<usize>,
    },
    ChangeQuantity {
        index: usize,
        delta: i32,
    },
    RemoveItem {
        index: usize,
    },
    ApplyFilters {
        #[serde(default = "all")]
        category: String,
        #[serde(default = "all")]
        subcategory: String,
        #[serde(default)]
        search: String,
    },
    ApplySort {
        key: String,
    },
    ShowMore,
    ClearFilters,
}

fn all() -> String {
    ALL.to_string()
}

impl Event {
    /// Regions whose content depends on what this event changes.
    pub fn affected_regions(&self) -> &'static [RegionId] {
        match self {
            Event::AddToCart { .. } | Event::ChangeQuantity { .. } | Event::RemoveItem { .. } => {
                &RegionId::CART
            }
            Event::ApplyFilters { .. } | Event::ApplySort { .. } | Event::ClearFilters => &[
                RegionId::ProductGrid,
                RegionId::ShowMore,
                RegionId::Filters,
            ],
            Event::ShowMore => &[RegionId::ProductGrid, RegionId::ShowMore],
        }
    }
}

/// Display settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontOptions {
    /// Cards shown before "show more"; `None` shows everything.
    pub page_size: Option<usize>,
    /// New arrivals shown on the home page.
    pub featured_count: usize,
    pub search_scope: SearchScope,
}

impl Default for StorefrontOptions {
    fn default() -> Self {
        Self {
            page_size: Some(8),
            featured_count: 8,
            search_scope: SearchScope::Title,
        }
    }
}

/// Cart plus catalog view for one storefront
#[derive(Debug, Clone)]
pub struct Storefront {
    cart: Cart,
    catalog: CatalogView,
    options: StorefrontOptions,
}

impl Storefront {
    pub fn new(products: Vec<Product>, options: StorefrontOptions) -> Self {
        Self {
            cart: Cart::new(),
            catalog: CatalogView::new(products, options.page_size),
            options,
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn catalog(&self) -> &CatalogView {
        &self.catalog
    }

    pub fn options(&self) -> &StorefrontOptions {
        &self.options
    }

    /// Apply `event`, then render its regions into `surface`.
    pub fn dispatch(&mut self, event: &Event, surface: &mut Surface) {
        debug!("Dispatching {:?}", event);
        if let Err(e) = self.apply(event) {
            log_failure(&e);
        }
        self.render(event.affected_regions(), surface);
    }

    /// State mutation only.
    pub fn apply(&mut self, event: &Event) -> Result<()> {
        match event {
            Event::AddToCart { title, position } => {
                self.add_to_cart(title, *position).map(|_| ())
            }
            Event::ChangeQuantity { index, delta } => {
                self.cart.set_quantity(*index, *delta).map(|_| ())
            }
            Event::RemoveItem { index } => self.cart.remove(*index).map(|_| ()),
            Event::ApplyFilters {
                category,
                subcategory,
                search,
            } => {
                let query = ViewQuery::new(category, subcategory, search)
                    .with_scope(self.options.search_scope);
                self.catalog.apply_filters(query);
                Ok(())
            }
            Event::ApplySort { key } => {
                self.catalog.apply_sort(key);
                Ok(())
            }
            Event::ShowMore => {
                self.catalog.show_more();
                Ok(())
            }
            Event::ClearFilters => {
                self.catalog.clear();
                Ok(())
            }
        }
    }

    /// Add the catalog product at `position`, or the first one titled
    /// `title` when no position is given or it no longer holds that title.
    pub fn add_to_cart(&mut self, title: &str, position: Option<usize>) -> Result<usize> {
        if title.trim().is_empty() {
            return Err(Error::InvalidProduct("no product given".to_string()));
        }
        let product = position
            .and_then(|i| self.catalog.get(i))
            .filter(|p| p.title == title)
            .or_else(|| self.catalog.find_by_title(title))
            .ok_or_else(|| Error::UnknownProduct(title.to_string()))?;
        self.cart.add(product)
    }

    /// Reset transient view state, as a page reload would. The cart survives.
    pub fn reset_view(&mut self) {
        self.catalog.clear();
        self.catalog.set_loading(false);
    }

    /// Render the given regions. Regions the surface lacks are logged and skipped.
    pub fn render(&self, regions: &[RegionId], surface: &mut Surface) {
        let wants = |r: RegionId| regions.contains(&r);

        if wants(RegionId::CartBody) || wants(RegionId::CartTotal) || wants(RegionId::CartBadge) {
            report(render::render_cart(&self.cart_view(), surface));
        }
        if wants(RegionId::ProductGrid) || wants(RegionId::ShowMore) {
            report(render::render_grid(&self.grid_view(), surface));
        }
        if wants(RegionId::Featured) {
            report(render::render_featured(&self.featured_view(), surface));
        }
        if wants(RegionId::Filters) {
            report(render::render_filters(&self.filters_view(), surface));
        }
        if wants(RegionId::Loading) {
            report(render::render_loading(self.catalog.is_loading(), surface));
        }
    }

    /// Render every region the surface has mounted.
    pub fn render_all(&self, surface: &mut Surface) {
        let mounted: Vec<RegionId> = RegionId::ALL
            .into_iter()
            .filter(|r| surface.contains(*r))
            .collect();
        self.render(&mounted, surface);
    }

    pub fn cart_view(&self) -> CartView {
        CartView::from_cart(&self.cart)
    }

    pub fn grid_view(&self) -> GridView {
        GridView::from_catalog(&self.catalog)
    }

    pub fn featured_view(&self) -> GridView {
        GridView::featured(&self.catalog, self.options.featured_count)
    }

    pub fn filters_view(&self) -> FilterControlsView {
        FilterControlsView::from_catalog(&self.catalog)
    }

    /// First half of a catalog load: show the loading indicator.
    pub fn begin_load(&mut self, surface: &mut Surface) {
        self.catalog.set_loading(true);
        self.render(&[RegionId::Loading], surface);
    }

    /// Second half of a catalog load. On failure the prior view is kept.
    pub fn finish_load(&mut self, result: Result<Vec<Product>>, surface: &mut Surface) -> bool {
        self.catalog.set_loading(false);
        let loaded = match result {
            Ok(products) => {
                let count = self.catalog.load(products);
                info!("Catalog loaded: {} products", count);
                true
            }
            Err(e) => {
                error!("Catalog load failed, keeping current view: {}", e);
                false
            }
        };
        self.render(
            &[
                RegionId::Loading,
                RegionId::ProductGrid,
                RegionId::ShowMore,
                RegionId::Featured,
                RegionId::Filters,
            ],
            surface,
        );
        loaded
    }

    /// Load the catalog from `source` in one step.
    pub async fn load(
        &mut self,
        source: &CatalogSource,
        params: &FilterParams,
        surface: &mut Surface,
    ) -> bool {
        self.begin_load(surface);
        let result = source.fetch(params).await;
        self.finish_load(result, surface)
    }
}

fn report(result: Result<()>) {
    if let Err(e) = result {
        log_failure(&e);
    }
}

fn log_failure(e: &Error) {
    if e.is_recoverable() {
        warn!("{}", e);
    } else {
        error!("{}", e);
    }
}
