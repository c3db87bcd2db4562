//! HTML rendering of view models into page regions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Write};
use tracing::warn;

use crate::storefront::Event;
use crate::view::{
    CartView, FilterControlsView, GridView, OptionView, ProductCardView, EMPTY_CART_MESSAGE,
};
use crate::{Error, Result};

/// A region of the page that can be re-rendered independently.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RegionId {
    CartBody,
    CartTotal,
    CartBadge,
    ProductGrid,
    ShowMore,
    Featured,
    Filters,
    Loading,
}

impl RegionId {
    pub const ALL: [RegionId; 8] = [
        RegionId::CartBody,
        RegionId::CartTotal,
        RegionId::CartBadge,
        RegionId::ProductGrid,
        RegionId::ShowMore,
        RegionId::Featured,
        RegionId::Filters,
        RegionId::Loading,
    ];

    pub const CART: [RegionId; 3] = [RegionId::CartBody, RegionId::CartTotal, RegionId::CartBadge];

    /// DOM element id the region is mounted on.
    pub fn element_id(self) -> &'static str {
        match self {
            RegionId::CartBody => "cart-body",
            RegionId::CartTotal => "cart-total",
            RegionId::CartBadge => "cart-count",
            RegionId::ProductGrid => "product-grid",
            RegionId::ShowMore => "show-more",
            RegionId::Featured => "featured-grid",
            RegionId::Filters => "filter-controls",
            RegionId::Loading => "loading-indicator",
        }
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_id())
    }
}

/// The set of regions a page has, and what has been rendered into them.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    regions: BTreeMap<RegionId, Option<String>>,
}

impl Surface {
    pub fn new(regions: impl IntoIterator<Item = RegionId>) -> Self {
        Self {
            regions: regions.into_iter().map(|r| (r, None)).collect(),
        }
    }

    /// Every region mounted.
    pub fn full() -> Self {
        Self::new(RegionId::ALL)
    }

    pub fn contains(&self, region: RegionId) -> bool {
        self.regions.contains_key(&region)
    }

    /// Replace the content of a mounted region.
    pub fn mount(&mut self, region: RegionId, html: String) -> Result<()> {
        match self.regions.get_mut(&region) {
            Some(slot) => {
                *slot = Some(html);
                Ok(())
            }
            None => Err(Error::MissingRegion(region)),
        }
    }

    /// Rendered content of a region, if any.
    pub fn get(&self, region: RegionId) -> Option<&str> {
        self.regions.get(&region).and_then(|s| s.as_deref())
    }

    /// Rendered regions keyed by element id.
    pub fn fragments(&self) -> BTreeMap<&'static str, String> {
        self.regions
            .iter()
            .filter_map(|(r, html)| html.as_ref().map(|h| (r.element_id(), h.clone())))
            .collect()
    }

    /// Drop rendered content, keeping the mounted set.
    pub fn reset(&mut self) {
        for slot in self.regions.values_mut() {
            *slot = None;
        }
    }
}

fn mount_or_warn(surface: &mut Surface, region: RegionId, html: String) {
    if let Err(e) = surface.mount(region, html) {
        warn!("Skipping render: {}", e);
    }
}

/// Render the cart panel. Without a cart body the whole render is aborted.
pub fn render_cart(view: &CartView, surface: &mut Surface) -> Result<()> {
    if !surface.contains(RegionId::CartBody) {
        return Err(Error::MissingRegion(RegionId::CartBody));
    }
    surface.mount(RegionId::CartBody, cart_body_html(view))?;
    mount_or_warn(surface, RegionId::CartTotal, format!("<h4>{}</h4>", view.total));
    mount_or_warn(surface, RegionId::CartBadge, view.badge.clone());
    Ok(())
}

/// Render the shop grid and its show-more container.
pub fn render_grid(view: &GridView, surface: &mut Surface) -> Result<()> {
    surface.mount(RegionId::ProductGrid, grid_html(view))?;
    mount_or_warn(surface, RegionId::ShowMore, show_more_html(view.show_more.as_ref()));
    Ok(())
}

pub fn render_featured(view: &GridView, surface: &mut Surface) -> Result<()> {
    surface.mount(RegionId::Featured, grid_html(view))
}

pub fn render_filters(view: &FilterControlsView, surface: &mut Surface) -> Result<()> {
    surface.mount(RegionId::Filters, filters_html(view))
}

pub fn render_loading(loading: bool, surface: &mut Surface) -> Result<()> {
    surface.mount(RegionId::Loading, loading_html(loading))
}

pub fn cart_body_html(view: &CartView) -> String {
    if view.is_empty() {
        return format!(r#"<p class="text-muted text-center" id="emptyCartMessage">{EMPTY_CART_MESSAGE}</p>"#);
    }

    let mut out = String::new();
    for row in &view.rows {
        let _ = write!(
            out,
            r#"<div class="cart-item d-flex align-items-center mb-3 pb-3 border-bottom">
    <img src="{img}" class="img-fluid rounded me-3" alt="{title}" style="width: 48px; height: 48px; object-fit: cover;">
    <div class="cart-item-details flex-grow-1">
        <h6 class="cart-item-title mb-1">{title}</h6>
        <div class="d-flex align-items-center mt-1">
            <button class="btn btn-outline-secondary btn-sm px-2 me-1" type="button" aria-label="Decrease quantity" {dec}><i class="fa fa-minus"></i></button>
            <span class="mx-2 cart-item-quantity">{qty}</span>
            <button class="btn btn-outline-secondary btn-sm px-2 ms-1" type="button" aria-label="Increase quantity" {inc}><i class="fa fa-plus"></i></button>
        </div>
    </div>
    <div class="text-end ms-3">
        <div class="fw-bold cart-item-total">{line_total}</div>
        <button type="button" class="btn btn-outline-danger btn-sm mt-2" aria-label="Remove" {remove}><i class="fa fa-trash"></i></button>
    </div>
</div>
"#,
            img = escape(&row.image_url),
            title = escape(&row.title),
            dec = event_attr(&row.decrement),
            qty = row.quantity,
            inc = event_attr(&row.increment),
            line_total = row.line_total,
            remove = event_attr(&row.remove),
        );
    }
    out
}

pub fn grid_html(view: &GridView) -> String {
    if view.is_empty() {
        return format!(
            r#"<p class="text-center text-muted col-12 my-5 fs-4">{}</p>"#,
            view.empty_message
        );
    }
    view.cards.iter().map(card_html).collect()
}

pub fn card_html(card: &ProductCardView) -> String {
    let badge = card
        .badge
        .map(|b| format!(r#"<div class="product-badge {}">{}</div>"#, b.css_class(), b.label()))
        .unwrap_or_default();

    format!(
        r#"<div class="col-lg-3 col-md-4 col-sm-6 col-12 mb-4 product-card">
    <div class="card">
        {badge}
        <a href="{href}"><img src="{img}" class="card-img-top" alt="{title}" loading="lazy"></a>
        <div class="card-body text-center">
            <h5 class="card-title fw-semibold text-truncate mb-1">{title}</h5>
            <p class="card-text text-muted small mb-2">{category}</p>
            <p class="card-text fw-bold fs-5 text-dark product-price">{price}</p>
            <button type="button" class="btn btn-primary add-to-cart-btn mt-auto" {add}>Add to cart</button>
        </div>
    </div>
</div>
"#,
        href = escape(&card.detail_href),
        img = escape(&card.image_url),
        title = escape(&card.title),
        category = escape(&card.category),
        price = card.price,
        add = event_attr(&card.add),
    )
}

pub fn show_more_html(event: Option<&Event>) -> String {
    match event {
        Some(event) => format!(
            r#"<button id="showMoreBtn" type="button" class="btn btn-outline-primary" {}>Show More</button>"#,
            event_attr(event)
        ),
        None => String::new(),
    }
}

pub fn filters_html(view: &FilterControlsView) -> String {
    format!(
        r#"<form id="filterForm" class="row g-2 align-items-end">
    <div class="col-md-3">
        <input type="search" id="searchInput" name="search" class="form-control" placeholder="Search products" value="{search}">
    </div>
    <div class="col-md-3">
        <select id="categoryFilter" name="category" class="form-select">{categories}</select>
    </div>
    <div class="col-md-3">
        <select id="subcategoryFilter" name="subcategory" class="form-select">{subcategories}</select>
    </div>
    <div class="col-md-3 d-flex gap-2">
        <button type="submit" class="btn btn-primary">Filter</button>
        <button type="button" id="clearFilters" class="btn btn-outline-secondary" {clear}>Clear</button>
    </div>
    <div class="col-md-3">
        <select id="sortSelect" name="sort" class="form-select">{sorts}</select>
    </div>
</form>
"#,
        search = escape(&view.search),
        categories = options_html(&view.categories),
        subcategories = options_html(&view.subcategories),
        clear = event_attr(&Event::ClearFilters),
        sorts = options_html(&view.sorts),
    )
}

fn options_html(options: &[OptionView]) -> String {
    options
        .iter()
        .map(|o| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                escape(&o.value),
                if o.selected { " selected" } else { "" },
                escape(&o.label)
            )
        })
        .collect()
}

pub fn loading_html(loading: bool) -> String {
    if loading {
        r#"<div class="spinner-border text-primary" role="status"><span class="visually-hidden">Loading...</span></div>"#.to_string()
    } else {
        String::new()
    }
}

/// `data-event` attribute carrying the serialized event.
pub fn event_attr(event: &Event) -> String {
    let json = serde_json::to_string(event).unwrap_or_default();
    format!(r#"data-event="{}""#, escape(&json))
}

/// Escape text for HTML content and double-quoted attributes.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(&mut out, s);
    out
}

fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
