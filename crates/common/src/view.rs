//! View models
//!
//! Plain data describing what each region shows. Controls carry the
//! [`Event`] they dispatch, so tests can fire them without a browser.

use serde::Serialize;

use crate::cart::Cart;
use crate::catalog::{CatalogView, SortKey, ALL};
use crate::storefront::Event;
use crate::types::{Badge, Product};

pub const EMPTY_CART_MESSAGE: &str = "Your cart is empty.";
pub const EMPTY_GRID_MESSAGE: &str = "No products to display.";
pub const EMPTY_FEATURED_MESSAGE: &str = "No new products to display.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartRowView {
    pub index: usize,
    pub title: String,
    pub image_url: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
    pub decrement: Event,
    pub increment: Event,
    pub remove: Event,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartView {
    pub rows: Vec<CartRowView>,
    /// Formatted total, e.g. `$36.00`
    pub total: String,
    /// Item count shown on the badge
    pub badge: String,
}

impl CartView {
    pub fn from_cart(cart: &Cart) -> Self {
        let totals = cart.totals();
        let rows = cart
            .lines()
            .iter()
            .enumerate()
            .map(|(index, line)| CartRowView {
                index,
                title: line.product.title.clone(),
                image_url: line.product.image_url(),
                unit_price: line.product.price.to_string(),
                quantity: line.quantity,
                line_total: line.line_total().to_string(),
                decrement: Event::ChangeQuantity { index, delta: -1 },
                increment: Event::ChangeQuantity { index, delta: 1 },
                remove: Event::RemoveItem { index },
            })
            .collect();

        Self {
            rows,
            total: totals.total.to_string(),
            badge: totals.item_count.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductCardView {
    pub title: String,
    pub category: String,
    pub price: String,
    pub image_url: String,
    pub badge: Option<Badge>,
    pub detail_href: String,
    pub add: Event,
}

impl ProductCardView {
    /// Card for the product at catalog position `position`. The add control
    /// names that position, since variants can share a title.
    pub fn from_entry(position: usize, product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            category: product.category_label(),
            price: product.price.to_string(),
            image_url: product.image_url(),
            badge: product.badge(),
            detail_href: detail_href(product),
            add: Event::AddToCart {
                title: product.title.clone(),
                position: Some(position),
            },
        }
    }
}

/// Link to a product's detail page
pub fn detail_href(product: &Product) -> String {
    format!("/detail?name={}", urlencoding::encode(&product.title))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridView {
    pub cards: Vec<ProductCardView>,
    /// Present while part of the view is hidden.
    pub show_more: Option<Event>,
    pub empty_message: &'static str,
}

impl GridView {
    pub fn from_catalog(catalog: &CatalogView) -> Self {
        Self {
            cards: catalog
                .visible_entries()
                .map(|(i, p)| ProductCardView::from_entry(i, p))
                .collect(),
            show_more: catalog.has_more().then_some(Event::ShowMore),
            empty_message: EMPTY_GRID_MESSAGE,
        }
    }

    pub fn featured(catalog: &CatalogView, count: usize) -> Self {
        Self {
            cards: catalog
                .featured_entries(count)
                .map(|(i, p)| ProductCardView::from_entry(i, p))
                .collect(),
            show_more: None,
            empty_message: EMPTY_FEATURED_MESSAGE,
        }
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (usize, &'a Product)>) -> Self {
        Self {
            cards: entries
                .into_iter()
                .map(|(i, p)| ProductCardView::from_entry(i, p))
                .collect(),
            show_more: None,
            empty_message: EMPTY_GRID_MESSAGE,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterControlsView {
    pub categories: Vec<OptionView>,
    pub subcategories: Vec<OptionView>,
    pub sorts: Vec<OptionView>,
    pub search: String,
}

impl FilterControlsView {
    pub fn from_catalog(catalog: &CatalogView) -> Self {
        let query = catalog.query();
        let choices = |values: Vec<&str>, current: &str| -> Vec<OptionView> {
            std::iter::once(OptionView {
                value: ALL.to_string(),
                label: "All".to_string(),
                selected: current == ALL,
            })
            .chain(values.into_iter().map(|v| OptionView {
                value: v.to_string(),
                label: capitalize(v),
                selected: current == v,
            }))
            .collect()
        };

        let sort = catalog.sort();
        let sorts = std::iter::once(OptionView {
            value: "default".to_string(),
            label: "Default".to_string(),
            selected: sort.is_none(),
        })
        .chain(SortKey::ALL.into_iter().map(|k| OptionView {
            value: k.as_str().to_string(),
            label: k.label().to_string(),
            selected: sort == Some(k),
        }))
        .collect();

        Self {
            categories: choices(catalog.categories(), &query.category),
            subcategories: choices(catalog.subcategories(), &query.subcategory),
            sorts,
            search: query.search.clone(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
