//! Shopping cart
//!
//! Ordered line items keyed by product title. Adding a title that is already
//! present bumps its quantity; quantities never drop below one and lines are
//! only removed explicitly.

use serde::Serialize;
use tracing::debug;

use crate::types::{Money, Product};
use crate::{Error, Result};

/// Largest quantity a single line can hold.
pub const MAX_QUANTITY: u32 = 999;

/// One cart entry: a product and how many of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub product: Product,
    pub quantity: u32,
}

impl LineItem {
    fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    pub fn title(&self) -> &str {
        &self.product.title
    }

    /// Unit price times quantity
    pub fn line_total(&self) -> Money {
        self.product.price * self.quantity
    }
}

/// Totals rollup, recomputed from the lines on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    pub total: Money,
    pub item_count: u32,
}

/// Process-wide cart state
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one unit of `product`. Returns the index of the affected line.
    pub fn add(&mut self, product: &Product) -> Result<usize> {
        product.validate()?;

        if let Some(index) = self.lines.iter().position(|l| l.title() == product.title) {
            let line = &mut self.lines[index];
            line.quantity = (line.quantity + 1).min(MAX_QUANTITY);
            debug!("Cart: {} x{}", line.title(), line.quantity);
            return Ok(index);
        }

        self.lines.push(LineItem::new(product.clone()));
        debug!("Cart: added {}", product.title);
        Ok(self.lines.len() - 1)
    }

    /// Adjust the quantity of line `index` by `delta`, clamped to
    /// `1..=MAX_QUANTITY`.
    pub fn set_quantity(&mut self, index: usize, delta: i32) -> Result<u32> {
        let len = self.lines.len();
        let line = self
            .lines
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;

        let next = i64::from(line.quantity) + i64::from(delta);
        line.quantity = next.clamp(1, i64::from(MAX_QUANTITY)) as u32;
        Ok(line.quantity)
    }

    /// Delete line `index`, returning it.
    pub fn remove(&mut self, index: usize) -> Result<LineItem> {
        let len = self.lines.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        Ok(self.lines.remove(index))
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals {
            total: self.lines.iter().map(LineItem::line_total).sum(),
            item_count: self
                .lines
                .iter()
                .fold(0u32, |n, l| n.saturating_add(l.quantity)),
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
