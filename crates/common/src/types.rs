//! Core types for the storefront

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Mul};

use crate::{Error, Result};

/// Amount in US dollars, stored as integer cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: u64) -> Self {
        Money(cents)
    }

    /// Convert a decimal dollar amount, rounding to the nearest cent.
    /// Negative and non-finite amounts are rejected.
    pub fn from_dollars(dollars: f64) -> Option<Self> {
        if !dollars.is_finite() || dollars < 0.0 {
            return None;
        }
        Some(Money((dollars * 100.0).round() as u64))
    }

    pub fn cents(self) -> u64 {
        self.0
    }

    pub fn as_dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, rhs: u32) -> Money {
        Money(self.0.saturating_mul(u64::from(rhs)))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

// Prices travel as JSON numbers in dollars.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_dollars())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let dollars = f64::deserialize(deserializer)?;
        Money::from_dollars(dollars)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid price: {dollars}")))
    }
}

/// Upstream review summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub rate: f64,
    pub count: u32,
}

/// A catalog product. Never mutated after load; `title` is the cart key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub title: String,
    pub price: Money,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, rename = "isNew", alias = "is_new")]
    pub is_new: bool,
    #[serde(default, rename = "isSale", alias = "is_sale")]
    pub is_sale: bool,
}

impl Product {
    pub fn new(title: impl Into<String>, price: Money, category: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            price,
            category: category.into(),
            subcategory: String::new(),
            image: String::new(),
            description: None,
            rating: None,
            is_new: false,
            is_sale: false,
        }
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = subcategory.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn new_arrival(mut self) -> Self {
        self.is_new = true;
        self
    }

    pub fn on_sale(mut self) -> Self {
        self.is_sale = true;
        self
    }

    /// A product must have a title and a positive price.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidProduct("empty title".to_string()));
        }
        if self.price.is_zero() {
            return Err(Error::InvalidProduct(format!(
                "{}: price must be positive",
                self.title
            )));
        }
        Ok(())
    }

    /// Image URL as rendered. Extensionless paths get `.jpg`.
    pub fn image_url(&self) -> String {
        let file = self.image.rsplit('/').next().unwrap_or_default();
        if self.image.is_empty() || has_extension(file) {
            self.image.clone()
        } else {
            format!("{}.jpg", self.image)
        }
    }

    /// Category with its first letter capitalized.
    pub fn category_label(&self) -> String {
        let mut chars = self.category.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn badge(&self) -> Option<Badge> {
        if self.is_new {
            Some(Badge::New)
        } else if self.is_sale {
            Some(Badge::Sale)
        } else {
            None
        }
    }
}

fn has_extension(file: &str) -> bool {
    // Query strings count as "already a URL" (placeholder image services).
    if file.contains('?') {
        return true;
    }
    match file.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty()
                && (1..=5).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

/// Card badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    New,
    Sale,
}

impl Badge {
    pub fn label(self) -> &'static str {
        match self {
            Badge::New => "NEW",
            Badge::Sale => "SALE",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Badge::New => "new-badge",
            Badge::Sale => "sale-badge",
        }
    }
}
