//! Error types for the storefront

use thiserror::Error;

use crate::render::RegionId;

/// Result type alias using the storefront Error
pub type Result<T> = std::result::Result<T, Error>;

/// Storefront error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Render target not mounted: {0}")]
    MissingRegion(RegionId),

    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    #[error("Product not found in catalog: {0}")]
    UnknownProduct(String),

    #[error("Index {index} out of range for {len} line items")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Catalog fetch failed: {0}")]
    Fetch(String),
}

impl Error {
    /// Errors that the storefront logs and continues past.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::MissingRegion(_)
                | Error::InvalidProduct(_)
                | Error::UnknownProduct(_)
                | Error::IndexOutOfRange { .. }
                | Error::Fetch(_)
        )
    }
}
