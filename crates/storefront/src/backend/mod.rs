//! Hosted backend access.
//!
//! # Architecture
//!
//! - The backend (a PostgREST/Supabase project) is the source of truth for
//!   categories, products and orders. NO local copy, direct API calls.
//! - Handlers talk to it through the [`StoreBackend`] trait so tests can swap
//!   in an in-memory implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use garys_store_storefront::backend::{RestBackend, StoreBackend};
//!
//! let backend = RestBackend::new(&config.supabase)?;
//! let catalog = backend.fetch_catalog().await?;
//! ```

mod rest;

pub use rest::RestBackend;

use async_trait::async_trait;
use garys_store_core::catalog::{Catalog, Category, Product};
use garys_store_core::order::OrderDraft;
use thiserror::Error;

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend answered with a non-success status.
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// Read and write operations the storefront needs from the backend.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// All categories, ordered by name.
    async fn fetch_categories(&self) -> Result<Vec<Category>, BackendError>;

    /// All products, newest first.
    async fn fetch_products(&self) -> Result<Vec<Product>, BackendError>;

    /// One product by slug, or `None` if there is no such product.
    async fn fetch_product(&self, slug: &str) -> Result<Option<Product>, BackendError>;

    /// Insert one order row.
    async fn insert_order(&self, order: &OrderDraft) -> Result<(), BackendError>;

    /// Cheap request used by the readiness probe.
    async fn ping(&self) -> Result<(), BackendError>;

    /// Categories and products, fetched concurrently.
    async fn fetch_catalog(&self) -> Result<Catalog, BackendError> {
        let (categories, products) = tokio::join!(self.fetch_categories(), self.fetch_products());
        Ok(Catalog::new(categories?, products?))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = BackendError::Status {
            status: 401,
            body: "Invalid API key".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 401: Invalid API key");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = BackendError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
