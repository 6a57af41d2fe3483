//! Application state shared across handlers.

use std::sync::Arc;

use garys_store_core::pricing::PricingPolicy;

use crate::backend::StoreBackend;
use crate::content::ContentStore;
use crate::services::CheckoutGuard;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// backend client, loaded content and pricing.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    backend: Arc<dyn StoreBackend>,
    content: ContentStore,
    pricing: PricingPolicy,
    checkout_guard: CheckoutGuard,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `backend` - Hosted backend client (or an in-memory one in tests)
    /// * `content` - Legal pages loaded at startup
    /// * `pricing` - Tax rate and flat shipping charge
    #[must_use]
    pub fn new(backend: Arc<dyn StoreBackend>, content: ContentStore, pricing: PricingPolicy) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                backend,
                content,
                pricing,
                checkout_guard: CheckoutGuard::default(),
            }),
        }
    }

    /// Get a reference to the hosted backend client.
    #[must_use]
    pub fn backend(&self) -> &dyn StoreBackend {
        self.inner.backend.as_ref()
    }

    /// Get a reference to the loaded legal pages.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    /// Tax and shipping applied to carts and orders.
    #[must_use]
    pub fn pricing(&self) -> &PricingPolicy {
        &self.inner.pricing
    }

    #[must_use]
    pub fn checkout_guard(&self) -> &CheckoutGuard {
        &self.inner.checkout_guard
    }
}
