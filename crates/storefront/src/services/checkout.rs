//! Checkout service.
//!
//! Turns a validated form and the visitor's cart into one order insert, and
//! keeps a visitor from submitting twice while an insert is in flight.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use garys_store_core::CustomerRef;
use garys_store_core::cart::Cart;
use garys_store_core::checkout::{CheckoutError, CheckoutForm, build_order};
use garys_store_core::order::{OrderDraft, OrderNumber};
use garys_store_core::pricing::PricingPolicy;
use thiserror::Error;
use tracing::instrument;

use crate::backend::{BackendError, StoreBackend};

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// The form or cart was rejected before anything was sent.
    #[error(transparent)]
    Invalid(#[from] CheckoutError),

    /// The backend did not accept the order.
    #[error("order insert failed: {0}")]
    Backend(#[from] BackendError),
}

/// Checkout service.
pub struct CheckoutService<'a> {
    backend: &'a dyn StoreBackend,
    pricing: &'a PricingPolicy,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(backend: &'a dyn StoreBackend, pricing: &'a PricingPolicy) -> Self {
        Self { backend, pricing }
    }

    /// Validate `form`, snapshot `cart` and insert the order.
    ///
    /// The cart is not touched; clearing it after success is up to the
    /// caller, which owns the session.
    ///
    /// # Errors
    ///
    /// Returns `PlaceOrderError::Invalid` for field errors or an empty cart
    /// (nothing is sent), and `PlaceOrderError::Backend` if the insert fails.
    #[instrument(skip_all, fields(lines = cart.lines().len()))]
    pub async fn place_order(
        &self,
        cart: &Cart,
        form: &CheckoutForm,
    ) -> Result<OrderDraft, PlaceOrderError> {
        let customer = form.validate()?;
        let order_number = OrderNumber::generate(Utc::now(), &mut rand::rng());
        let order = build_order(cart, customer, self.pricing, order_number, CustomerRef::random())?;

        self.backend.insert_order(&order).await?;
        tracing::info!(
            order_number = %order.order_number,
            total = %order.total,
            "Order placed"
        );
        Ok(order)
    }
}

/// Sessions with a checkout submission in flight.
#[derive(Debug, Clone, Default)]
pub struct CheckoutGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

/// Held while a session's submission is in flight; releases it on drop.
#[derive(Debug)]
pub struct CheckoutPermit {
    guard: CheckoutGuard,
    key: String,
}

impl CheckoutGuard {
    /// Claim the slot for `key`, or `None` if a submission is already running.
    #[must_use]
    pub fn try_acquire(&self, key: impl Into<String>) -> Option<CheckoutPermit> {
        let key = key.into();
        let inserted = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone());
        inserted.then(|| CheckoutPermit {
            guard: self.clone(),
            key,
        })
    }
}

impl Drop for CheckoutPermit {
    fn drop(&mut self) {
        self.guard
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
