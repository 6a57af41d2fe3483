//! Business logic services for storefront.
//!
//! # Services
//!
//! - `checkout` - Order placement and the double-submission guard

pub mod checkout;

pub use checkout::{CheckoutGuard, CheckoutPermit, CheckoutService, PlaceOrderError};
