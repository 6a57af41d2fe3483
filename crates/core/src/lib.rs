//! Gary's Store Core - Shared domain library.
//!
//! This crate provides the domain model used by the storefront:
//! - catalog entities (categories, products) as stored by the hosted backend
//! - the per-visitor shopping cart and its pricing
//! - checkout form validation and the order snapshot written at checkout
//! - navigation state for the catalog views and their overlays
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no session handling. The storefront crate owns all of that and
//! drives the types here.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, and order statuses
//! - [`catalog`] - Categories, products, and the loaded catalog snapshot
//! - [`cart`] - Cart lines keyed by selection, and the cart store
//! - [`pricing`] - Tax and shipping policy, order totals
//! - [`order`] - Order snapshot and order number generation
//! - [`checkout`] - Checkout form validation and order assembly
//! - [`navigation`] - View and overlay state for the catalog pages
//! - [`request`] - Request/response state for asynchronous operations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod navigation;
pub mod order;
pub mod pricing;
pub mod request;
pub mod types;

pub use types::*;
