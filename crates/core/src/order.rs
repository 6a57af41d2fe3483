//! The order record written once per successful checkout.
//!
//! An [`OrderDraft`] is a snapshot: product names and prices are copied out
//! of the cart so the stored order does not change if the catalog does.
//! Field names match the `orders` table columns.

use core::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

use crate::cart::{CartLine, Customizations};
use crate::types::{CustomerRef, Email, Money, OrderStatus, PaymentStatus, ProductId};

/// Human-readable order identifier, `ORD-<unix millis>-<4 chars>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    const SUFFIX_LEN: usize = 4;

    /// Generate an order number for an order placed at `now`.
    pub fn generate<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Self {
        let suffix: String = (0..Self::SUFFIX_LEN)
            .map(|_| char::from(rng.sample(Alphanumeric)).to_ascii_uppercase())
            .collect();
        Self(format!("ORD-{}-{suffix}", now.timestamp_millis()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A postal address. Checkout copies the one form into both the shipping
/// and billing address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// One line of the order snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    pub customizations: Customizations,
    /// Unit price at the time of ordering.
    pub price: Money,
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id,
            product_name: line.product.name.clone(),
            quantity: line.quantity,
            size: line.size.clone(),
            color: line.color.clone(),
            customizations: line.customizations.clone(),
            price: line.product.base_price,
        }
    }
}

/// The row inserted into `orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub order_number: OrderNumber,
    pub user_id: CustomerRef,
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: String,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    pub total: Money,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub notes: String,
}
