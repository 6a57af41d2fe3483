//! Checkout form validation and order assembly.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::cart::Cart;
use crate::order::{Address, OrderDraft, OrderItem, OrderNumber};
use crate::pricing::PricingPolicy;
use crate::types::{CustomerRef, Email, OrderStatus, PaymentStatus};

/// Country used when the form leaves it blank.
pub const DEFAULT_COUNTRY: &str = "United States";

/// Field name to message, for re-rendering the form next to each input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    /// Message for `field`, if it failed validation.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("{} field(s) need attention", .0.len())]
    InvalidFields(FieldErrors),
    #[error("Your cart is empty")]
    EmptyCart,
}

/// The checkout form as posted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// Validated contact and address details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub address: Address,
}

impl CheckoutForm {
    /// A blank form with the country pre-filled.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            country: DEFAULT_COUNTRY.to_string(),
            ..Self::default()
        }
    }

    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidFields`] listing every missing or
    /// malformed field.
    pub fn validate(&self) -> Result<CustomerDetails, CheckoutError> {
        let mut errors = FieldErrors::default();

        let required = [
            ("name", &self.name, "Full name is required"),
            ("email", &self.email, "Email is required"),
            ("street", &self.street, "Street address is required"),
            ("city", &self.city, "City is required"),
            ("state", &self.state, "State is required"),
            ("zip", &self.zip, "ZIP code is required"),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                errors.insert(field, message);
            }
        }

        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.insert("email", capitalize(&e.to_string()));
                None
            }
        };

        let Some(email) = email.filter(|_| errors.is_empty()) else {
            return Err(CheckoutError::InvalidFields(errors));
        };

        let country = match self.country.trim() {
            "" => DEFAULT_COUNTRY.to_string(),
            c => c.to_string(),
        };

        Ok(CustomerDetails {
            name: self.name.trim().to_string(),
            email,
            phone: self.phone.trim().to_string(),
            address: Address {
                street: self.street.trim().to_string(),
                city: self.city.trim().to_string(),
                state: self.state.trim().to_string(),
                zip: self.zip.trim().to_string(),
                country,
            },
        })
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Snapshot `cart` into the order row to insert.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] if there is nothing to order.
pub fn build_order(
    cart: &Cart,
    customer: CustomerDetails,
    pricing: &PricingPolicy,
    order_number: OrderNumber,
    user_id: CustomerRef,
) -> Result<OrderDraft, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let totals = pricing.checkout_totals(cart);
    Ok(OrderDraft {
        order_number,
        user_id,
        customer_name: customer.name,
        customer_email: customer.email,
        customer_phone: customer.phone,
        shipping_address: customer.address.clone(),
        billing_address: customer.address,
        items: cart.lines().iter().map(OrderItem::from).collect(),
        subtotal: totals.subtotal,
        tax: totals.tax,
        shipping: totals.shipping,
        total: totals.total,
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        notes: String::new(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::cart::Selection;
    use crate::catalog::fixtures::{category, product};
    use crate::types::Money;

    fn filled() -> CheckoutForm {
        CheckoutForm {
            name: "Gary Tailor".into(),
            email: "gary@example.com".into(),
            phone: String::new(),
            street: "1 Main St".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            zip: "62701".into(),
            country: String::new(),
        }
    }

    #[test]
    fn test_validate_fills_default_country() {
        let details = filled().validate().unwrap();
        assert_eq!(details.address.country, DEFAULT_COUNTRY);
        assert_eq!(details.email.as_str(), "gary@example.com");
    }

    #[test]
    fn test_validate_reports_every_missing_field() {
        let form = CheckoutForm {
            name: " ".into(),
            city: String::new(),
            ..filled()
        };
        let Err(CheckoutError::InvalidFields(errors)) = form.validate() else {
            panic!("expected field errors");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name"), Some("Full name is required"));
        assert!(errors.get("city").is_some());
        assert!(errors.get("phone").is_none());
    }

    #[test]
    fn test_validate_rejects_malformed_email() {
        let form = CheckoutForm {
            email: "gary.example.com".into(),
            ..filled()
        };
        let Err(CheckoutError::InvalidFields(errors)) = form.validate() else {
            panic!("expected field errors");
        };
        assert_eq!(
            errors.get("email"),
            Some("Email must contain a single @ symbol")
        );
    }

    #[test]
    fn test_missing_email_keeps_required_message() {
        let form = CheckoutForm {
            email: String::new(),
            ..filled()
        };
        let Err(CheckoutError::InvalidFields(errors)) = form.validate() else {
            panic!("expected field errors");
        };
        assert_eq!(errors.get("email"), Some("Email is required"));
    }

    #[test]
    fn test_build_order_rejects_empty_cart() {
        let result = build_order(
            &Cart::new(),
            filled().validate().unwrap(),
            &PricingPolicy::default(),
            OrderNumber::generate(Utc::now(), &mut rand::rng()),
            CustomerRef::random(),
        );
        assert_eq!(result, Err(CheckoutError::EmptyCart));
    }

    #[test]
    fn test_build_order_snapshots_cart() {
        let men = category("men");
        let shirt = product(&men, "linen-shirt", 10_000);
        let tie = product(&men, "silk-tie", 5_000);
        let mut cart = Cart::new();
        let pick = |qty| Selection {
            size: "M".into(),
            color: "Blue".into(),
            quantity: qty,
            ..Selection::default()
        };
        cart.add(&shirt, pick(2));
        cart.add(&tie, pick(1));

        let order = build_order(
            &cart,
            filled().validate().unwrap(),
            &PricingPolicy::default(),
            OrderNumber::generate(Utc::now(), &mut rand::rng()),
            CustomerRef::random(),
        )
        .unwrap();

        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].product_name, "linen shirt");
        assert_eq!(order.subtotal, Money::from_cents(25_000));
        assert_eq!(order.tax, Money::from_cents(2_000));
        assert_eq!(order.shipping, Money::from_cents(1_500));
        assert_eq!(order.total, Money::from_cents(28_500));
        assert_eq!(order.shipping_address, order.billing_address);
        assert_eq!(order.notes, "");

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["payment_status"], "pending");
        assert_eq!(json["total"], serde_json::json!(285.0));
    }
}
