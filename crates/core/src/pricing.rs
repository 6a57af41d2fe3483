//! Order totals.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::cart::Cart;
use crate::types::Money;

/// Tax rate and shipping charge applied at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    pub tax_rate: Decimal,
    pub flat_shipping: Money,
}

impl Default for PricingPolicy {
    /// 8% tax and $15.00 flat shipping.
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(8, 2),
            flat_shipping: Money::from_cents(1500),
        }
    }
}

/// Subtotal, tax, shipping and grand total for a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    pub total: Money,
}

impl PricingPolicy {
    /// Totals for placing an order. Shipping is always charged.
    #[must_use]
    pub fn checkout_totals(&self, cart: &Cart) -> Totals {
        self.totals(cart.total(), self.flat_shipping)
    }

    /// Totals shown in the cart drawer, where an empty cart ships for free.
    #[must_use]
    pub fn drawer_totals(&self, cart: &Cart) -> Totals {
        let shipping = if cart.is_empty() {
            Money::ZERO
        } else {
            self.flat_shipping
        };
        self.totals(cart.total(), shipping)
    }

    fn totals(&self, subtotal: Money, shipping: Money) -> Totals {
        let tax = subtotal.apply_rate(self.tax_rate);
        Totals {
            subtotal,
            tax,
            shipping,
            total: subtotal + tax + shipping,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Selection;
    use crate::catalog::fixtures::{category, product};

    fn cart_of(lines: &[(i64, u32)]) -> Cart {
        let cat = category("women");
        let mut cart = Cart::new();
        for (i, (cents, qty)) in lines.iter().enumerate() {
            let p = product(&cat, &format!("p{i}"), *cents);
            cart.add(
                &p,
                Selection {
                    size: "M".into(),
                    color: "Blue".into(),
                    quantity: *qty,
                    ..Selection::default()
                },
            );
        }
        cart
    }

    #[test]
    fn test_checkout_totals() {
        // $100 x2 + $50 x1
        let cart = cart_of(&[(10_000, 2), (5_000, 1)]);
        let totals = PricingPolicy::default().checkout_totals(&cart);

        assert_eq!(totals.subtotal, Money::from_cents(25_000));
        assert_eq!(totals.tax, Money::from_cents(2_000));
        assert_eq!(totals.shipping, Money::from_cents(1_500));
        assert_eq!(totals.total, Money::from_cents(28_500));
    }

    #[test]
    fn test_tax_rounds_to_cents() {
        let cart = cart_of(&[(1_999, 3)]);
        let totals = PricingPolicy::default().checkout_totals(&cart);
        // 59.97 * 0.08 = 4.7976
        assert_eq!(totals.tax, Money::from_cents(480));
        assert_eq!(totals.total.to_string(), "$79.77");
    }

    #[test]
    fn test_drawer_waives_shipping_on_empty_cart() {
        let policy = PricingPolicy::default();
        let empty = policy.drawer_totals(&Cart::new());
        assert_eq!(empty.total, Money::ZERO);

        let cart = cart_of(&[(4_000, 1)]);
        assert_eq!(policy.drawer_totals(&cart), policy.checkout_totals(&cart));
    }
}
