//! The visitor's shopping cart.
//!
//! A [`Cart`] is an owned value: the storefront loads it from the visitor's
//! session, mutates it through the methods here, and stores it back. It is
//! never persisted anywhere else until checkout turns it into an order.
//!
//! Lines are keyed by the full selection (product, size, color,
//! customizations). Adding a selection that is already in the cart increases
//! that line's quantity; the same product with a different size or color
//! gets its own line.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Product;
use crate::types::{LineId, Money, ProductId};

/// Chosen option per customization axis.
pub type Customizations = BTreeMap<String, String>;

/// Reasons a selection cannot be added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Please select size and color")]
    MissingSizeOrColor,
    #[error("Size {0} is not available for this product")]
    UnknownSize(String),
    #[error("Color {0} is not available for this product")]
    UnknownColor(String),
    #[error("{axis} has no option named {option}")]
    UnknownCustomization { axis: String, option: String },
    #[error("Quantity must be at least 1")]
    ZeroQuantity,
    #[error("This product is out of stock")]
    OutOfStock,
}

/// What the product detail form submits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub size: String,
    pub color: String,
    pub customizations: Customizations,
    pub quantity: u32,
}

impl Selection {
    /// Check this selection against the product it was made for.
    ///
    /// Customization axes left blank are dropped rather than rejected; an axis
    /// the product does not have, or an option outside its list, is an error.
    ///
    /// # Errors
    ///
    /// Returns the first [`SelectionError`] found.
    pub fn validate(mut self, product: &Product) -> Result<Self, SelectionError> {
        if !product.in_stock {
            return Err(SelectionError::OutOfStock);
        }
        self.size = self.size.trim().to_string();
        self.color = self.color.trim().to_string();
        if self.size.is_empty() || self.color.is_empty() {
            return Err(SelectionError::MissingSizeOrColor);
        }
        if !product.offers_size(&self.size) {
            return Err(SelectionError::UnknownSize(self.size));
        }
        if !product.offers_color(&self.color) {
            return Err(SelectionError::UnknownColor(self.color));
        }
        if self.quantity == 0 {
            return Err(SelectionError::ZeroQuantity);
        }

        self.customizations.retain(|_, option| !option.trim().is_empty());
        for (axis, option) in &self.customizations {
            let allowed = product.customization_axis(axis).unwrap_or_default();
            if !allowed.iter().any(|o| o == option) {
                return Err(SelectionError::UnknownCustomization {
                    axis: axis.clone(),
                    option: option.clone(),
                });
            }
        }

        Ok(self)
    }
}

/// The product fields a cart line needs, frozen when the line is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub image_url: String,
    pub base_price: Money,
}

impl From<&Product> for CartProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            image_url: product.image_url.clone(),
            base_price: product.base_price,
        }
    }
}

/// Identity of a cart line: two adds with equal keys share one line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineKey {
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
    pub customizations: Customizations,
}

/// One selected product configuration plus quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: LineId,
    pub product: CartProduct,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    #[serde(default)]
    pub customizations: Customizations,
}

impl CartLine {
    /// The selection key of this line.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product.id,
            size: self.size.clone(),
            color: self.color.clone(),
            customizations: self.customizations.clone(),
        }
    }

    fn matches(&self, key: &LineKey) -> bool {
        self.product.id == key.product_id
            && self.size == key.size
            && self.color == key.color
            && self.customizations == key.customizations
    }

    /// Base price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.product.base_price.times(self.quantity)
    }
}

/// The cart store for one visitor session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add a validated selection of `product`.
    ///
    /// Merges into the line with the same key if there is one, otherwise
    /// appends a new line. Returns the ID of the line that now holds the
    /// selection.
    pub fn add(&mut self, product: &Product, selection: Selection) -> LineId {
        let key = LineKey {
            product_id: product.id,
            size: selection.size,
            color: selection.color,
            customizations: selection.customizations,
        };

        if let Some(line) = self.lines.iter_mut().find(|l| l.matches(&key)) {
            line.quantity = line.quantity.saturating_add(selection.quantity);
            return line.id;
        }

        let line = CartLine {
            id: LineId::random(),
            product: CartProduct::from(product),
            quantity: selection.quantity,
            size: key.size,
            color: key.color,
            customizations: key.customizations,
        };
        let id = line.id;
        self.lines.push(line);
        id
    }

    /// Remove one line. Unknown IDs are ignored.
    pub fn remove(&mut self, line: LineId) {
        self.lines.retain(|l| l.id != line);
    }

    /// Remove every line for a product. Unknown IDs are ignored.
    pub fn remove_product(&mut self, product: ProductId) {
        self.lines.retain(|l| l.product.id != product);
    }

    /// Set a line's quantity; zero or below removes the line. Values past
    /// `u32::MAX` saturate.
    pub fn update_quantity(&mut self, line: LineId, quantity: i64) {
        if quantity <= 0 {
            self.remove(line);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(l) = self.lines.iter_mut().find(|l| l.id == line) {
            l.quantity = quantity;
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of base price times quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities over all lines (the header badge value).
    #[must_use]
    pub fn count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up a line by ID.
    #[must_use]
    pub fn line(&self, id: LineId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    /// Returns `true` if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
