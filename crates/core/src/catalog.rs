//! Catalog entities as stored in the hosted backend.
//!
//! Categories and products are created and edited out-of-band; the storefront
//! only reads them. Field names match the backend columns so rows deserialize
//! directly.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Money, ProductId};

/// A product category (`categories` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Unique, used in category URLs.
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// Named option groups offered for a product, e.g. `fabrics` or `neckline`,
/// each with its allowed values in display order.
pub type CustomizationOptions = BTreeMap<String, Vec<String>>;

/// A product (`products` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub base_price: Money,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub available_sizes: Vec<String>,
    #[serde(default)]
    pub available_colors: Vec<String>,
    #[serde(default)]
    pub customization_options: CustomizationOptions,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const fn default_in_stock() -> bool {
    true
}

impl Product {
    /// Returns `true` if `size` is one of the sizes this product is offered in.
    #[must_use]
    pub fn offers_size(&self, size: &str) -> bool {
        self.available_sizes.iter().any(|s| s == size)
    }

    /// Returns `true` if `color` is one of the colors this product is offered in.
    #[must_use]
    pub fn offers_color(&self, color: &str) -> bool {
        self.available_colors.iter().any(|c| c == color)
    }

    /// Allowed options for a customization axis, if the product has that axis.
    #[must_use]
    pub fn customization_axis(&self, axis: &str) -> Option<&[String]> {
        self.customization_options.get(axis).map(Vec::as_slice)
    }
}

/// Categories and products loaded together for one page render.
///
/// Categories are kept in name order and products newest first, the order the
/// backend returns them in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

impl Catalog {
    /// Create a catalog from backend rows.
    #[must_use]
    pub const fn new(categories: Vec<Category>, products: Vec<Product>) -> Self {
        Self {
            categories,
            products,
        }
    }

    /// Look up a category by its slug.
    #[must_use]
    pub fn category_by_slug(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    /// Look up a product by its slug.
    #[must_use]
    pub fn product_by_slug(&self, slug: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.slug == slug)
    }

    /// Look up a product by its ID.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Products whose category reference is `category`.
    #[must_use]
    pub fn products_in(&self, category: CategoryId) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.category_id == category)
            .collect()
    }

    /// Products flagged as featured.
    #[must_use]
    pub fn featured(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.featured).collect()
    }

    /// Every product, unfiltered.
    #[must_use]
    pub fn all_products(&self) -> Vec<&Product> {
        self.products.iter().collect()
    }
}

/// Builders for catalog fixtures, shared with the storefront's tests.
#[doc(hidden)]
pub mod fixtures {
    use chrono::TimeZone;

    use super::*;

    /// A category with the given slug; the name is the capitalized slug.
    #[must_use]
    pub fn category(slug: &str) -> Category {
        let mut name = slug.to_string();
        if let Some(first) = name.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        Category {
            id: CategoryId::random(),
            name,
            slug: slug.to_string(),
            description: format!("Custom tailored pieces for {slug}"),
            image_url: format!("https://images.example.com/{slug}.jpg"),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap_or_default(),
        }
    }

    /// An in-stock product in `category` priced at `cents`, offered in sizes
    /// S/M/L and colors Blue/Black, with a `fabrics` customization axis.
    #[must_use]
    pub fn product(category: &Category, slug: &str, cents: i64) -> Product {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap_or_default();
        Product {
            id: ProductId::random(),
            category_id: category.id,
            name: slug.replace('-', " "),
            slug: slug.to_string(),
            description: format!("The {slug}, made to measure."),
            base_price: Money::from_cents(cents),
            image_url: format!("https://images.example.com/{slug}.jpg"),
            images: Vec::new(),
            available_sizes: vec!["S".into(), "M".into(), "L".into()],
            available_colors: vec!["Blue".into(), "Black".into()],
            customization_options: BTreeMap::from([(
                "fabrics".to_string(),
                vec!["Cotton".to_string(), "Linen".to_string()],
            )]),
            featured: false,
            in_stock: true,
            created_at: created,
            updated_at: created,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::fixtures::{category, product};
    use super::*;

    #[test]
    fn test_product_deserializes_backend_row() {
        let row = serde_json::json!({
            "id": "7d8f5f9e-2f52-4c59-9b8a-1c1d1c1d1c1d",
            "category_id": "0b6c58a4-9a38-4d3f-8c55-4e1f9f8f9f8f",
            "name": "Classic Kaftan",
            "slug": "classic-kaftan",
            "description": "Hand finished.",
            "base_price": 89.99,
            "image_url": "https://images.example.com/kaftan.jpg",
            "images": [],
            "available_sizes": ["S", "M"],
            "available_colors": ["White"],
            "customization_options": {"fabrics": ["Cotton", "Silk"], "neckline": ["Round"]},
            "featured": true,
            "in_stock": true,
            "created_at": "2025-01-02T10:00:00.123456+00:00",
            "updated_at": "2025-01-02T10:00:00+00:00"
        });

        let product: Product = serde_json::from_value(row).unwrap();
        assert_eq!(product.base_price, Money::from_cents(8999));
        assert!(product.offers_size("M"));
        assert!(!product.offers_color("Black"));
        assert_eq!(
            product.customization_axis("fabrics"),
            Some(&["Cotton".to_string(), "Silk".to_string()][..])
        );
    }

    #[test]
    fn test_product_tolerates_missing_optional_columns() {
        let row = serde_json::json!({
            "id": "7d8f5f9e-2f52-4c59-9b8a-1c1d1c1d1c1d",
            "category_id": "0b6c58a4-9a38-4d3f-8c55-4e1f9f8f9f8f",
            "name": "Plain",
            "slug": "plain",
            "base_price": 10,
            "created_at": "2025-01-02T10:00:00Z",
            "updated_at": "2025-01-02T10:00:00Z"
        });

        let product: Product = serde_json::from_value(row).unwrap();
        assert!(product.in_stock);
        assert!(!product.featured);
        assert!(product.customization_options.is_empty());
    }

    #[test]
    fn test_category_filtering() {
        let men = category("men");
        let women = category("women");
        let mut shirt = product(&men, "linen-shirt", 4000);
        shirt.featured = true;
        let dress = product(&women, "evening-dress", 12_000);
        let catalog = Catalog::new(vec![men.clone(), women.clone()], vec![shirt, dress]);

        let mens: Vec<&str> = catalog.products_in(men.id).iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(mens, vec!["linen-shirt"]);
        assert_eq!(catalog.featured().len(), 1);
        assert_eq!(catalog.all_products().len(), 2);
        assert_eq!(catalog.category_by_slug("women").map(|c| c.id), Some(women.id));
        assert!(catalog.category_by_slug("pets").is_none());
    }
}
