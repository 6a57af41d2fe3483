//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use garys_store_core::Money;
use garys_store_core::cart::Customizations;
use garys_store_core::catalog::Product;
use tower_sessions::Session;
use tracing::instrument;

use super::layout::{FALLBACK_RETURN_TO, Layout, capitalize};
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::session::load_cart;
use crate::state::AppState;

/// Product grid card display data for templates.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub image_url: String,
    pub featured: bool,
    pub in_stock: bool,
    /// Opens the detail overlay on the current page.
    pub href: String,
}

impl ProductCard {
    #[must_use]
    pub fn new(product: &Product, href: String) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.base_price,
            image_url: product.image_url.clone(),
            featured: product.featured,
            in_stock: product.in_stock,
            href,
        }
    }
}

/// One pickable value (size, color or customization option).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub selected: bool,
}

fn choices(values: &[String], selected: &str) -> Vec<Choice> {
    values
        .iter()
        .map(|value| Choice {
            value: value.clone(),
            selected: value == selected,
        })
        .collect()
}

/// A select for one customization axis.
#[derive(Debug, Clone)]
pub struct CustomizationField {
    /// Form field name, `custom_<axis>`.
    pub name: String,
    pub label: String,
    pub options: Vec<Choice>,
}

/// What the visitor picked before a rejected add-to-cart, to refill the form.
#[derive(Debug, Clone, Default)]
pub struct Prefill {
    pub size: String,
    pub color: String,
    pub customizations: Customizations,
    pub quantity: u32,
}

/// Product detail display data for templates.
#[derive(Debug, Clone)]
pub struct ProductDetailView {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub image_url: String,
    /// Gallery images beyond the main one.
    pub images: Vec<String>,
    pub sizes: Vec<Choice>,
    pub colors: Vec<Choice>,
    pub customizations: Vec<CustomizationField>,
    pub quantity: u32,
    pub in_stock: bool,
    pub error: Option<String>,
    /// Where the add-to-cart form redirects on success.
    pub return_to: String,
    pub close_href: String,
}

impl ProductDetailView {
    /// A fresh detail form for `product`.
    #[must_use]
    pub fn new(product: &Product, return_to: impl Into<String>, close_href: impl Into<String>) -> Self {
        Self::prefilled(product, &Prefill::default(), return_to, close_href)
    }

    /// The detail form with the visitor's previous picks selected.
    #[must_use]
    pub fn prefilled(
        product: &Product,
        prefill: &Prefill,
        return_to: impl Into<String>,
        close_href: impl Into<String>,
    ) -> Self {
        let customizations = product
            .customization_options
            .iter()
            .map(|(axis, options)| CustomizationField {
                name: format!("custom_{axis}"),
                label: capitalize(axis),
                options: choices(
                    options,
                    prefill.customizations.get(axis).map_or("", String::as_str),
                ),
            })
            .collect();

        Self {
            slug: product.slug.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.base_price,
            image_url: product.image_url.clone(),
            images: product
                .images
                .iter()
                .filter(|url| **url != product.image_url)
                .cloned()
                .collect(),
            sizes: choices(&product.available_sizes, &prefill.size),
            colors: choices(&product.available_colors, &prefill.color),
            customizations,
            quantity: prefill.quantity.max(1),
            in_stock: product.in_stock,
            error: None,
            return_to: return_to.into(),
            close_href: close_href.into(),
        }
    }

    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Standalone product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub product: ProductDetailView,
}

/// Display the product detail page.
///
/// # Errors
///
/// Returns 404 if no product has this slug, or a gateway error if the
/// backend cannot be reached.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let product = state
        .backend()
        .fetch_product(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    let cart = load_cart(&session).await;
    Ok(ProductShowTemplate {
        layout: Layout::standalone(&cart),
        product: ProductDetailView::new(&product, FALLBACK_RETURN_TO, "/"),
    })
}

#[cfg(test)]
mod tests {
    use garys_store_core::catalog::fixtures::{category, product};

    use super::*;

    #[test]
    fn test_detail_view_lists_options() {
        let p = product(&category("men"), "linen-shirt", 4000);
        let view = ProductDetailView::new(&p, "/shop", "/shop");

        assert_eq!(view.sizes.len(), p.available_sizes.len());
        assert!(view.sizes.iter().all(|c| !c.selected));
        assert_eq!(view.quantity, 1);
        assert_eq!(view.customizations.len(), 1);
        assert_eq!(view.customizations[0].name, "custom_fabrics");
        assert_eq!(view.customizations[0].label, "Fabrics");
        assert!(view.error.is_none());
    }

    #[test]
    fn test_prefilled_view_keeps_picks() {
        let p = product(&category("men"), "linen-shirt", 4000);
        let prefill = Prefill {
            size: "M".to_string(),
            color: "Blue".to_string(),
            customizations: Customizations::from([("fabrics".to_string(), "Linen".to_string())]),
            quantity: 3,
        };
        let view = ProductDetailView::prefilled(&p, &prefill, "/cart", "/")
            .with_error("Please select size and color");

        let picked: Vec<&str> = view
            .sizes
            .iter()
            .chain(&view.colors)
            .chain(&view.customizations[0].options)
            .filter(|c| c.selected)
            .map(|c| c.value.as_str())
            .collect();
        assert_eq!(picked, vec!["M", "Blue", "Linen"]);
        assert_eq!(view.quantity, 3);
        assert_eq!(view.error.as_deref(), Some("Please select size and color"));
    }

    #[test]
    fn test_card_copies_badges() {
        let mut p = product(&category("women"), "evening-dress", 12_000);
        p.featured = true;
        p.in_stock = false;
        let card = ProductCard::new(&p, "/?product=evening-dress".to_string());
        assert!(card.featured);
        assert!(!card.in_stock);
        assert_eq!(card.price.to_string(), "$120.00");
    }
}
