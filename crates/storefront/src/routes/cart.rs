//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Mutations are plain form posts
//! that load the cart, change it, store it back and redirect (303) to the
//! page the form came from, so the drawer or page re-renders with the new
//! state.

use std::num::IntErrorKind;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use garys_store_core::cart::{Cart, CartLine, Customizations, Selection};
use garys_store_core::pricing::Totals;
use garys_store_core::{LineId, Money};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::layout::{Layout, capitalize, safe_return_to};
use super::products::{Prefill, ProductDetailView, ProductShowTemplate};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::models::session::{load_cart, save_cart};
use crate::state::AppState;

/// Prefix of the add-to-cart fields that carry customization choices.
const CUSTOMIZATION_PREFIX: &str = "custom_";

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub id: String,
    pub name: String,
    pub product_href: String,
    pub image_url: String,
    pub size: String,
    pub color: String,
    /// "Fabrics: Linen, Neckline: Round"
    pub options: String,
    pub quantity: u32,
    /// Quantity the − button submits; 0 removes the line.
    pub decrement: i64,
    pub increment: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        let options = line
            .customizations
            .iter()
            .map(|(axis, option)| format!("{}: {option}", capitalize(axis)))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            id: line.id.to_string(),
            name: line.product.name.clone(),
            product_href: format!("/products/{}", line.product.slug),
            image_url: line.product.image_url.clone(),
            size: line.size.clone(),
            color: line.color.clone(),
            options,
            quantity: line.quantity,
            decrement: i64::from(line.quantity) - 1,
            increment: i64::from(line.quantity) + 1,
            unit_price: line.product.base_price,
            line_total: line.line_total(),
        }
    }
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub totals: Totals,
    pub count: u64,
    pub is_empty: bool,
    /// Where the line forms redirect after a change.
    pub return_to: String,
    pub close_href: String,
    pub checkout_href: String,
}

impl CartView {
    #[must_use]
    pub fn new(
        cart: &Cart,
        totals: Totals,
        return_to: impl Into<String>,
        close_href: impl Into<String>,
        checkout_href: impl Into<String>,
    ) -> Self {
        Self {
            lines: cart.lines().iter().map(CartLineView::from).collect(),
            totals,
            count: cart.count(),
            is_empty: cart.is_empty(),
            return_to: return_to.into(),
            close_href: close_href.into(),
            checkout_href: checkout_href.into(),
        }
    }
}

/// Add to cart form data.
///
/// Customization fields are named after their axis (`custom_fabrics`), so the
/// form is read as raw pairs rather than a fixed struct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddToCartForm {
    pub slug: String,
    pub size: String,
    pub color: String,
    pub quantity: u32,
    pub customizations: Customizations,
    pub return_to: Option<String>,
}

fn parse_quantity(raw: &str) -> u32 {
    match raw.trim().parse::<u32>() {
        Ok(quantity) => quantity,
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow) => u32::MAX,
        Err(_) => 0,
    }
}

impl AddToCartForm {
    /// Collect the form from urlencoded pairs. A missing or non-numeric
    /// quantity reads as 0 and is rejected by selection validation; an
    /// oversized one saturates.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "slug" => form.slug = value,
                "size" => form.size = value,
                "color" => form.color = value,
                "quantity" => form.quantity = parse_quantity(&value),
                "return_to" => form.return_to = Some(value),
                _ => {
                    if let Some(axis) = key.strip_prefix(CUSTOMIZATION_PREFIX) {
                        form.customizations.insert(axis.to_string(), value);
                    }
                }
            }
        }
        form
    }

    fn selection(&self) -> Selection {
        Selection {
            size: self.size.clone(),
            color: self.color.clone(),
            customizations: self.customizations.clone(),
            quantity: self.quantity,
        }
    }

    fn prefill(&self) -> Prefill {
        Prefill {
            size: self.size.trim().to_string(),
            color: self.color.trim().to_string(),
            customizations: self.customizations.clone(),
            quantity: self.quantity,
        }
    }
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: String,
    pub quantity: i64,
    pub return_to: Option<String>,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: String,
    pub return_to: Option<String>,
}

/// Clear cart form data.
#[derive(Debug, Deserialize)]
pub struct ClearCartForm {
    pub return_to: Option<String>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub cart: CartView,
}

fn parse_line_id(raw: &str) -> Result<LineId> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid cart line".to_string()))
}

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = load_cart(&session).await;

    CartShowTemplate {
        layout: Layout::standalone(&cart),
        cart: CartView::new(
            &cart,
            state.pricing().drawer_totals(&cart),
            "/cart",
            "/",
            "/checkout",
        ),
    }
}

/// Add a product selection to the cart.
///
/// The product is looked up again so the line carries the backend's current
/// price. A rejected selection re-renders the product page with the message
/// and the visitor's picks (400).
///
/// # Errors
///
/// Returns 404 for an unknown product, a gateway error if the backend is
/// unreachable, or 500 if the session cannot be written.
#[instrument(skip(state, session, pairs))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let form = AddToCartForm::from_pairs(pairs);
    let return_to = safe_return_to(form.return_to.as_deref());

    let product = state
        .backend()
        .fetch_product(form.slug.trim())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.slug)))?;

    let mut cart = load_cart(&session).await;

    let selection = match form.selection().validate(&product) {
        Ok(selection) => selection,
        Err(e) => {
            tracing::debug!(product = %product.slug, error = %e, "Rejected add to cart");
            let view = ProductDetailView::prefilled(&product, &form.prefill(), return_to, "/")
                .with_error(e.to_string());
            let page = ProductShowTemplate {
                layout: Layout::standalone(&cart),
                product: view,
            };
            return Ok((StatusCode::BAD_REQUEST, page).into_response());
        }
    };

    cart.add(&product, selection);
    save_cart(&session, &cart).await?;

    add_breadcrumb("cart", "Added to cart", Some(&[("product", product.slug.as_str())]));
    tracing::info!(product = %product.slug, count = cart.count(), "Added to cart");

    Ok(Redirect::to(&return_to).into_response())
}

/// Set a line's quantity; zero or less removes it.
///
/// # Errors
///
/// Returns 400 for a malformed line id, or 500 if the session cannot be
/// written.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Redirect> {
    let line = parse_line_id(&form.line_id)?;

    let mut cart = load_cart(&session).await;
    cart.update_quantity(line, form.quantity);
    save_cart(&session, &cart).await?;

    Ok(Redirect::to(&safe_return_to(form.return_to.as_deref())))
}

/// Remove a line from the cart.
///
/// # Errors
///
/// Returns 400 for a malformed line id, or 500 if the session cannot be
/// written.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Redirect> {
    let line = parse_line_id(&form.line_id)?;

    let mut cart = load_cart(&session).await;
    cart.remove(line);
    save_cart(&session, &cart).await?;

    add_breadcrumb("cart", "Removed from cart", None);
    Ok(Redirect::to(&safe_return_to(form.return_to.as_deref())))
}

/// Empty the cart.
///
/// # Errors
///
/// Returns 500 if the session cannot be written.
#[instrument(skip(session))]
pub async fn clear(session: Session, Form(form): Form<ClearCartForm>) -> Result<Redirect> {
    let mut cart = load_cart(&session).await;
    cart.clear();
    save_cart(&session, &cart).await?;

    add_breadcrumb("cart", "Cleared cart", None);
    Ok(Redirect::to(&safe_return_to(form.return_to.as_deref())))
}
