//! Catalog page route handlers: home, all products and category views.
//!
//! Each request rebuilds a [`Navigator`] from its URL: the path selects the
//! view and the query opens overlays (`product`, `cart`, `checkout`,
//! `legal`). Categories and products are fetched fresh for every render.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use garys_store_core::cart::Cart;
use garys_store_core::navigation::{HOME_SLUG, LegalPage, Navigator, Overlays, View};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::cart::CartView;
use super::checkout::CheckoutView;
use super::layout::{Layout, catalog_href, href_with};
use super::pages::LegalView;
use super::products::{ProductCard, ProductDetailView};
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::session::load_cart;
use crate::state::AppState;

/// Overlay query parameters, valid on every catalog page.
#[derive(Debug, Default, Deserialize)]
pub struct OverlayQuery {
    pub product: Option<String>,
    pub cart: Option<String>,
    pub checkout: Option<String>,
    pub legal: Option<String>,
}

impl OverlayQuery {
    /// Open the requested overlays. Checkout wins over the cart drawer, the
    /// way "Proceed to Checkout" leaves the drawer. Unknown legal pages are
    /// ignored.
    pub fn apply(&self, nav: &mut Navigator) {
        if let Some(slug) = self.product.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            nav.open_product(slug);
        }
        if is_set(self.cart.as_deref()) {
            nav.open_cart();
        }
        if is_set(self.checkout.as_deref()) {
            nav.begin_checkout();
        }
        if let Some(page) = self.legal.as_deref().and_then(LegalPage::from_slug) {
            nav.open_legal(page);
        }
    }
}

fn is_set(flag: Option<&str>) -> bool {
    matches!(flag, Some(v) if !v.is_empty() && v != "0")
}

/// Category tile display data for templates.
#[derive(Debug, Clone)]
pub struct CategoryTile {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub href: String,
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog.html")]
pub struct CatalogTemplate {
    pub layout: Layout,
    /// Heading over the product grid.
    pub title: String,
    /// Home shows the hero and category tiles above the grid.
    pub is_home: bool,
    pub categories: Vec<CategoryTile>,
    pub products: Vec<ProductCard>,
    pub product: Option<ProductDetailView>,
    pub cart: Option<CartView>,
    pub checkout: Option<CheckoutView>,
    pub legal: Option<LegalView>,
}

impl CatalogTemplate {
    /// Render `nav` for a visitor holding `cart`.
    #[must_use]
    pub fn build(state: &AppState, nav: &Navigator, cart: &Cart) -> Self {
        let view = nav.view();
        let overlays = nav.overlays();
        let current = catalog_href(view, overlays);

        let categories = nav
            .categories()
            .iter()
            .map(|c| CategoryTile {
                name: c.name.clone(),
                description: c.description.clone(),
                image_url: c.image_url.clone(),
                href: catalog_href(&View::Category(c.slug.clone()), &Overlays::default()),
            })
            .collect();

        let products = nav
            .visible_products()
            .into_iter()
            .map(|p| {
                let href = href_with(view, overlays, |o| o.product = Some(p.slug.clone()));
                ProductCard::new(p, href)
            })
            .collect();

        let product = nav.selected_product().map(|p| {
            let close = href_with(view, overlays, |o| o.product = None);
            ProductDetailView::new(p, close.clone(), close)
        });

        let cart_view = overlays.cart.then(|| {
            CartView::new(
                cart,
                state.pricing().drawer_totals(cart),
                current.clone(),
                href_with(view, overlays, |o| o.cart = false),
                href_with(view, overlays, |o| {
                    o.cart = false;
                    o.checkout = true;
                }),
            )
        });

        let checkout = overlays.checkout.then(|| {
            CheckoutView::blank(
                cart,
                state.pricing(),
                href_with(view, overlays, |o| o.checkout = false),
            )
        });

        let legal = overlays
            .legal
            .and_then(|page| state.content().get_page(page))
            .map(|page| LegalView::new(page, href_with(view, overlays, |o| o.legal = None)));

        Self {
            layout: Layout::for_catalog(cart, view, overlays),
            title: nav.title(),
            is_home: matches!(view, View::Home),
            categories,
            products,
            product,
            cart: cart_view,
            checkout,
            legal,
        }
    }
}

/// Fetch the catalog, apply the view and overlays, and render.
///
/// A failed fetch is logged and the page renders with empty lists. When the
/// catalog loaded but `select` rejects the view (an unknown category), the
/// page is a 404.
async fn render_catalog(
    state: &AppState,
    session: &Session,
    query: &OverlayQuery,
    select: impl FnOnce(&mut Navigator) -> bool,
) -> Result<Response> {
    let mut nav = Navigator::new();
    nav.begin_loading();
    let result = state.backend().fetch_catalog().await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Failed to load catalog");
    }
    nav.finish_loading(result);

    if !select(&mut nav) && nav.catalog_state().succeeded().is_some() {
        return Err(AppError::NotFound("category".to_string()));
    }
    query.apply(&mut nav);

    let cart = load_cart(session).await;
    Ok(CatalogTemplate::build(state, &nav, &cart).into_response())
}

/// Display the home page: hero, category tiles and featured products.
///
/// # Errors
///
/// Backend failures are not errors here; the page renders with empty lists.
#[instrument(skip(state, session))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<OverlayQuery>,
) -> Result<Response> {
    render_catalog(&state, &session, &query, |_| true).await
}

/// Display every product ("Shop Now").
///
/// # Errors
///
/// Backend failures are not errors here; the page renders with empty lists.
#[instrument(skip(state, session))]
pub async fn shop(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<OverlayQuery>,
) -> Result<Response> {
    render_catalog(&state, &session, &query, |nav| {
        nav.shop_now();
        true
    })
    .await
}

/// Display one category's products. The `home` slug redirects to `/`.
///
/// # Errors
///
/// Returns 404 if the catalog loaded and has no category with this slug.
#[instrument(skip(state, session))]
pub async fn category(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
    Query(query): Query<OverlayQuery>,
) -> Result<Response> {
    if slug == HOME_SLUG {
        return Ok(Redirect::to("/").into_response());
    }
    render_catalog(&state, &session, &query, |nav| nav.select_category(&slug)).await
}
