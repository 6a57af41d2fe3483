//! Checkout route handlers.
//!
//! `POST /checkout` always answers with the standalone checkout page: the
//! confirmation on success, otherwise the form again with field errors or a
//! banner. The cart is cleared only after the backend accepted the order.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use garys_store_core::cart::Cart;
use garys_store_core::checkout::{CheckoutError, CheckoutForm, FieldErrors};
use garys_store_core::order::OrderDraft;
use garys_store_core::pricing::{PricingPolicy, Totals};
use tower_sessions::Session;
use tracing::instrument;

use super::cart::CartLineView;
use super::layout::Layout;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::models::session::{load_cart, save_cart};
use crate::services::{CheckoutService, PlaceOrderError};
use crate::state::AppState;

/// Banner shown when the backend rejects or cannot take the order.
pub const ORDER_FAILED_MESSAGE: &str = "Failed to create order. Please try again.";

/// Banner shown when the same visitor submits again before the first
/// submission finished.
pub const ORDER_IN_PROGRESS_MESSAGE: &str = "Your order is already being placed.";

/// Shown after the order was accepted.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub order_number: String,
    pub email: String,
}

impl From<&OrderDraft> for Confirmation {
    fn from(order: &OrderDraft) -> Self {
        Self {
            order_number: order.order_number.to_string(),
            email: order.customer_email.to_string(),
        }
    }
}

/// Checkout form and order summary display data for templates.
#[derive(Debug, Clone)]
pub struct CheckoutView {
    pub form: CheckoutForm,
    pub errors: FieldErrors,
    pub banner: Option<String>,
    pub lines: Vec<CartLineView>,
    pub totals: Totals,
    pub is_empty: bool,
    pub close_href: String,
    pub confirmation: Option<Confirmation>,
}

impl CheckoutView {
    /// The form for `cart`, pre-filled from `form`.
    #[must_use]
    pub fn new(
        form: CheckoutForm,
        cart: &Cart,
        pricing: &PricingPolicy,
        close_href: impl Into<String>,
    ) -> Self {
        Self {
            form,
            errors: FieldErrors::default(),
            banner: None,
            lines: cart.lines().iter().map(CartLineView::from).collect(),
            totals: pricing.checkout_totals(cart),
            is_empty: cart.is_empty(),
            close_href: close_href.into(),
            confirmation: None,
        }
    }

    /// A blank form with the default country.
    #[must_use]
    pub fn blank(cart: &Cart, pricing: &PricingPolicy, close_href: impl Into<String>) -> Self {
        Self::new(CheckoutForm::blank(), cart, pricing, close_href)
    }

    #[must_use]
    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = errors;
        self
    }

    #[must_use]
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    /// The summary of a placed order. `cart` is the cart as ordered.
    #[must_use]
    pub fn confirmed(order: &OrderDraft, cart: &Cart, pricing: &PricingPolicy) -> Self {
        Self {
            confirmation: Some(Confirmation::from(order)),
            totals: Totals {
                subtotal: order.subtotal,
                tax: order.tax,
                shipping: order.shipping,
                total: order.total,
            },
            ..Self::new(CheckoutForm::blank(), cart, pricing, "/")
        }
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub layout: Layout,
    pub checkout: CheckoutView,
}

/// Display the checkout page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = load_cart(&session).await;

    CheckoutShowTemplate {
        layout: Layout::standalone(&cart),
        checkout: CheckoutView::blank(&cart, state.pricing(), "/"),
    }
}

/// Place the order.
///
/// Field errors and an empty cart are answered with 400 and nothing is sent
/// to the backend. A second submission while one is in flight for the same
/// session gets 409. A backend failure gets 502 with the cart left as it
/// was.
///
/// The guard is held from before the cart is read until the emptied cart is
/// in the session store.
///
/// # Errors
///
/// Returns 500 if the emptied cart cannot be written back to the session.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let pricing = state.pricing();
    let render = |cart: &Cart, status: StatusCode, checkout: CheckoutView| {
        let page = CheckoutShowTemplate {
            layout: Layout::standalone(cart),
            checkout,
        };
        (status, page).into_response()
    };

    // Sessions get an id once something was stored in them; a visitor
    // without one has an empty cart and is turned away below anyway.
    let key = session
        .id()
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), |id| id.to_string());
    let Some(_permit) = state.checkout_guard().try_acquire(key) else {
        tracing::warn!("Rejected checkout while another is in flight");
        let cart = load_cart(&session).await;
        let view = CheckoutView::new(form, &cart, pricing, "/").with_banner(ORDER_IN_PROGRESS_MESSAGE);
        return Ok(render(&cart, StatusCode::CONFLICT, view));
    };

    let mut cart = load_cart(&session).await;
    let service = CheckoutService::new(state.backend(), pricing);
    match service.place_order(&cart, &form).await {
        Ok(order) => {
            let view = CheckoutView::confirmed(&order, &cart, pricing);
            cart.clear();
            save_cart(&session, &cart).await?;
            session.save().await?;
            add_breadcrumb(
                "checkout",
                "Order placed",
                Some(&[("order_number", order.order_number.as_str())]),
            );
            Ok(render(&cart, StatusCode::OK, view))
        }
        Err(PlaceOrderError::Invalid(CheckoutError::InvalidFields(errors))) => {
            let view = CheckoutView::new(form, &cart, pricing, "/").with_errors(errors);
            Ok(render(&cart, StatusCode::BAD_REQUEST, view))
        }
        Err(PlaceOrderError::Invalid(e @ CheckoutError::EmptyCart)) => {
            let view = CheckoutView::new(form, &cart, pricing, "/").with_banner(e.to_string());
            Ok(render(&cart, StatusCode::BAD_REQUEST, view))
        }
        Err(PlaceOrderError::Backend(e)) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(
                error = %e,
                sentry_event_id = %event_id,
                "Failed to create order"
            );
            let view = CheckoutView::new(form, &cart, pricing, "/").with_banner(ORDER_FAILED_MESSAGE);
            Ok(render(&cart, StatusCode::BAD_GATEWAY, view))
        }
    }
}
