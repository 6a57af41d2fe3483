//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home (hero, category tiles, featured products)
//! GET  /shop                   - All products
//! GET  /category/{slug}        - One category ("home" redirects to /)
//!      ?product=&cart=&checkout=&legal=  - Overlays on any catalog page
//!
//! # Products
//! GET  /products/{slug}        - Product detail
//!
//! # Cart (form posts, 303 back to return_to)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add a selection
//! POST /cart/update            - Set a line's quantity
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//!
//! # Checkout
//! GET  /checkout               - Checkout form
//! POST /checkout               - Place the order
//!
//! # Legal
//! GET  /pages/{slug}           - Privacy, terms, shipping, returns
//! ```

pub mod cart;
pub mod checkout;
pub mod home;
pub mod layout;
pub mod pages;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{cart_rate_limiter, checkout_rate_limiter};
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route_layer(cart_rate_limiter())
        .route("/", get(cart::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog views
        .route("/", get(home::home))
        .route("/shop", get(home::shop))
        .route("/category/{slug}", get(home::category))
        // Product detail
        .route("/products/{slug}", get(products::show))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout, rate limited on submit only
        .route(
            "/checkout",
            get(checkout::show).merge(post(checkout::submit).layer(checkout_rate_limiter())),
        )
        // Legal pages
        .route("/pages/{slug}", get(pages::show))
}
