//! Session-related types.
//!
//! The visitor's cart is the only state kept in the session. It is stored as
//! a serialized [`Cart`] and loaded, mutated and saved back by the handlers
//! that need it.

use garys_store_core::cart::Cart;
use tower_sessions::Session;

/// Session keys.
pub mod keys {
    /// Key for the visitor's cart.
    pub const CART: &str = "cart";
}

/// Load the cart from the session; a missing or unreadable cart is empty.
pub async fn load_cart(session: &Session) -> Cart {
    match session.get::<Cart>(keys::CART).await {
        Ok(cart) => cart.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable cart from session");
            Cart::new()
        }
    }
}

/// Store the cart in the session.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CART, cart).await
}
