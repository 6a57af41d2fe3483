//! Types the storefront keeps in the visitor session.

pub mod session;

pub use session::keys as session_keys;
