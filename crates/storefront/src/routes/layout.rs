//! Page chrome and catalog URLs shared by the route handlers.
//!
//! Catalog pages encode their navigation state in the URL: the path picks the
//! view and query parameters open overlays on top of it. Every link on a
//! catalog page is built here from the current view and overlays, so the
//! state survives plain form posts and redirects.

use garys_store_core::cart::Cart;
use garys_store_core::navigation::{LegalPage, Overlays, View};
use url::form_urlencoded;

/// Where cart and checkout forms land when `return_to` is missing or unsafe.
pub const FALLBACK_RETURN_TO: &str = "/cart";

/// Category shortcuts in the header and footer, by slug.
const COLLECTIONS: [(&str, &str); 3] = [("Men", "men"), ("Women", "women"), ("Children", "children")];

/// A labelled link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

/// Header and footer data rendered by `base.html`.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Badge value: total quantity, not distinct lines.
    pub cart_count: u64,
    pub cart_href: String,
    /// Header shortcuts ("Men").
    pub categories: Vec<NavLink>,
    /// Footer quick links ("Men's Collection").
    pub collections: Vec<NavLink>,
    pub legal_links: Vec<NavLink>,
}

impl Layout {
    /// Chrome for a catalog page: the cart and legal links open overlays on
    /// the current view.
    #[must_use]
    pub fn for_catalog(cart: &Cart, view: &View, overlays: &Overlays) -> Self {
        let legal_links = LegalPage::ALL
            .into_iter()
            .map(|page| NavLink {
                label: page.title().to_string(),
                href: href_with(view, overlays, |o| o.legal = Some(page)),
            })
            .collect();
        Self {
            cart_href: href_with(view, overlays, |o| o.cart = true),
            legal_links,
            ..Self::standalone(cart)
        }
    }

    /// Chrome for a standalone page (product, cart, checkout, legal).
    #[must_use]
    pub fn standalone(cart: &Cart) -> Self {
        let legal_links = LegalPage::ALL
            .into_iter()
            .map(|page| NavLink {
                label: page.title().to_string(),
                href: format!("/pages/{}", page.slug()),
            })
            .collect();
        Self {
            cart_count: cart.count(),
            cart_href: "/cart".to_string(),
            categories: COLLECTIONS
                .iter()
                .map(|(label, slug)| NavLink {
                    label: (*label).to_string(),
                    href: category_href(slug),
                })
                .collect(),
            collections: COLLECTIONS
                .iter()
                .map(|(label, slug)| NavLink {
                    label: format!("{label}'s Collection"),
                    href: category_href(slug),
                })
                .collect(),
            legal_links,
        }
    }
}

/// URL of a catalog page showing `view` with `overlays` open.
#[must_use]
pub fn catalog_href(view: &View, overlays: &Overlays) -> String {
    let path = match view {
        View::Home => "/".to_string(),
        View::All => "/shop".to_string(),
        View::Category(slug) => category_href(slug),
    };

    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(product) = &overlays.product {
        query.append_pair("product", product);
    }
    if overlays.cart {
        query.append_pair("cart", "1");
    }
    if overlays.checkout {
        query.append_pair("checkout", "1");
    }
    if let Some(page) = overlays.legal {
        query.append_pair("legal", page.slug());
    }
    let query = query.finish();

    if query.is_empty() {
        path
    } else {
        format!("{path}?{query}")
    }
}

/// URL of `view` with a modified copy of `overlays`.
#[must_use]
pub fn href_with(view: &View, overlays: &Overlays, edit: impl FnOnce(&mut Overlays)) -> String {
    let mut overlays = overlays.clone();
    edit(&mut overlays);
    catalog_href(view, &overlays)
}

fn category_href(slug: &str) -> String {
    let slug: String = form_urlencoded::byte_serialize(slug.as_bytes()).collect();
    format!("/category/{slug}")
}

/// Accept a `return_to` form value only if it is a path on this site.
#[must_use]
pub fn safe_return_to(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path.to_string()
        }
        _ => FALLBACK_RETURN_TO.to_string(),
    }
}

/// Upper-case the first letter, for customization axis labels.
#[must_use]
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_href_paths() {
        let none = Overlays::default();
        assert_eq!(catalog_href(&View::Home, &none), "/");
        assert_eq!(catalog_href(&View::All, &none), "/shop");
        assert_eq!(
            catalog_href(&View::Category("women".to_string()), &none),
            "/category/women"
        );
    }

    #[test]
    fn test_catalog_href_stacks_overlays() {
        let overlays = Overlays {
            product: Some("linen shirt".to_string()),
            cart: true,
            checkout: false,
            legal: Some(LegalPage::Returns),
        };
        assert_eq!(
            catalog_href(&View::All, &overlays),
            "/shop?product=linen+shirt&cart=1&legal=returns"
        );
    }

    #[test]
    fn test_href_with_leaves_original_untouched() {
        let overlays = Overlays {
            cart: true,
            ..Overlays::default()
        };
        let href = href_with(&View::Home, &overlays, |o| {
            o.cart = false;
            o.checkout = true;
        });
        assert_eq!(href, "/?checkout=1");
        assert!(overlays.cart);
    }

    #[test]
    fn test_safe_return_to() {
        assert_eq!(safe_return_to(Some("/shop?cart=1")), "/shop?cart=1");
        assert_eq!(safe_return_to(Some("https://evil.example/")), "/cart");
        assert_eq!(safe_return_to(Some("//evil.example/")), "/cart");
        assert_eq!(safe_return_to(Some("/\\evil.example")), "/cart");
        assert_eq!(safe_return_to(Some("/x\r\nLocation: /y")), "/cart");
        assert_eq!(safe_return_to(None), "/cart");
    }

    #[test]
    fn test_layout_links() {
        let layout = Layout::for_catalog(&Cart::new(), &View::All, &Overlays::default());
        assert_eq!(layout.cart_count, 0);
        assert_eq!(layout.cart_href, "/shop?cart=1");
        assert_eq!(layout.legal_links[0].href, "/shop?legal=privacy");
        assert_eq!(layout.collections[2].label, "Children's Collection");
        assert_eq!(layout.categories[0].href, "/category/men");

        let layout = Layout::standalone(&Cart::new());
        assert_eq!(layout.cart_href, "/cart");
        assert_eq!(layout.legal_links[1].href, "/pages/terms");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("fabrics"), "Fabrics");
        assert_eq!(capitalize(""), "");
    }
}
