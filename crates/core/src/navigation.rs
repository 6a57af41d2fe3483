//! Navigation state for the catalog pages.
//!
//! A page shows one [`View`] (home, a single category, or every product) and
//! any combination of [`Overlays`] on top of it: the product detail, the cart
//! drawer, the checkout form and a legal page. The storefront rebuilds a
//! [`Navigator`] from each request URL and drives it with the transitions
//! below, so every state is linkable.

use crate::catalog::{Catalog, Category, Product};
use crate::request::RequestState;

/// Category slug that means "back to the home view".
pub const HOME_SLUG: &str = "home";

/// The main content area.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    /// Hero, category tiles and featured products.
    #[default]
    Home,
    /// Products of one category, by slug.
    Category(String),
    /// Every product ("Shop Now").
    All,
}

/// The static legal pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegalPage {
    Privacy,
    Terms,
    Shipping,
    Returns,
}

impl LegalPage {
    pub const ALL: [Self; 4] = [Self::Privacy, Self::Terms, Self::Shipping, Self::Returns];

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Privacy => "privacy",
            Self::Terms => "terms",
            Self::Shipping => "shipping",
            Self::Returns => "returns",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Privacy => "Privacy Policy",
            Self::Terms => "Terms and Conditions",
            Self::Shipping => "Shipping Policy",
            Self::Returns => "Returns and Refund Policy",
        }
    }

    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|page| page.slug() == slug)
    }
}

/// Overlays open on top of the view. Any subset may be open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Overlays {
    pub product: Option<String>,
    pub cart: bool,
    pub checkout: bool,
    pub legal: Option<LegalPage>,
}

/// View, overlays and the catalog they draw from.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    view: View,
    overlays: Overlays,
    catalog: RequestState<Catalog>,
}

impl Navigator {
    /// Home view, nothing open, catalog not yet requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the catalog fetch as started.
    pub fn begin_loading(&mut self) {
        self.catalog = RequestState::InFlight;
    }

    /// Record the catalog fetch outcome. On failure the page renders with
    /// empty lists.
    pub fn finish_loading<E: std::fmt::Display>(&mut self, result: Result<Catalog, E>) {
        self.catalog.complete(result);
    }

    #[must_use]
    pub const fn catalog_state(&self) -> &RequestState<Catalog> {
        &self.catalog
    }

    #[must_use]
    pub const fn view(&self) -> &View {
        &self.view
    }

    #[must_use]
    pub const fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    /// Switch to the view for `slug`.
    ///
    /// [`HOME_SLUG`] goes back home. An unknown slug, or any slug while the
    /// catalog is not loaded, leaves the state unchanged and returns `false`.
    pub fn select_category(&mut self, slug: &str) -> bool {
        if slug == HOME_SLUG {
            self.view = View::Home;
            return true;
        }
        let known = self
            .catalog
            .succeeded()
            .and_then(|c| c.category_by_slug(slug))
            .is_some();
        if known {
            self.view = View::Category(slug.to_string());
        }
        known
    }

    /// Show every product.
    pub fn shop_now(&mut self) {
        self.view = View::All;
    }

    pub fn open_product(&mut self, slug: impl Into<String>) {
        self.overlays.product = Some(slug.into());
    }

    pub fn close_product(&mut self) {
        self.overlays.product = None;
    }

    pub const fn open_cart(&mut self) {
        self.overlays.cart = true;
    }

    pub const fn close_cart(&mut self) {
        self.overlays.cart = false;
    }

    /// Leave the cart drawer for the checkout form.
    pub const fn begin_checkout(&mut self) {
        self.overlays.cart = false;
        self.overlays.checkout = true;
    }

    pub const fn order_placed(&mut self) {
        self.overlays.checkout = false;
    }

    /// Dismiss the checkout form without ordering.
    pub const fn close_checkout(&mut self) {
        self.overlays.checkout = false;
    }

    pub const fn open_legal(&mut self, page: LegalPage) {
        self.overlays.legal = Some(page);
    }

    pub const fn close_legal(&mut self) {
        self.overlays.legal = None;
    }

    /// Categories for the tiles and header; empty until loaded.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        self.catalog
            .succeeded()
            .map_or(&[][..], |c| c.categories.as_slice())
    }

    /// The category the view is showing, if it is a category view.
    #[must_use]
    pub fn current_category(&self) -> Option<&Category> {
        let View::Category(slug) = &self.view else {
            return None;
        };
        self.catalog.succeeded()?.category_by_slug(slug)
    }

    /// Products the view lists: featured on home, the category's products on
    /// a category view, everything on the all-products view.
    #[must_use]
    pub fn visible_products(&self) -> Vec<&Product> {
        let Some(catalog) = self.catalog.succeeded() else {
            return Vec::new();
        };
        match &self.view {
            View::Home => catalog.featured(),
            View::All => catalog.all_products(),
            View::Category(slug) => catalog
                .category_by_slug(slug)
                .map(|c| catalog.products_in(c.id))
                .unwrap_or_default(),
        }
    }

    /// Heading over the product grid.
    #[must_use]
    pub fn title(&self) -> String {
        match &self.view {
            View::Home => "Featured Products".to_string(),
            View::All => "All Products".to_string(),
            View::Category(slug) => self
                .current_category()
                .map_or_else(|| slug.clone(), |c| c.name.clone()),
        }
    }

    /// The product shown in the detail overlay, if it exists.
    #[must_use]
    pub fn selected_product(&self) -> Option<&Product> {
        let slug = self.overlays.product.as_deref()?;
        self.catalog.succeeded()?.product_by_slug(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{category, product};

    fn loaded() -> Navigator {
        let men = category("men");
        let women = category("women");
        let mut shirt = product(&men, "linen-shirt", 4000);
        shirt.featured = true;
        let suit = product(&men, "wool-suit", 30_000);
        let dress = product(&women, "evening-dress", 12_000);

        let mut nav = Navigator::new();
        nav.begin_loading();
        nav.finish_loading(Ok::<_, String>(Catalog::new(
            vec![men, women],
            vec![shirt, suit, dress],
        )));
        nav
    }

    fn slugs(nav: &Navigator) -> Vec<&str> {
        nav.visible_products().iter().map(|p| p.slug.as_str()).collect()
    }

    #[test]
    fn test_initial_state() {
        let nav = Navigator::new();
        assert_eq!(nav.view(), &View::Home);
        assert_eq!(nav.overlays(), &Overlays::default());
        assert_eq!(nav.catalog_state(), &RequestState::NotStarted);
        assert!(nav.visible_products().is_empty());
    }

    #[test]
    fn test_select_category_filters_by_category() {
        let mut nav = loaded();
        assert!(nav.select_category("men"));
        assert_eq!(slugs(&nav), vec!["linen-shirt", "wool-suit"]);
        assert_eq!(nav.title(), "Men");

        assert!(nav.select_category("women"));
        assert_eq!(slugs(&nav), vec!["evening-dress"]);
    }

    #[test]
    fn test_home_sentinel_shows_featured() {
        let mut nav = loaded();
        nav.select_category("women");
        assert!(nav.select_category(HOME_SLUG));
        assert_eq!(nav.view(), &View::Home);
        assert_eq!(slugs(&nav), vec!["linen-shirt"]);
        assert_eq!(nav.title(), "Featured Products");
    }

    #[test]
    fn test_unknown_category_is_ignored() {
        let mut nav = loaded();
        nav.select_category("men");
        assert!(!nav.select_category("pets"));
        assert_eq!(nav.view(), &View::Category("men".to_string()));
    }

    #[test]
    fn test_shop_now_lists_everything() {
        let mut nav = loaded();
        nav.shop_now();
        assert_eq!(slugs(&nav).len(), 3);
        assert_eq!(nav.title(), "All Products");
    }

    #[test]
    fn test_overlays_stack_independently() {
        let mut nav = loaded();
        nav.select_category("men");
        nav.open_product("wool-suit");
        nav.open_cart();
        nav.open_legal(LegalPage::Shipping);

        assert_eq!(nav.view(), &View::Category("men".to_string()));
        assert_eq!(nav.selected_product().map(|p| p.slug.as_str()), Some("wool-suit"));
        assert!(nav.overlays().cart);

        nav.begin_checkout();
        assert!(!nav.overlays().cart);
        assert!(nav.overlays().checkout);
        assert_eq!(nav.overlays().legal, Some(LegalPage::Shipping));

        nav.order_placed();
        nav.close_product();
        nav.close_legal();
        assert_eq!(nav.overlays(), &Overlays::default());
    }

    #[test]
    fn test_close_checkout_keeps_view() {
        let mut nav = loaded();
        nav.shop_now();
        nav.open_cart();
        nav.begin_checkout();
        nav.close_checkout();
        assert_eq!(nav.view(), &View::All);
        assert!(!nav.overlays().checkout);
        assert!(!nav.overlays().cart);
    }

    #[test]
    fn test_failed_load_renders_empty() {
        let mut nav = Navigator::new();
        nav.begin_loading();
        assert!(nav.catalog_state().is_in_flight());
        nav.finish_loading(Err::<Catalog, _>("timeout"));

        assert!(nav.categories().is_empty());
        assert!(nav.visible_products().is_empty());
        assert!(!nav.select_category("men"));
    }

    #[test]
    fn test_legal_page_slugs() {
        for page in LegalPage::ALL {
            assert_eq!(LegalPage::from_slug(page.slug()), Some(page));
        }
        assert_eq!(LegalPage::from_slug("cookies"), None);
        assert_eq!(LegalPage::Returns.title(), "Returns and Refund Policy");
    }
}
