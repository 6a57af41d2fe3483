//! Integration tests for Gary's Store.
//!
//! The tests drive the assembled storefront router in-process with
//! `tower::ServiceExt::oneshot`, against an in-memory [`FakeBackend`] instead
//! of the hosted one. [`TestApp`] carries the session cookie between
//! requests the way a browser would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p garys-store-integration-tests
//! ```

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use garys_store_core::catalog::fixtures::{category, product};
use garys_store_core::catalog::{Catalog, Category, Product};
use garys_store_core::order::OrderDraft;
use garys_store_core::pricing::PricingPolicy;
use garys_store_storefront::backend::{BackendError, StoreBackend};
use garys_store_storefront::content::ContentStore;
use garys_store_storefront::middleware::session::session_layer;
use garys_store_storefront::state::AppState;
use tower::ServiceExt;

// =============================================================================
// Fake backend
// =============================================================================

/// In-memory [`StoreBackend`] with switchable failures.
#[derive(Debug, Default)]
pub struct FakeBackend {
    catalog: Catalog,
    order_delay: Option<Duration>,
    fail_catalog: AtomicBool,
    fail_orders: AtomicBool,
    insert_attempts: AtomicUsize,
    orders: Mutex<Vec<OrderDraft>>,
}

impl FakeBackend {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    /// Hold every order insert for `delay` before answering.
    #[must_use]
    pub const fn with_order_delay(mut self, delay: Duration) -> Self {
        self.order_delay = Some(delay);
        self
    }

    /// Make catalog reads (and the readiness ping) fail.
    pub fn fail_catalog(&self, fail: bool) {
        self.fail_catalog.store(fail, Ordering::SeqCst);
    }

    /// Make order inserts fail.
    pub fn fail_orders(&self, fail: bool) {
        self.fail_orders.store(fail, Ordering::SeqCst);
    }

    /// Orders accepted so far.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderDraft> {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Inserts attempted, including failed ones.
    #[must_use]
    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }

    fn unavailable() -> BackendError {
        BackendError::Status {
            status: 503,
            body: "backend unavailable".to_string(),
        }
    }

    fn check_catalog(&self) -> Result<(), BackendError> {
        if self.fail_catalog.load(Ordering::SeqCst) {
            Err(Self::unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StoreBackend for FakeBackend {
    async fn fetch_categories(&self) -> Result<Vec<Category>, BackendError> {
        self.check_catalog()?;
        Ok(self.catalog.categories.clone())
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, BackendError> {
        self.check_catalog()?;
        Ok(self.catalog.products.clone())
    }

    async fn fetch_product(&self, slug: &str) -> Result<Option<Product>, BackendError> {
        self.check_catalog()?;
        Ok(self.catalog.product_by_slug(slug).cloned())
    }

    async fn insert_order(&self, order: &OrderDraft) -> Result<(), BackendError> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.order_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_orders.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(order.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<(), BackendError> {
        self.check_catalog()
    }
}

/// Three categories and four products:
///
/// | slug            | category | price   | flags        |
/// |-----------------|----------|---------|--------------|
/// | `linen-shirt`   | men      | 40.00   | featured     |
/// | `wool-suit`     | men      | 300.00  |              |
/// | `evening-dress` | women    | 120.00  | featured     |
/// | `school-blazer` | children | 55.00   | out of stock |
#[must_use]
pub fn sample_catalog() -> Catalog {
    let men = category("men");
    let women = category("women");
    let children = category("children");

    let mut shirt = product(&men, "linen-shirt", 4_000);
    shirt.featured = true;
    let suit = product(&men, "wool-suit", 30_000);
    let mut dress = product(&women, "evening-dress", 12_000);
    dress.featured = true;
    let mut blazer = product(&children, "school-blazer", 5_500);
    blazer.in_stock = false;

    Catalog::new(vec![children, men, women], vec![shirt, suit, dress, blazer])
}

// =============================================================================
// Test client
// =============================================================================

/// A response with its body read into a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The redirect target, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// The storefront router plus one visitor's session cookie.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
    pub backend: Arc<FakeBackend>,
    cookie: Option<String>,
}

fn storefront_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../storefront")
}

impl TestApp {
    /// The storefront over `backend`, with the shipped legal pages.
    #[must_use]
    pub fn new(backend: FakeBackend) -> Self {
        let backend = Arc::new(backend);
        let content = ContentStore::load(&storefront_dir().join("content"))
            .expect("shipped content pages load");
        let state = AppState::new(backend.clone(), content, PricingPolicy::default());
        let router = garys_store_storefront::app(
            state,
            session_layer(false),
            &storefront_dir().join("static"),
        );
        Self {
            router,
            backend,
            cookie: None,
        }
    }

    /// The storefront over [`sample_catalog`].
    #[must_use]
    pub fn sample() -> Self {
        Self::new(FakeBackend::new(sample_catalog()))
    }

    /// Another visitor on the same server, with no session yet.
    #[must_use]
    pub fn new_visitor(&self) -> Self {
        Self {
            cookie: None,
            ..self.clone()
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::builder().method("GET").uri(uri);
        self.send(request, Body::empty()).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(request, Body::from(body)).await
    }

    async fn send(&mut self, mut request: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let response = self
            .router
            .clone()
            .oneshot(request.body(body).expect("valid request"))
            .await
            .expect("router is infallible");

        if let Some(cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
        {
            self.cookie = Some(cookie.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Add `slug` in size M, color Blue.
    pub async fn add_to_cart(&mut self, slug: &str, quantity: u32) -> TestResponse {
        let quantity = quantity.to_string();
        self.post_form(
            "/cart/add",
            &[
                ("slug", slug),
                ("size", "M"),
                ("color", "Blue"),
                ("quantity", quantity.as_str()),
                ("return_to", "/cart"),
            ],
        )
        .await
    }

    /// Line ids in the order the cart page lists them.
    pub async fn line_ids(&mut self) -> Vec<String> {
        let page = self.get("/cart").await;
        let mut ids: Vec<String> = page
            .body
            .split("name=\"line_id\" value=\"")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .map(str::to_string)
            .collect();
        // Each line carries the id in three forms (-, +, remove).
        ids.dedup();
        ids
    }
}

/// A complete checkout form.
#[must_use]
pub fn checkout_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Ada Lovelace"),
        ("email", "ada@example.com"),
        ("phone", "555-0100"),
        ("street", "12 Analytical Way"),
        ("city", "Springfield"),
        ("state", "IL"),
        ("zip", "62701"),
        ("country", ""),
    ]
}
