//! PostgREST client for the hosted backend.
//!
//! Every request carries the anon key both as `apikey` and as a bearer token.
//! Reads use `select`/`order` query parameters; the order insert asks for
//! `return=minimal` so the backend does not echo the row back.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use garys_store_core::catalog::{Category, Product};
use garys_store_core::order::OrderDraft;
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::form_urlencoded;

use super::{BackendError, StoreBackend};
use crate::config::SupabaseConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the backend's REST interface.
#[derive(Clone)]
pub struct RestBackend {
    inner: Arc<RestBackendInner>,
}

struct RestBackendInner {
    client: reqwest::Client,
    /// `<project url>/rest/v1`, no trailing slash
    endpoint: String,
    anon_key: String,
}

impl RestBackend {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &SupabaseConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let endpoint = format!("{}/rest/v1", config.url.as_str().trim_end_matches('/'));

        Ok(Self {
            inner: Arc::new(RestBackendInner {
                client,
                endpoint,
                anon_key: config.anon_key.expose_secret().to_string(),
            }),
        })
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(&self.inner.anon_key)
            .header("Accept", "application/json")
    }

    fn get(&self, table_and_query: &str) -> RequestBuilder {
        let url = format!("{}/{table_and_query}", self.inner.endpoint);
        self.request(self.inner.client.get(url))
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, builder: RequestBuilder) -> Result<String, BackendError> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(BackendError::RateLimited(retry_after(&response)));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        Ok(body)
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table_and_query: &str,
    ) -> Result<Vec<T>, BackendError> {
        let body = self.execute(self.get(table_and_query)).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend rows"
            );
            BackendError::Parse(e)
        })
    }
}

fn retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(1)
}

#[async_trait]
impl StoreBackend for RestBackend {
    #[instrument(skip(self))]
    async fn fetch_categories(&self) -> Result<Vec<Category>, BackendError> {
        let categories: Vec<Category> = self.fetch_rows("categories?select=*&order=name.asc").await?;
        debug!(count = categories.len(), "Fetched categories");
        Ok(categories)
    }

    #[instrument(skip(self))]
    async fn fetch_products(&self) -> Result<Vec<Product>, BackendError> {
        let products: Vec<Product> = self
            .fetch_rows("products?select=*&order=created_at.desc")
            .await?;
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn fetch_product(&self, slug: &str) -> Result<Option<Product>, BackendError> {
        let slug: String = form_urlencoded::byte_serialize(slug.as_bytes()).collect();
        let mut rows: Vec<Product> = self
            .fetch_rows(&format!("products?select=*&slug=eq.{slug}&limit=1"))
            .await?;
        Ok(rows.pop())
    }

    #[instrument(skip(self, order), fields(order_number = %order.order_number))]
    async fn insert_order(&self, order: &OrderDraft) -> Result<(), BackendError> {
        let url = format!("{}/orders", self.inner.endpoint);
        let builder = self
            .request(self.inner.client.post(url))
            .header("Prefer", "return=minimal")
            .json(order);
        self.execute(builder).await?;
        debug!("Order inserted");
        Ok(())
    }

    async fn ping(&self) -> Result<(), BackendError> {
        self.execute(self.get("categories?select=id&limit=1")).await?;
        Ok(())
    }
}
