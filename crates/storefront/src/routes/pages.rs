//! Legal page route handlers.
//!
//! Serves the markdown-based privacy, terms, shipping and returns pages, both
//! standalone and as the legal overlay on catalog pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use garys_store_core::navigation::LegalPage;
use tower_sessions::Session;
use tracing::instrument;

use super::layout::Layout;
use crate::content::Page;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::session::load_cart;
use crate::state::AppState;

/// Legal page display data for templates.
#[derive(Debug, Clone)]
pub struct LegalView {
    pub title: String,
    pub description: String,
    pub updated: Option<String>,
    pub content_html: String,
    pub close_href: String,
}

impl LegalView {
    #[must_use]
    pub fn new(page: &Page, close_href: impl Into<String>) -> Self {
        Self {
            title: page.meta.title.clone(),
            description: page.meta.description.clone().unwrap_or_default(),
            updated: page.updated_display(),
            content_html: page.content_html.clone(),
            close_href: close_href.into(),
        }
    }
}

/// Standalone legal page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/content.html")]
pub struct ContentPageTemplate {
    pub layout: Layout,
    pub legal: LegalView,
}

/// Display a legal page by slug.
///
/// # Errors
///
/// Returns 404 if the slug is not one of the legal pages or its content is
/// missing.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let page = LegalPage::from_slug(&slug)
        .and_then(|page| state.content().get_page(page))
        .ok_or_else(|| AppError::NotFound(format!("page {slug}")))?;

    let cart = load_cart(&session).await;
    Ok(ContentPageTemplate {
        layout: Layout::standalone(&cart),
        legal: LegalView::new(page, "/"),
    })
}
