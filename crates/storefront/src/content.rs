//! Markdown content for the legal pages.
//!
//! Pages live in `<content dir>/pages/<slug>.md` with YAML frontmatter and are
//! loaded once at startup. Only the slugs of [`LegalPage`] are served; other
//! files in the directory are ignored.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use garys_store_core::navigation::LegalPage;
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;

/// Frontmatter of a legal page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

/// A rendered page with metadata and HTML content
#[derive(Debug, Clone)]
pub struct Page {
    pub page: LegalPage,
    pub meta: PageMeta,
    pub content_html: String,
}

impl Page {
    /// "Last updated" line, e.g. `January 1, 2025`.
    #[must_use]
    pub fn updated_display(&self) -> Option<String> {
        self.meta
            .updated_at
            .map(|d| d.format("%B %-d, %Y").to_string())
    }
}

/// Content store that holds all loaded pages in memory
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<HashMap<LegalPage, Page>>,
}

impl ContentStore {
    /// Load all legal pages from `content_dir/pages`.
    ///
    /// A missing page is logged and left out; the route for it answers 404.
    ///
    /// # Errors
    ///
    /// Returns an error if the pages directory exists but cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let dir = content_dir.join("pages");
        let mut pages = HashMap::new();

        if !dir.exists() {
            tracing::warn!("Pages directory does not exist: {:?}", dir);
            return Ok(Self::default());
        }
        // Surface an unreadable directory before looking for individual files
        std::fs::read_dir(&dir).map_err(|e| ContentError::Io(e.to_string()))?;

        for page in LegalPage::ALL {
            let path = dir.join(format!("{}.md", page.slug()));
            match Self::load_page(page, &path) {
                Ok(loaded) => {
                    tracing::info!("Loaded page: {}", page.slug());
                    pages.insert(page, loaded);
                }
                Err(e) => {
                    tracing::error!("Failed to load page {:?}: {}", path, e);
                }
            }
        }

        Ok(Self {
            pages: Arc::new(pages),
        })
    }

    fn load_page(page: LegalPage, path: &Path) -> Result<Page, ContentError> {
        let content = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;

        let matter = Matter::<YAML>::new();
        let parsed: ParsedEntity<PageMeta> = matter
            .parse(&content)
            .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
        let meta = parsed
            .data
            .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

        Ok(Page {
            page,
            meta,
            content_html: render_markdown(&parsed.content),
        })
    }

    #[must_use]
    pub fn get_page(&self, page: LegalPage) -> Option<&Page> {
        self.pages.get(&page)
    }

    /// Number of pages loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Render markdown to HTML with GitHub Flavored Markdown support.
fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.header_ids = Some(String::new());

    markdown_to_html(content, &options)
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write_page(dir: &Path, slug: &str, body: &str) {
        let pages = dir.join("pages");
        std::fs::create_dir_all(&pages).unwrap();
        std::fs::write(pages.join(format!("{slug}.md")), body).unwrap();
    }

    #[test]
    fn test_load_renders_markdown_and_frontmatter() {
        let tmp = tempfile::tempdir().unwrap();
        write_page(
            tmp.path(),
            "privacy",
            "---\ntitle: Privacy Policy\nupdated_at: \"2025-01-01\"\n---\n\n## Information We Collect\n\nYour **name**.\n",
        );

        let store = ContentStore::load(tmp.path()).unwrap();
        let page = store.get_page(LegalPage::Privacy).unwrap();

        assert_eq!(page.meta.title, "Privacy Policy");
        assert_eq!(page.updated_display().as_deref(), Some("January 1, 2025"));
        assert!(page.content_html.contains("<strong>name</strong>"));
        assert!(page.content_html.contains("Information We Collect</h2>"));
        assert!(store.get_page(LegalPage::Terms).is_none());
    }

    #[test]
    fn test_unknown_files_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        write_page(tmp.path(), "about", "---\ntitle: About\n---\nHi\n");
        let store = ContentStore::load(tmp.path()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_missing_frontmatter_skips_page() {
        let tmp = tempfile::tempdir().unwrap();
        write_page(tmp.path(), "terms", "# Terms\n\nNo frontmatter here.\n");
        let store = ContentStore::load(tmp.path()).unwrap();
        assert!(store.get_page(LegalPage::Terms).is_none());
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ContentStore::load(&tmp.path().join("nope")).unwrap();
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_shipped_pages_all_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("content");
        let store = ContentStore::load(&dir).unwrap();
        assert_eq!(store.len(), LegalPage::ALL.len());
    }
}
