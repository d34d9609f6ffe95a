//! Rasterizer cache
//!
//! Holds loaded issue documents and an LRU of rendered pages so repeated
//! views and snippet extractions do not re-render. Rendering is CPU-bound
//! MuPDF work and runs on the blocking thread pool.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::RwLock;

use super::document::IssueDocument;
use super::renderer::{self, MAX_SCALE, MIN_SCALE};
use super::types::{RenderError, RenderedPage};

/// Cache key for rendered pages
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct PageKey {
    issue_id: String,
    page: u32,
    /// Scale * 100 as integer for hashing
    scale: u32,
}

impl PageKey {
    fn new(issue_id: &str, page: u32, scale: f32) -> Self {
        Self {
            issue_id: issue_id.to_string(),
            page,
            scale: (scale * 100.0).round() as u32,
        }
    }
}

/// Thread-safe page render cache
#[derive(Clone)]
pub struct PageCache {
    docs: Arc<RwLock<HashMap<String, Arc<IssueDocument>>>>,
    pages: Arc<RwLock<LruCache<PageKey, Arc<RenderedPage>>>>,
}

impl PageCache {
    pub fn new(page_cache_size: usize) -> Self {
        let capacity =
            NonZeroUsize::new(page_cache_size).unwrap_or(NonZeroUsize::new(100).unwrap());
        Self {
            docs: Arc::new(RwLock::new(HashMap::new())),
            pages: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }

    /// Parse PDF bytes and register the document. Returns the page count.
    pub async fn load_from_bytes(&self, issue_id: &str, data: Vec<u8>) -> Result<u32, RenderError> {
        let id = issue_id.to_string();
        let doc = tokio::task::spawn_blocking(move || IssueDocument::from_bytes(data, id))
            .await
            .map_err(|e| RenderError::TaskJoin(e.to_string()))??;

        let page_count = doc.page_count();
        tracing::debug!("Loaded issue '{}' with {} pages", doc.id(), page_count);
        self.docs
            .write()
            .await
            .insert(issue_id.to_string(), Arc::new(doc));

        Ok(page_count)
    }

    pub async fn contains(&self, issue_id: &str) -> bool {
        self.docs.read().await.contains_key(issue_id)
    }

    pub async fn page_count(&self, issue_id: &str) -> Option<u32> {
        self.docs
            .read()
            .await
            .get(issue_id)
            .map(|doc| doc.page_count())
    }

    /// Drop a document and every cached render of its pages.
    pub async fn remove(&self, issue_id: &str) {
        self.docs.write().await.remove(issue_id);

        let mut pages = self.pages.write().await;
        let stale: Vec<PageKey> = pages
            .iter()
            .filter(|(key, _)| key.issue_id == issue_id)
            .map(|(key, _)| key.clone())
            .collect();
        for key in stale {
            pages.pop(&key);
        }
    }

    /// Render a page (1-indexed) at the given scale, serving repeats from
    /// the LRU cache.
    pub async fn render_page(
        &self,
        issue_id: &str,
        page: u32,
        scale: f32,
    ) -> Result<Arc<RenderedPage>, RenderError> {
        let scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        let key = PageKey::new(issue_id, page, scale);

        if let Some(hit) = self.pages.write().await.get(&key) {
            return Ok(hit.clone());
        }

        let doc = self
            .docs
            .read()
            .await
            .get(issue_id)
            .cloned()
            .ok_or_else(|| RenderError::NotLoaded(issue_id.to_string()))?;

        let rendered =
            tokio::task::spawn_blocking(move || renderer::render_page(&doc, page, scale))
                .await
                .map_err(|e| RenderError::TaskJoin(e.to_string()))??;

        let rendered = Arc::new(rendered);
        self.pages.write().await.put(key, rendered.clone());
        Ok(rendered)
    }
}
