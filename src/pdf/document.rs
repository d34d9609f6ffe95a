//! Thread-safe issue document wrapper
//!
//! MuPDF documents are not thread-safe. This wrapper keeps only the PDF
//! bytes, opens a fresh document for each operation, and serializes access
//! through a mutex so no document reference ever escapes a closure.

use std::sync::Arc;

use mupdf::Document;
use parking_lot::Mutex;

use super::types::RenderError;

const PDF_MIME: &str = "application/pdf";

/// An uploaded newspaper issue's PDF, ready for page rendering.
pub struct IssueDocument {
    data: Arc<Vec<u8>>,
    id: String,
    page_count: u32,
    lock: Mutex<()>,
}

impl IssueDocument {
    /// Validate the PDF bytes and record the page count.
    pub fn from_bytes(data: Vec<u8>, id: String) -> Result<Self, RenderError> {
        let doc = Document::from_bytes(&data, PDF_MIME)
            .map_err(|e| RenderError::Load(e.to_string()))?;
        let page_count = doc
            .page_count()
            .map_err(|e| RenderError::Load(e.to_string()))? as u32;

        if page_count == 0 {
            return Err(RenderError::Load("PDF has no pages".to_string()));
        }

        Ok(Self {
            data: Arc::new(data),
            id,
            page_count,
            lock: Mutex::new(()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Execute a closure with exclusive access to a freshly opened document.
    pub fn with_doc<F, R>(&self, f: F) -> Result<R, RenderError>
    where
        F: FnOnce(&Document) -> Result<R, RenderError>,
    {
        let _guard = self.lock.lock();
        let doc = Document::from_bytes(&self.data, PDF_MIME)
            .map_err(|e| RenderError::Load(e.to_string()))?;
        f(&doc)
    }
}
