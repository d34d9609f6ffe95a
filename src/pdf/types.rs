//! Rasterizer types

use image::DynamicImage;

/// A rendered page: encoded bitmap plus its pixel dimensions.
///
/// `width`/`height` are the raster's native device pixels at the requested
/// scale; snippet extraction needs them to re-project canvas-space
/// rectangles onto the raster grid.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// PNG-encoded page image.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl RenderedPage {
    pub const CONTENT_TYPE: &'static str = "image/png";

    /// Decode back to a bitmap for cropping.
    pub fn decode(&self) -> Option<DynamicImage> {
        image::load_from_memory(&self.data).ok()
    }
}

/// Rasterizer errors
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to load PDF: {0}")]
    Load(String),

    #[error("Issue '{0}' has no loaded document")]
    NotLoaded(String),

    #[error("Page {page} is out of range (valid range: 1-{page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },

    #[error("Failed to render page: {0}")]
    Render(String),

    #[error("Failed to encode page image: {0}")]
    Encode(String),

    #[error("Render task failed: {0}")]
    TaskJoin(String),
}

impl From<mupdf::Error> for RenderError {
    fn from(e: mupdf::Error) -> Self {
        RenderError::Render(e.to_string())
    }
}
