//! PDF rasterization
//!
//! Thin rasterizer around MuPDF: loads uploaded issue PDFs, renders pages
//! at a requested scale, and caches the results. The rest of the crate
//! treats this as a black box producing `{bitmap, width, height}`.

mod cache;
mod document;
mod renderer;
mod types;

pub use cache::PageCache;
pub use document::IssueDocument;
pub use renderer::{render_page, MAX_SCALE, MIN_SCALE};
pub use types::{RenderError, RenderedPage};
