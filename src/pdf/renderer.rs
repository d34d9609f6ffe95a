//! Page rendering
//!
//! Renders issue pages to PNG via MuPDF. The rasterizer contract is
//! `render(issue, page, scale) -> {bitmap, width, height}`; page numbers
//! are 1-indexed and scale is clamped to a sane range.

use std::io::Cursor;

use image::DynamicImage;
use mupdf::{Colorspace, Matrix};

use super::document::IssueDocument;
use super::types::{RenderError, RenderedPage};

pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 4.0;

/// Render a page (1-indexed) at the given scale factor.
pub fn render_page(doc: &IssueDocument, page: u32, scale: f32) -> Result<RenderedPage, RenderError> {
    if page == 0 || page > doc.page_count() {
        return Err(RenderError::PageOutOfRange {
            page,
            page_count: doc.page_count(),
        });
    }

    let scale = scale.clamp(MIN_SCALE, MAX_SCALE);

    doc.with_doc(|mupdf_doc| {
        let pdf_page = mupdf_doc.load_page(page as i32 - 1)?;

        let matrix = Matrix::new_scale(scale, scale);
        let colorspace = Colorspace::device_rgb();
        let pixmap = pdf_page.to_pixmap(&matrix, &colorspace, true, true)?;

        let (data, width, height) = encode_pixmap_png(&pixmap)?;
        Ok(RenderedPage {
            data,
            width,
            height,
        })
    })
}

fn encode_pixmap_png(pixmap: &mupdf::Pixmap) -> Result<(Vec<u8>, u32, u32), RenderError> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize;

    // Convert to RGBA buffer
    let mut rgba_buffer = Vec::with_capacity((width * height * 4) as usize);

    for y in 0..height as usize {
        for x in 0..width as usize {
            let offset = (y * width as usize + x) * n;
            let r = samples.get(offset).copied().unwrap_or(0);
            let g = samples.get(offset + 1).copied().unwrap_or(0);
            let b = samples.get(offset + 2).copied().unwrap_or(0);
            let a = if n >= 4 {
                samples.get(offset + 3).copied().unwrap_or(255)
            } else {
                255
            };
            rgba_buffer.extend_from_slice(&[r, g, b, a]);
        }
    }

    let img = image::RgbaImage::from_raw(width, height, rgba_buffer)
        .ok_or_else(|| RenderError::Encode("Failed to create image buffer".to_string()))?;

    let mut output = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut output), image::ImageFormat::Png)
        .map_err(|e| RenderError::Encode(e.to_string()))?;

    Ok((output, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::minimal_pdf;

    #[test]
    fn test_render_blank_page_dimensions() {
        let doc = IssueDocument::from_bytes(minimal_pdf(1), "test".to_string()).unwrap();

        // US Letter media box is 612x792 points; scale 1.0 maps points to
        // pixels one-to-one.
        let page = render_page(&doc, 1, 1.0).unwrap();
        assert_eq!(page.width, 612);
        assert_eq!(page.height, 792);
        assert!(page.decode().is_some());

        let page2x = render_page(&doc, 1, 2.0).unwrap();
        assert_eq!(page2x.width, 1224);
        assert_eq!(page2x.height, 1584);
    }

    #[test]
    fn test_render_out_of_range_page() {
        let doc = IssueDocument::from_bytes(minimal_pdf(2), "test".to_string()).unwrap();

        assert!(matches!(
            render_page(&doc, 0, 1.0),
            Err(RenderError::PageOutOfRange { .. })
        ));
        assert!(matches!(
            render_page(&doc, 3, 1.0),
            Err(RenderError::PageOutOfRange { .. })
        ));
        assert!(render_page(&doc, 2, 1.0).is_ok());
    }

    #[test]
    fn test_invalid_pdf_rejected() {
        assert!(matches!(
            IssueDocument::from_bytes(b"not a pdf".to_vec(), "bad".to_string()),
            Err(RenderError::Load(_))
        ));
    }
}
