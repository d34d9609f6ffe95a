//! Snippet extraction
//!
//! Crops the rendered page raster to a mapped rectangle and re-encodes the
//! result as a self-contained JPEG `data:` URL. The rectangle arrives in
//! percentage space together with the drawing canvas's displayed size (the
//! space the user actually drew in); the raster may be a different pixel
//! size, so the crop window is re-projected before cropping.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::geometry::{self, ContainerSize, PercentRect};

/// JPEG quality for extracted snippets.
pub const JPEG_QUALITY: u8 = 90;

/// Encoded outputs below this size almost certainly mean the capture went
/// wrong (a valid JPEG header alone is larger). Non-fatal: the caller warns
/// the admin rather than silently persisting a corrupt snippet.
pub const MIN_PLAUSIBLE_BYTES: usize = 100;

/// An extracted, encoded page snippet.
#[derive(Debug, Clone, PartialEq)]
pub struct Snippet {
    pub encoded: Vec<u8>,
}

impl Snippet {
    pub fn len(&self) -> usize {
        self.encoded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoded.is_empty()
    }

    /// Implausibly small captures should be surfaced to the admin as a
    /// warning before saving.
    pub fn is_suspicious(&self) -> bool {
        self.encoded.len() < MIN_PLAUSIBLE_BYTES
    }

    /// Embeddable representation persisted as `extractedImageUrl`.
    pub fn to_data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", BASE64.encode(&self.encoded))
    }
}

/// Crop `rect` out of the page raster and encode it.
///
/// Returns `None` when no raster is available, the crop window rounds to
/// zero pixels, or encoding fails; the caller falls back to a manual image
/// upload. Identical inputs produce byte-identical output.
pub fn extract(
    rect: PercentRect,
    raster: Option<&DynamicImage>,
    canvas: ContainerSize,
) -> Option<Snippet> {
    let raster = raster?;
    if !canvas.is_valid() {
        return None;
    }

    // Back to the canvas pixels the admin drew in, then onto the raster's
    // native pixel grid.
    let canvas_rect = geometry::to_pixels(rect, canvas);
    let raster_size = ContainerSize::new(f64::from(raster.width()), f64::from(raster.height()));
    let crop = geometry::rescale(canvas_rect, canvas, raster_size);

    let x = (crop.left.round().max(0.0) as u32).min(raster.width());
    let y = (crop.top.round().max(0.0) as u32).min(raster.height());
    let width = (crop.width.round().max(0.0) as u32).min(raster.width() - x);
    let height = (crop.height.round().max(0.0) as u32).min(raster.height() - y);

    if width == 0 || height == 0 {
        return None;
    }

    let cropped = raster.crop_imm(x, y, width, height).to_rgb8();

    let mut encoded = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY);
    if let Err(e) = encoder.encode_image(&cropped) {
        tracing::warn!("Snippet encoding failed for {}x{} crop: {}", width, height, e);
        return None;
    }

    Some(Snippet { encoded })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    /// Gradient raster so crops at different offsets differ in content.
    fn raster(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        }))
    }

    #[test]
    fn test_missing_raster_returns_none() {
        let rect = PercentRect {
            x: 10.0,
            y: 10.0,
            width: 50.0,
            height: 50.0,
        };
        assert!(extract(rect, None, ContainerSize::new(100.0, 140.0)).is_none());
    }

    #[test]
    fn test_zero_sized_crop_returns_none() {
        let img = raster(200, 280);
        let rect = PercentRect {
            x: 10.0,
            y: 10.0,
            width: 0.0,
            height: 5.0,
        };
        assert!(extract(rect, Some(&img), ContainerSize::new(100.0, 140.0)).is_none());
    }

    #[test]
    fn test_crop_window_scales_to_raster() {
        // Canvas displayed at 100x140, raster rendered at 200x280 (factor 2).
        // A rect at canvas pixels (10,5,20,10) crops raster pixels
        // (20,10,40,20).
        let img = raster(200, 280);
        let canvas = ContainerSize::new(100.0, 140.0);
        let rect = geometry::to_percentage(
            crate::geometry::PixelRect::new(10.0, 5.0, 20.0, 10.0),
            canvas,
        );

        let snippet = extract(rect, Some(&img), canvas).unwrap();
        assert!(!snippet.is_suspicious());

        let decoded = image::load_from_memory(&snippet.encoded).unwrap();
        assert_eq!(decoded.width(), 40);
        assert_eq!(decoded.height(), 20);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let img = raster(160, 200);
        let canvas = ContainerSize::new(80.0, 100.0);
        let rect = PercentRect {
            x: 12.5,
            y: 25.0,
            width: 50.0,
            height: 30.0,
        };

        let first = extract(rect, Some(&img), canvas).unwrap();
        let second = extract(rect, Some(&img), canvas).unwrap();
        assert_eq!(first.encoded, second.encoded);
    }

    #[test]
    fn test_crop_clamped_to_raster_bounds() {
        // Unclamped legacy coordinates may overhang the page slightly.
        let img = raster(100, 100);
        let canvas = ContainerSize::new(100.0, 100.0);
        let rect = PercentRect {
            x: 90.0,
            y: 90.0,
            width: 20.0,
            height: 20.0,
        };

        let snippet = extract(rect, Some(&img), canvas).unwrap();
        let decoded = image::load_from_memory(&snippet.encoded).unwrap();
        assert_eq!(decoded.width(), 10);
        assert_eq!(decoded.height(), 10);
    }

    #[test]
    fn test_data_url_shape() {
        let snippet = Snippet {
            encoded: vec![0xFF, 0xD8, 0xFF],
        };
        let url = snippet.to_data_url();
        assert!(url.starts_with("data:image/jpeg;base64,"));
        assert!(snippet.is_suspicious());
    }
}
