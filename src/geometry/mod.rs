//! Page-space geometry
//!
//! Conversions between device-pixel rectangles and percentage-of-page
//! rectangles. Mapped areas are persisted in percentage space so they stay
//! anchored to the page across zoom levels, re-renders and screen sizes.
//!
//! All functions are pure; nothing here retains state.

use serde::{Deserialize, Serialize};

/// A rectangle in device pixels, relative to some container (drawing canvas
/// or page raster).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build a rectangle from two opposite corners, in any drag direction.
    pub fn from_corners(ax: f64, ay: f64, bx: f64, by: f64) -> Self {
        Self {
            left: ax.min(bx),
            top: ay.min(by),
            width: (ax - bx).abs(),
            height: (ay - by).abs(),
        }
    }

    /// True when the rectangle has positive extent in both axes.
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Whether a point falls inside the rectangle (edges inclusive).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left
            && x <= self.left + self.width
            && y >= self.top
            && y <= self.top + self.height
    }
}

/// A rectangle in percentage-of-page space. Each field is a percentage in
/// `[0, 100]` of the page's full rendered width/height at any scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PercentRect {
    /// Clamp into the page. Overflow past 100 can only arise from floating
    /// error at capture time, so clamping here never visibly moves a shape.
    pub fn clamped(self) -> Self {
        let x = self.x.clamp(0.0, 100.0);
        let y = self.y.clamp(0.0, 100.0);
        Self {
            x,
            y,
            width: self.width.clamp(0.0, 100.0 - x),
            height: self.height.clamp(0.0, 100.0 - y),
        }
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Pixel dimensions of a container: a drawing canvas or a page raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Convert a pixel rectangle to percentage space.
///
/// The container must have positive dimensions; callers validate sizes at
/// the boundary (sessions reject zero-sized canvases on creation).
pub fn to_percentage(rect: PixelRect, container: ContainerSize) -> PercentRect {
    PercentRect {
        x: rect.left / container.width * 100.0,
        y: rect.top / container.height * 100.0,
        width: rect.width / container.width * 100.0,
        height: rect.height / container.height * 100.0,
    }
}

/// Convert a percentage rectangle back to pixels against a container that
/// may differ in size from the one used at capture time.
pub fn to_pixels(rect: PercentRect, container: ContainerSize) -> PixelRect {
    PixelRect {
        left: rect.x / 100.0 * container.width,
        top: rect.y / 100.0 * container.height,
        width: rect.width / 100.0 * container.width,
        height: rect.height / 100.0 * container.height,
    }
}

/// Re-project a pixel rectangle from one container onto another.
///
/// Used when the snippet-extraction raster's pixel size differs from the
/// on-screen drawing canvas (different device-pixel ratio or render scale).
pub fn rescale(rect: PixelRect, from: ContainerSize, to: ContainerSize) -> PixelRect {
    to_pixels(to_percentage(rect, from), to)
}
