//! Hotspot projection
//!
//! Re-projects persisted percent-space areas onto whatever page container a
//! viewer is currently displaying, producing clickable hotspot boxes.

use crate::geometry::{self, ContainerSize, PixelRect};

use super::types::MappedArea;

/// Base z-index for hotspot stacking; later areas stack above earlier ones
/// so slightly overlapping regions stay clickable.
const BASE_Z_INDEX: u32 = 100;

/// An on-screen hotspot box tied back to its source area.
#[derive(Debug, Clone)]
pub struct Hotspot<'a> {
    /// Box in the current container's pixels.
    pub rect: PixelRect,
    /// Stacking order; strictly increasing with input order.
    pub z_index: u32,
    /// Index of the source area in the input slice.
    pub area_index: usize,
    pub area: &'a MappedArea,
}

/// Compute hotspot boxes for the areas on `current_page`.
///
/// Areas on other pages never appear. Output order follows input order.
pub fn project(
    areas: &[MappedArea],
    current_page: u32,
    container: ContainerSize,
) -> Vec<Hotspot<'_>> {
    areas
        .iter()
        .enumerate()
        .filter(|(_, area)| area.page_number == current_page)
        .enumerate()
        .map(|(order, (area_index, area))| Hotspot {
            rect: geometry::to_pixels(area.coordinates, container),
            z_index: BASE_Z_INDEX + order as u32,
            area_index,
            area,
        })
        .collect()
}

/// Resolve a click/tap at container pixel `(x, y)` to the topmost hotspot's
/// source area.
pub fn hit_test<'a>(hotspots: &[Hotspot<'a>], x: f64, y: f64) -> Option<&'a MappedArea> {
    hotspots
        .iter()
        .rev()
        .find(|h| h.rect.contains(x, y))
        .map(|h| h.area)
}
