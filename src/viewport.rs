// ============================================================================
// viewport.rs — Gray-Scott
// Output image size and the integer zoom from grid cells to screen pixels.
// ============================================================================

use serde::{Deserialize, Serialize};

/// Fixed simulation grid dimensions, chosen once at startup.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Cell count, or `None` if it does not fit in `usize`.
    pub fn cells(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }
}

/// Presentation surface state. Only the presentation layer mutates it; the
/// render stage reads it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub zoom: u32,
}

impl Viewport {
    /// Viewport sized exactly to the grid (zoom = 2, see [`zoom_for`]).
    pub fn for_grid(grid: GridSize) -> Self {
        let mut viewport = Self {
            width: 0,
            height: 0,
            zoom: 1,
        };
        viewport.resize(grid, grid.width, grid.height);
        viewport
    }

    /// Adopt a new surface size and recompute the zoom factor.
    pub fn resize(&mut self, grid: GridSize, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.zoom = zoom_for(grid, width, height);
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// `1 + floor(min(vw / gw, vh / gh))`.
pub fn zoom_for(grid: GridSize, width: u32, height: u32) -> u32 {
    if grid.width == 0 || grid.height == 0 {
        return 1;
    }
    let fit = (width as f32 / grid.width as f32).min(height as f32 / grid.height as f32);
    1 + fit.floor() as u32
}
