// ============================================================================
// render.rs — Gray-Scott
// Color-mapping stage: product concentration -> palette -> RGBA frame sized
// to the viewport, nearest-neighbor upscaled by the zoom factor.
// ============================================================================

use image::RgbaImage;
use rayon::prelude::*;

use crate::error::{try_alloc, Result};
use crate::palette::{palette_index, Palette};
use crate::viewport::{GridSize, Viewport};

/// Color of output pixels that no grid cell covers.
pub const BACKGROUND: [u8; 4] = [0, 0, 0, 255];

pub struct FrameRenderer {
    frame: RgbaImage,
}

impl FrameRenderer {
    pub fn new(viewport: &Viewport) -> Result<Self> {
        Ok(Self {
            frame: allocate_frame(viewport)?,
        })
    }

    /// Reallocate the output image for a new viewport size.
    pub fn resize(&mut self, viewport: &Viewport) -> Result<()> {
        if self.frame.dimensions() != (viewport.width, viewport.height) {
            self.frame = allocate_frame(viewport)?;
        }
        Ok(())
    }

    /// Latest rendered image.
    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    /// Paint `field` (species B, row-major at `grid` size) into the frame.
    pub fn render(
        &mut self,
        field: &[f32],
        grid: GridSize,
        viewport: &Viewport,
        palette: &Palette,
        scale: f32,
    ) {
        let width = self.frame.width() as usize;
        if width == 0 || self.frame.height() == 0 {
            return;
        }
        let zoom = viewport.zoom.max(1) as usize;
        let grid_w = grid.width as usize;
        let grid_h = grid.height as usize;
        let pixels: &mut [u8] = &mut self.frame;

        pixels
            .par_chunks_mut(width * 4)
            .enumerate()
            .for_each(|(py, row)| {
                let gy = py / zoom;
                for (px, pixel) in row.chunks_exact_mut(4).enumerate() {
                    let gx = px / zoom;
                    let rgba = if gx < grid_w && gy < grid_h {
                        palette.rgba8(palette_index(field[gy * grid_w + gx], scale))
                    } else {
                        BACKGROUND
                    };
                    pixel.copy_from_slice(&rgba);
                }
            });
    }
}

fn allocate_frame(viewport: &Viewport) -> Result<RgbaImage> {
    let bytes = viewport.pixel_count().saturating_mul(4);
    let raw = try_alloc("frame buffer", bytes, 0u8)?;
    // Length matches width * height * 4 by construction.
    Ok(RgbaImage::from_raw(viewport.width, viewport.height, raw)
        .unwrap_or_else(|| RgbaImage::new(viewport.width, viewport.height)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::zoom_for;

    fn viewport(grid: GridSize, width: u32, height: u32) -> Viewport {
        Viewport {
            width,
            height,
            zoom: zoom_for(grid, width, height),
        }
    }

    #[test]
    fn cells_are_upscaled_by_zoom() {
        let grid = GridSize::new(2, 2);
        let vp = viewport(grid, 4, 4); // zoom 3
        assert_eq!(vp.zoom, 3);
        let palette = Palette::new();
        let mut renderer = FrameRenderer::new(&vp).unwrap();
        renderer.render(&[0.0, 1.0, 0.5, 0.25], grid, &vp, &palette, 1.0);

        let frame = renderer.frame();
        let c00 = palette.rgba8(0);
        let c10 = palette.rgba8(255);
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(frame.get_pixel(x, y).0, c00);
            }
            assert_eq!(frame.get_pixel(3, y).0, c10);
        }
        assert_eq!(frame.get_pixel(0, 3).0, palette.rgba8(128));
    }

    #[test]
    fn uncovered_pixels_are_background() {
        let grid = GridSize::new(2, 2);
        let vp = Viewport {
            width: 6,
            height: 5,
            zoom: 2,
        };
        let mut renderer = FrameRenderer::new(&vp).unwrap();
        renderer.render(&[1.0; 4], grid, &vp, &Palette::new(), 1.0);
        assert_eq!(renderer.frame().get_pixel(5, 1).0, BACKGROUND);
        assert_eq!(renderer.frame().get_pixel(1, 4).0, BACKGROUND);
    }

    #[test]
    fn alpha_is_opaque_everywhere() {
        let grid = GridSize::new(5, 5);
        let vp = viewport(grid, 12, 9);
        let mut renderer = FrameRenderer::new(&vp).unwrap();
        renderer.render(&[0.3; 25], grid, &vp, &Palette::new(), 1.2);
        assert!(renderer.frame().pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn resize_reallocates_frame() {
        let grid = GridSize::new(10, 10);
        let mut vp = Viewport::for_grid(grid);
        let mut renderer = FrameRenderer::new(&vp).unwrap();
        assert_eq!(renderer.frame().dimensions(), (10, 10));

        vp.resize(grid, 33, 21);
        renderer.resize(&vp).unwrap();
        assert_eq!(renderer.frame().dimensions(), (33, 21));
    }

    #[test]
    fn empty_viewport_renders_nothing() {
        let grid = GridSize::new(4, 4);
        let vp = Viewport {
            width: 0,
            height: 0,
            zoom: 1,
        };
        let mut renderer = FrameRenderer::new(&vp).unwrap();
        renderer.render(&[0.5; 16], grid, &vp, &Palette::new(), 1.0);
        assert_eq!(renderer.frame().dimensions(), (0, 0));
    }
}
