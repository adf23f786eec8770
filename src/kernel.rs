// ============================================================================
// kernel.rs — Gray-Scott
// Reaction-diffusion update: 9-point weighted Laplacian on a torus, forward
// Euler step, clamped to [0, 1]. Rows are updated in parallel with rayon.
// ============================================================================

use rayon::prelude::*;

/// Fixed integration step. Forward Euler with the stencil below is stable
/// while `dt * D * STENCIL_SPECTRAL_RADIUS < 2`; see [`stability_number`].
pub const DT: f32 = 0.75;

/// Magnitude of the most negative eigenvalue of [`STENCIL`] (checkerboard
/// mode: -1 - 4*0.2 + 4*0.05).
pub const STENCIL_SPECTRAL_RADIUS: f32 = 1.6;

/// Laplacian weights, row-major around the center cell.
#[rustfmt::skip]
pub const STENCIL: [f32; 9] = [
    0.05, 0.20, 0.05,
    0.20, -1.0, 0.20,
    0.05, 0.20, 0.05,
];

/// Kernel inputs for one tick. Copied out of the live control parameters so
/// workers never see a half-written set.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct KernelParams {
    pub feed_rate: f32,
    pub kill_rate: f32,
    pub diffusion_a: f32,
    pub diffusion_b: f32,
    pub dt: f32,
}

/// `dt * D * radius / 2`; the explicit step is stable below 1.
pub fn stability_number(diffusion: f32, dt: f32) -> f32 {
    dt * diffusion * STENCIL_SPECTRAL_RADIUS / 2.0
}

/// Read-only view of one generation of both species.
#[derive(Copy, Clone)]
pub struct Generation<'a> {
    pub width: usize,
    pub height: usize,
    pub a: &'a [f32],
    pub b: &'a [f32],
}

/// Weighted Laplacian of `field` at `(x, y)` with toroidal wraparound.
pub fn laplacian(field: &[f32], width: usize, height: usize, x: usize, y: usize) -> f32 {
    let xs = [(x + width - 1) % width, x, (x + 1) % width];
    let ys = [(y + height - 1) % height, y, (y + 1) % height];

    let mut sum = 0.0;
    for (j, &ny) in ys.iter().enumerate() {
        let row = ny * width;
        for (i, &nx) in xs.iter().enumerate() {
            sum += STENCIL[j * 3 + i] * field[row + nx];
        }
    }
    sum
}

/// Gray-Scott update for a single cell.
pub fn react(a: f32, b: f32, lap_a: f32, lap_b: f32, p: &KernelParams) -> (f32, f32) {
    let reaction = a * b * b;
    let da = p.diffusion_a * lap_a - reaction + p.feed_rate * (1.0 - a);
    let db = p.diffusion_b * lap_b + reaction - (p.kill_rate + p.feed_rate) * b;
    (
        (a + da * p.dt).clamp(0.0, 1.0),
        (b + db * p.dt).clamp(0.0, 1.0),
    )
}

/// Advance `src` by one step into `dst_a` / `dst_b`. The destination slices
/// must be distinct from the source and have the same length.
pub fn step(src: Generation<'_>, dst_a: &mut [f32], dst_b: &mut [f32], params: &KernelParams) {
    let Generation { width, height, a, b } = src;
    debug_assert_eq!(a.len(), width * height);
    debug_assert_eq!(dst_a.len(), a.len());
    debug_assert_eq!(dst_b.len(), b.len());

    dst_a
        .par_chunks_mut(width)
        .zip(dst_b.par_chunks_mut(width))
        .enumerate()
        .for_each(|(y, (row_a, row_b))| {
            for x in 0..width {
                let i = y * width + x;
                let lap_a = laplacian(a, width, height, x, y);
                let lap_b = laplacian(b, width, height, x, y);
                let (na, nb) = react(a[i], b[i], lap_a, lap_b, params);
                row_a[x] = na;
                row_b[x] = nb;
            }
        });
}
