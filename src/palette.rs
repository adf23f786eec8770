// ============================================================================
// palette.rs — Gray-Scott
// 256-entry false-color lookup table, compiled in from gradient stops.
// ============================================================================

pub const PALETTE_SIZE: usize = 256;

/// Gradient control points `(position, rgb)`, positions ascending in [0, 1].
const STOPS: [(f32, [f32; 3]); 6] = [
    (0.00, [0.00, 0.00, 0.04]),
    (0.20, [0.05, 0.10, 0.45]),
    (0.40, [0.00, 0.55, 0.80]),
    (0.60, [0.35, 0.85, 0.55]),
    (0.80, [0.98, 0.85, 0.20]),
    (1.00, [1.00, 0.97, 0.88]),
];

/// The color table as float triples in [0, 1], evaluated at compile time.
pub const COLORS: [[f32; 3]; PALETTE_SIZE] = build_colors();

/// RGBA8 form of [`COLORS`], which is what the render stage writes.
pub struct Palette {
    rgba8: [[u8; 4]; PALETTE_SIZE],
}

impl Palette {
    pub fn new() -> Self {
        let mut rgba8 = [[0u8; 4]; PALETTE_SIZE];
        for (dst, src) in rgba8.iter_mut().zip(COLORS.iter()) {
            *dst = [to_u8(src[0]), to_u8(src[1]), to_u8(src[2]), 255];
        }
        Self { rgba8 }
    }

    pub fn rgba8(&self, index: u8) -> [u8; 4] {
        self.rgba8[index as usize]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

/// Quantize a product concentration: `clamp(round(b * scale * 255), 0, 255)`.
pub fn palette_index(b: f32, scale: f32) -> u8 {
    // NaN saturates to 0 in the cast.
    (b * scale * 255.0).round().clamp(0.0, 255.0) as u8
}

const fn build_colors() -> [[f32; 3]; PALETTE_SIZE] {
    let mut colors = [[0.0; 3]; PALETTE_SIZE];
    let mut i = 0;
    while i < PALETTE_SIZE {
        colors[i] = gradient(i as f32 / (PALETTE_SIZE - 1) as f32);
        i += 1;
    }
    colors
}

/// Piecewise-linear interpolation between [`STOPS`]; `t` in [0, 1].
const fn gradient(t: f32) -> [f32; 3] {
    let mut k = 1;
    while k < STOPS.len() {
        let (t0, c0) = STOPS[k - 1];
        let (t1, c1) = STOPS[k];
        if t <= t1 {
            let f = (t - t0) / (t1 - t0);
            return [
                lerp(c0[0], c1[0], f),
                lerp(c0[1], c1[1], f),
                lerp(c0[2], c1[2], f),
            ];
        }
        k += 1;
    }
    STOPS[STOPS.len() - 1].1
}

const fn lerp(from: f32, to: f32, f: f32) -> f32 {
    from + (to - from) * f
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_unit_floats() {
        let palette = Palette::new();
        for (i, color) in COLORS.iter().enumerate() {
            assert!(color.iter().all(|c| (0.0..=1.0).contains(c)));
            assert_eq!(palette.rgba8(i as u8)[3], 255);
        }
    }

    #[test]
    fn endpoints_match_gradient_stops() {
        assert_eq!(COLORS[0], STOPS[0].1);
        for (c, s) in COLORS[PALETTE_SIZE - 1].iter().zip(STOPS[5].1.iter()) {
            assert!((c - s).abs() < 1e-6);
        }
        assert_eq!(Palette::new().rgba8(0), [0, 0, 10, 255]);
    }

    #[test]
    fn index_quantizes_and_clamps() {
        assert_eq!(palette_index(0.0, 1.0), 0);
        assert_eq!(palette_index(1.0, 1.0), 255);
        assert_eq!(palette_index(0.5, 1.0), 128);
        assert_eq!(palette_index(1.0, 1.5), 255);
        assert_eq!(palette_index(-0.2, 1.0), 0);
        assert_eq!(palette_index(f32::NAN, 1.0), 0);
    }

    #[test]
    fn index_is_monotonic_in_scale() {
        for b in [0.0f32, 0.01, 0.1, 0.33, 0.5, 0.77, 1.0] {
            let mut prev = 0u8;
            for step in 0..=100 {
                let scale = 0.5 + step as f32 / 100.0;
                let idx = palette_index(b, scale);
                assert!(idx >= prev, "b={b} scale={scale}: {idx} < {prev}");
                prev = idx;
            }
        }
    }
}
