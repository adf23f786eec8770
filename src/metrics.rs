// ============================================================================
// metrics.rs — Gray-Scott
// Field diagnostics computed from the committed generation, for periodic
// logging in both the viewer and the headless runner.
// ============================================================================

use crate::world::World;

/// Concentration above which a cell counts as occupied by product. Settled
/// patterns peak a little under 0.5 at the default parameters.
pub const OCCUPIED_THRESHOLD: f32 = 0.25;

/// Summary statistics of one generation.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDiagnostics {
    pub mean_a: f32,
    pub mean_b: f32,
    pub max_b: f32,
    /// Fraction of cells with B above [`OCCUPIED_THRESHOLD`].
    pub coverage: f32,
}

impl FieldDiagnostics {
    pub fn from_world(world: &World) -> Self {
        let a = world.species_a();
        let b = world.species_b();
        let n = b.len().max(1) as f64;

        let sum_a: f64 = a.iter().map(|&v| v as f64).sum();
        let mut sum_b = 0.0f64;
        let mut max_b = 0.0f32;
        let mut occupied = 0usize;
        for &v in b {
            sum_b += v as f64;
            max_b = max_b.max(v);
            if v > OCCUPIED_THRESHOLD {
                occupied += 1;
            }
        }

        Self {
            mean_a: (sum_a / n) as f32,
            mean_b: (sum_b / n) as f32,
            max_b,
            coverage: (occupied as f64 / n) as f32,
        }
    }

    /// Log a one-line report, with deltas against the previous sample.
    pub fn log(&self, tick: u64, prev: Option<&FieldDiagnostics>) {
        match prev {
            Some(p) => log::info!(
                "[diag] tick={} mean_a={:.4} mean_b={:.4} ({:+.4}) max_b={:.3} coverage={:.2}% ({:+.2}%)",
                tick,
                self.mean_a,
                self.mean_b,
                self.mean_b - p.mean_b,
                self.max_b,
                self.coverage * 100.0,
                (self.coverage - p.coverage) * 100.0,
            ),
            None => log::info!(
                "[diag] tick={} mean_a={:.4} mean_b={:.4} max_b={:.3} coverage={:.2}%",
                tick,
                self.mean_a,
                self.mean_b,
                self.max_b,
                self.coverage * 100.0,
            ),
        }

        if self.max_b <= f32::EPSILON {
            log::warn!("[diag] product has died out at tick {}", tick);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::GridSize;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn freshly_reset_world() {
        let mut world = World::new(GridSize::new(200, 200)).unwrap();
        let seeded = world.reset(&mut StdRng::seed_from_u64(9));
        let diag = FieldDiagnostics::from_world(&world);

        assert_eq!(diag.mean_a, 1.0);
        assert_eq!(diag.max_b, 1.0);
        let expected = seeded as f32 / 40_000.0;
        assert!((diag.coverage - expected).abs() < 1e-6);
        assert!((diag.mean_b - expected).abs() < 1e-6);
    }

    #[test]
    fn coverage_counts_pattern_level_product() {
        let mut world = World::new(GridSize::new(4, 4)).unwrap();
        let mut b = [0.2f32; 16];
        b[5] = 0.3;
        b[6] = 0.47;
        world.load(&[0.5; 16], &b);
        let diag = FieldDiagnostics::from_world(&world);

        assert_eq!(diag.coverage, 2.0 / 16.0);
        assert_eq!(diag.max_b, 0.47);
    }

    #[test]
    fn unseeded_world_has_no_product() {
        let world = World::new(GridSize::new(10, 10)).unwrap();
        let diag = FieldDiagnostics::from_world(&world);
        assert_eq!(diag.max_b, 0.0);
        assert_eq!(diag.coverage, 0.0);
    }
}
