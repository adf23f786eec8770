// ============================================================================
// world.rs — Gray-Scott
// World: double-buffered concentration fields for both species, plus
// reseeding. Generation slots are indexed, never aliased.
// ============================================================================

use rand::Rng;

use crate::error::{try_alloc, Result, SimError};
use crate::kernel::{self, Generation, KernelParams};
use crate::viewport::GridSize;

// ======================== Constants ========================

/// Probability that a cell starts with product B present.
pub const SEED_PROBABILITY: f64 = 0.01;

// ======================== World ========================

pub struct World {
    grid: GridSize,

    // Ping-pong slot holding the latest completed generation: 0 or 1
    current: usize,

    // Reagent A (ping-pong)
    a: [Vec<f32>; 2],
    // Product B (ping-pong)
    b: [Vec<f32>; 2],

    /// Completed kernel passes since the last reset.
    pub generation: u64,
}

impl World {
    /// Allocate both species at `grid` size. Fields start fully saturated
    /// with reagent and empty of product; call [`World::reset`] to seed.
    pub fn new(grid: GridSize) -> Result<Self> {
        if grid.width == 0 || grid.height == 0 {
            return Err(SimError::EmptyGrid {
                width: grid.width,
                height: grid.height,
            });
        }
        let n = grid.cells().ok_or(SimError::GridTooLarge {
            width: grid.width,
            height: grid.height,
        })?;

        let a = [
            try_alloc("species A slot 0", n, 1.0f32)?,
            try_alloc("species A slot 1", n, 1.0f32)?,
        ];
        let b = [
            try_alloc("species B slot 0", n, 0.0f32)?,
            try_alloc("species B slot 1", n, 0.0f32)?,
        ];

        Ok(Self {
            grid,
            current: 0,
            a,
            b,
            generation: 0,
        })
    }

    /// Reseed in place: A = 1 everywhere, B = 1 at a sparse random subset.
    /// Returns the number of seeded cells.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let cur = self.current;
        self.a[cur].fill(1.0);

        let mut seeded = 0;
        for cell in self.b[cur].iter_mut() {
            if rng.gen_bool(SEED_PROBABILITY) {
                *cell = 1.0;
                seeded += 1;
            } else {
                *cell = 0.0;
            }
        }
        self.generation = 0;
        seeded
    }

    /// Run one kernel pass from the current slot into the other, then flip.
    pub fn step(&mut self, params: &KernelParams) {
        let width = self.grid.width as usize;
        let height = self.grid.height as usize;
        let cur = self.cur();

        let (src_a, dst_a) = split_slots(&mut self.a, cur);
        let (src_b, dst_b) = split_slots(&mut self.b, cur);
        kernel::step(
            Generation {
                width,
                height,
                a: src_a,
                b: src_b,
            },
            dst_a,
            dst_b,
            params,
        );

        self.swap();
    }

    /// Swap ping-pong slots after a pass
    fn swap(&mut self) {
        self.current = self.next();
        self.generation += 1;
    }

    /// Index of the current (read) slot
    pub fn cur(&self) -> usize {
        self.current
    }

    /// Index of the next (write) slot
    pub fn next(&self) -> usize {
        1 - self.current
    }

    /// Latest committed reagent field.
    pub fn species_a(&self) -> &[f32] {
        &self.a[self.current]
    }

    /// Latest committed product field.
    pub fn species_b(&self) -> &[f32] {
        &self.b[self.current]
    }

    /// Overwrite the committed generation. Lengths must match the grid.
    #[cfg(test)]
    pub fn load(&mut self, a: &[f32], b: &[f32]) {
        let cur = self.current;
        self.a[cur].copy_from_slice(a);
        self.b[cur].copy_from_slice(b);
    }
}

/// Borrow `(source, destination)` from a slot pair given the source index.
fn split_slots(slots: &mut [Vec<f32>; 2], cur: usize) -> (&[f32], &mut [f32]) {
    let [first, second] = slots;
    if cur == 0 {
        (first.as_slice(), second.as_mut_slice())
    } else {
        (second.as_slice(), first.as_mut_slice())
    }
}
