// ============================================================================
// simulation.rs — Gray-Scott
// Step driver: owns parameters, world, palette and frame; serializes
// reset -> pass 1 -> pass 2 -> render once per external tick.
// ============================================================================

use image::RgbaImage;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{ControlParameters, ParamKind, RunConfig};
use crate::error::Result;
use crate::kernel::{self, DT};
use crate::palette::Palette;
use crate::render::FrameRenderer;
use crate::world::World;

/// Kernel passes per displayed frame.
pub const SUB_STEPS_PER_TICK: usize = 2;

pub struct Simulation {
    params: ControlParameters,
    world: World,
    palette: Palette,
    renderer: FrameRenderer,
    rng: StdRng,
    reset_pending: bool,
    ticks: u64,
}

impl Simulation {
    /// Allocate all buffers and seed the initial state. `config.seed` makes
    /// every reset reproducible.
    pub fn new(config: &RunConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Construct with an explicit random source.
    pub fn with_rng(config: &RunConfig, mut rng: StdRng) -> Result<Self> {
        let params = ControlParameters::new(config.grid, &config.initial);
        let mut world = World::new(config.grid)?;
        let renderer = FrameRenderer::new(&params.viewport)?;
        let seeded = world.reset(&mut rng);
        check_stability();

        log::info!(
            "Simulation initialized: {}x{} grid, {} seed cells",
            config.grid.width,
            config.grid.height,
            seeded
        );

        let mut sim = Self {
            params,
            world,
            palette: Palette::new(),
            renderer,
            rng,
            reset_pending: false,
            ticks: 0,
        };
        sim.render();
        Ok(sim)
    }

    // ======================== Inbound Events ========================

    /// Commit a normalized control value and restart from the initial state.
    pub fn on_parameter_changed(&mut self, kind: ParamKind, normalized: f32) {
        self.params.set(kind, normalized);
        log::debug!("{} = {:.4}", kind.name(), self.params.get(kind));
        self.reset_pending = true;
    }

    /// Step a parameter by one keyboard increment; restarts like any change.
    pub fn nudge_parameter(&mut self, kind: ParamKind, direction: f32) {
        let target = self.params.nudged(kind, direction);
        self.on_parameter_changed(kind, target);
    }

    /// Recompute zoom and reallocate the output image.
    pub fn on_viewport_resized(&mut self, width: u32, height: u32) -> Result<()> {
        let grid = self.params.grid;
        self.params.viewport.resize(grid, width, height);
        self.renderer.resize(&self.params.viewport)?;
        log::debug!(
            "Viewport {}x{} (zoom {})",
            width,
            height,
            self.params.viewport.zoom
        );
        self.render();
        Ok(())
    }

    /// Request a reseed at the next tick boundary.
    pub fn on_reset(&mut self) {
        self.reset_pending = true;
    }

    /// Advance one displayed frame.
    pub fn on_tick(&mut self) {
        if self.reset_pending {
            let seeded = self.world.reset(&mut self.rng);
            self.reset_pending = false;
            log::info!("Simulation reset ({} seed cells)", seeded);
        }

        let kernel_params = self.params.snapshot();
        for _ in 0..SUB_STEPS_PER_TICK {
            self.world.step(&kernel_params);
        }
        self.render();
        self.ticks += 1;
    }

    // ======================== Outbound ========================

    pub fn current_frame(&self) -> &RgbaImage {
        self.renderer.frame()
    }

    pub fn params(&self) -> &ControlParameters {
        &self.params
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn render(&mut self) {
        self.renderer.render(
            self.world.species_b(),
            self.params.grid,
            &self.params.viewport,
            &self.palette,
            self.params.scale,
        );
    }
}

/// Warn if the fixed step can diverge anywhere in the diffusion ranges.
fn check_stability() {
    let (_, max_a) = ParamKind::DiffusionA.range();
    let (_, max_b) = ParamKind::DiffusionB.range();
    let number = kernel::stability_number(max_a.max(max_b), DT);
    if number >= 1.0 {
        log::warn!(
            "dt = {} is unstable at the top of the diffusion range (stability number {:.3})",
            DT,
            number
        );
    } else {
        log::debug!("Stability number {:.3} at dt = {}", number, DT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::GridSize;
    use pretty_assertions::assert_eq;

    fn config(seed: u64) -> RunConfig {
        RunConfig {
            grid: GridSize::new(48, 40),
            seed: Some(seed),
            ..RunConfig::default()
        }
    }

    #[test]
    fn ticks_equal_two_manual_passes_each() {
        let cfg = config(1234);
        let mut sim = Simulation::new(&cfg).unwrap();

        let mut world = World::new(cfg.grid).unwrap();
        world.reset(&mut StdRng::seed_from_u64(1234));
        let kernel_params = sim.params().snapshot();

        let n = 7;
        for _ in 0..n {
            sim.on_tick();
        }
        for _ in 0..2 * n {
            world.step(&kernel_params);
        }

        assert_eq!(sim.world().generation, 2 * n as u64);
        assert_eq!(sim.world().species_a(), world.species_a());
        assert_eq!(sim.world().species_b(), world.species_b());
    }

    #[test]
    fn parameter_change_restarts_at_next_tick() {
        let mut sim = Simulation::new(&config(5)).unwrap();
        for _ in 0..10 {
            sim.on_tick();
        }
        assert_eq!(sim.world().generation, 20);

        sim.on_parameter_changed(ParamKind::FeedRate, 0.25);
        // Not applied mid-flight.
        assert_eq!(sim.world().generation, 20);
        assert!((sim.params().as_normalized(ParamKind::FeedRate) - 0.25).abs() < 1e-4);

        sim.on_tick();
        assert_eq!(sim.world().generation, SUB_STEPS_PER_TICK as u64);
    }

    #[test]
    fn reset_request_reseeds_from_rng() {
        let cfg = config(77);
        let mut sim = Simulation::new(&cfg).unwrap();
        sim.on_tick();
        sim.on_reset();
        sim.on_tick();
        assert_eq!(sim.ticks(), 2);
        assert_eq!(sim.world().generation, 2);

        // Same stream: startup seed, then the requested reseed, then one tick.
        let mut rng = StdRng::seed_from_u64(77);
        let mut world = World::new(cfg.grid).unwrap();
        world.reset(&mut rng);
        world.reset(&mut rng);
        let kernel_params = sim.params().snapshot();
        for _ in 0..SUB_STEPS_PER_TICK {
            world.step(&kernel_params);
        }
        assert_eq!(sim.world().species_a(), world.species_a());
        assert_eq!(sim.world().species_b(), world.species_b());
    }

    #[test]
    fn reset_replaces_evolved_field() {
        let mut sim = Simulation::new(&config(8)).unwrap();
        for _ in 0..5 {
            sim.on_tick();
        }
        let before = sim.world().species_b().to_vec();
        sim.on_reset();
        sim.on_tick();
        assert_ne!(sim.world().species_b(), before.as_slice());
    }

    #[test]
    fn nudge_commits_and_restarts() {
        let mut sim = Simulation::new(&config(3)).unwrap();
        let before = sim.params().as_normalized(ParamKind::KillRate);
        sim.nudge_parameter(ParamKind::KillRate, -1.0);
        let after = sim.params().as_normalized(ParamKind::KillRate);
        assert!((before - after - 0.005).abs() < 1e-4);

        sim.on_tick();
        sim.on_tick();
        sim.nudge_parameter(ParamKind::KillRate, 1.0);
        assert!((sim.params().as_normalized(ParamKind::KillRate) - before).abs() < 1e-4);
        assert_eq!(sim.world().generation, 4);
        sim.on_tick();
        assert_eq!(sim.world().generation, 2);
    }

    #[test]
    fn resize_recomputes_zoom_and_frame() {
        let cfg = RunConfig {
            grid: GridSize::new(300, 300),
            seed: Some(0),
            ..RunConfig::default()
        };
        let mut sim = Simulation::new(&cfg).unwrap();
        sim.on_viewport_resized(780, 800).unwrap();

        assert_eq!(sim.params().viewport.zoom, 3);
        assert_eq!(sim.current_frame().dimensions(), (780, 800));
        sim.on_tick();
        assert_eq!(sim.current_frame().dimensions(), (780, 800));
    }

    #[test]
    fn frame_reflects_latest_generation() {
        let mut sim = Simulation::new(&config(21)).unwrap();
        sim.on_tick();
        let grid = sim.params().grid;
        let zoom = sim.params().viewport.zoom;
        let b = sim.world().species_b();

        let palette = Palette::new();
        for (gx, gy) in [(0u32, 0u32), (10, 7), (23, 19)] {
            let value = b[(gy * grid.width + gx) as usize];
            let idx = crate::palette::palette_index(value, sim.params().scale);
            let pixel = sim.current_frame().get_pixel(gx * zoom, gy * zoom).0;
            assert_eq!(pixel, palette.rgba8(idx));
        }
    }
}
