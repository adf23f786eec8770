// ============================================================================
// config.rs — Gray-Scott
// Control parameters (range-mapped, clamped), the kernel snapshot they
// produce, and the JSON run configuration.
// ============================================================================

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::kernel::{KernelParams, DT};
use crate::viewport::{GridSize, Viewport};

/// Normalized step applied by a single keyboard nudge.
pub const NUDGE_STEP: f32 = 0.005;

// ======================== Parameter Kinds ========================

/// The user-adjustable simulation and display parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamKind {
    FeedRate,
    KillRate,
    DiffusionA,
    DiffusionB,
    Scale,
}

impl ParamKind {
    pub const ALL: [ParamKind; 5] = [
        ParamKind::FeedRate,
        ParamKind::KillRate,
        ParamKind::DiffusionA,
        ParamKind::DiffusionB,
        ParamKind::Scale,
    ];

    /// Inclusive `(min, max)` range of the physical value.
    pub fn range(self) -> (f32, f32) {
        match self {
            ParamKind::FeedRate => (0.02, 0.05),
            ParamKind::KillRate => (0.04, 0.08),
            ParamKind::DiffusionA => (0.8, 1.3),
            ParamKind::DiffusionB => (0.2, 0.6),
            ParamKind::Scale => (0.5, 1.5),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ParamKind::FeedRate => "feed rate",
            ParamKind::KillRate => "kill rate",
            ParamKind::DiffusionA => "diffusion A",
            ParamKind::DiffusionB => "diffusion B",
            ParamKind::Scale => "scale",
        }
    }

    /// Linear remap of a normalized value into the range, clamped.
    pub fn denormalize(self, normalized: f32) -> f32 {
        let (min, max) = self.range();
        (min + (max - min) * normalized).clamp(min, max)
    }

    pub fn normalize(self, value: f32) -> f32 {
        let (min, max) = self.range();
        (value - min) / (max - min)
    }
}

// ======================== Control Parameters ========================

/// Live parameter set shared between the presentation layer and the step
/// driver. Writes happen between ticks; the kernel only ever sees a
/// [`KernelParams`] copy.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlParameters {
    pub feed_rate: f32,
    pub kill_rate: f32,
    pub diffusion_a: f32,
    pub diffusion_b: f32,
    pub scale: f32,
    pub grid: GridSize,
    pub viewport: Viewport,
}

impl ControlParameters {
    pub fn new(grid: GridSize, initial: &InitialParams) -> Self {
        let mut params = Self {
            feed_rate: 0.0,
            kill_rate: 0.0,
            diffusion_a: 0.0,
            diffusion_b: 0.0,
            scale: 0.0,
            grid,
            viewport: Viewport::for_grid(grid),
        };
        params.assign(ParamKind::FeedRate, initial.feed_rate);
        params.assign(ParamKind::KillRate, initial.kill_rate);
        params.assign(ParamKind::DiffusionA, initial.diffusion_a);
        params.assign(ParamKind::DiffusionB, initial.diffusion_b);
        params.assign(ParamKind::Scale, initial.scale);
        params
    }

    /// Commit a normalized control value (remapped and clamped).
    pub fn set(&mut self, kind: ParamKind, normalized: f32) {
        *self.slot_mut(kind) = kind.denormalize(normalized);
    }

    /// Commit a physical value, clamped into the parameter's range.
    pub fn assign(&mut self, kind: ParamKind, value: f32) {
        let (min, max) = kind.range();
        *self.slot_mut(kind) = value.clamp(min, max);
    }

    pub fn get(&self, kind: ParamKind) -> f32 {
        match kind {
            ParamKind::FeedRate => self.feed_rate,
            ParamKind::KillRate => self.kill_rate,
            ParamKind::DiffusionA => self.diffusion_a,
            ParamKind::DiffusionB => self.diffusion_b,
            ParamKind::Scale => self.scale,
        }
    }

    /// Current value mapped back to [0, 1] for external controls.
    pub fn as_normalized(&self, kind: ParamKind) -> f32 {
        kind.normalize(self.get(kind))
    }

    /// Normalized value one step away in `direction` (sign only), saturated
    /// to [0, 1]. Commit it like any other control value.
    pub fn nudged(&self, kind: ParamKind, direction: f32) -> f32 {
        (self.as_normalized(kind) + direction.signum() * NUDGE_STEP).clamp(0.0, 1.0)
    }

    pub fn log_summary(&self) {
        for kind in ParamKind::ALL {
            log::info!(
                "  {:<12} {:.4} ({:.3} normalized)",
                kind.name(),
                self.get(kind),
                self.as_normalized(kind)
            );
        }
    }

    /// Immutable copy handed to the kernel for one tick.
    pub fn snapshot(&self) -> KernelParams {
        KernelParams {
            feed_rate: self.feed_rate,
            kill_rate: self.kill_rate,
            diffusion_a: self.diffusion_a,
            diffusion_b: self.diffusion_b,
            dt: DT,
        }
    }

    fn slot_mut(&mut self, kind: ParamKind) -> &mut f32 {
        match kind {
            ParamKind::FeedRate => &mut self.feed_rate,
            ParamKind::KillRate => &mut self.kill_rate,
            ParamKind::DiffusionA => &mut self.diffusion_a,
            ParamKind::DiffusionB => &mut self.diffusion_b,
            ParamKind::Scale => &mut self.scale,
        }
    }
}

// ======================== Run Configuration ========================

/// Raw starting values, clamped into range when applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialParams {
    pub feed_rate: f32,
    pub kill_rate: f32,
    pub diffusion_a: f32,
    pub diffusion_b: f32,
    pub scale: f32,
}

impl Default for InitialParams {
    fn default() -> Self {
        Self {
            feed_rate: 0.039,
            kill_rate: 0.069,
            diffusion_a: 1.1,
            diffusion_b: 0.4,
            scale: 1.0,
        }
    }
}

/// Startup configuration, loadable from JSON. Missing fields take defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub grid: GridSize,
    pub tick_interval_ms: u64,
    pub seed: Option<u64>,
    pub initial: InitialParams,
    pub min_window: [u32; 2],
    /// Ticks between logged field diagnostics.
    pub diag_interval: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            grid: GridSize::new(300, 300),
            tick_interval_ms: 10,
            seed: None,
            initial: InitialParams::default(),
            min_window: [780, 800],
            diag_interval: 500,
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
