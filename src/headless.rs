// ============================================================================
// headless.rs — Gray-Scott
// Headless runner: tick the simulation without a window and save the final
// frame as PNG.
// ============================================================================

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;

use crate::config::RunConfig;
use crate::error::Result;
use crate::metrics::FieldDiagnostics;
use crate::simulation::Simulation;

#[derive(Clone, Debug)]
pub struct HeadlessConfig {
    pub ticks: u64,
    pub viewport: Option<(u32, u32)>,
    pub output_path: Option<PathBuf>,
    pub progress_interval: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            ticks: 5_000,
            viewport: None,
            output_path: None,
            progress_interval: 1000,
        }
    }
}

/// Timestamped default output name, e.g. `grayscott_20260101_120000.png`.
pub fn default_output_path() -> PathBuf {
    PathBuf::from(format!(
        "grayscott_{}.png",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

pub fn run_headless(run: &RunConfig, config: &HeadlessConfig) -> Result<PathBuf> {
    let mut sim = Simulation::new(run)?;
    if let Some((width, height)) = config.viewport {
        sim.on_viewport_resized(width, height)?;
    }

    log::info!(
        "Headless run started: {} ticks on {}x{}",
        config.ticks,
        run.grid.width,
        run.grid.height
    );
    sim.params().log_summary();

    let started = Instant::now();
    let mut last_report = Instant::now();
    let mut last_report_tick = 0u64;
    let mut last_diag: Option<FieldDiagnostics> = None;

    for tick in 0..config.ticks {
        sim.on_tick();
        let done = tick + 1;

        if run.diag_interval > 0 && done % run.diag_interval as u64 == 0 {
            let diag = FieldDiagnostics::from_world(sim.world());
            diag.log(done, last_diag.as_ref());
            last_diag = Some(diag);
        }

        if config.progress_interval > 0 && done % config.progress_interval == 0 {
            let total_elapsed = started.elapsed().as_secs_f64().max(1e-6);
            let total_tps = done as f64 / total_elapsed;

            let window_elapsed = last_report.elapsed().as_secs_f64().max(1e-6);
            let window_tps = (done - last_report_tick) as f64 / window_elapsed;

            let remaining = config.ticks.saturating_sub(done);
            let eta_secs = if total_tps > 1e-6 {
                remaining as f64 / total_tps
            } else {
                0.0
            };

            log::info!(
                "Headless progress: {}/{} | ticks/s={:.0} (window {:.0}) | ETA={:.1} s",
                done,
                config.ticks,
                total_tps,
                window_tps,
                eta_secs,
            );

            last_report = Instant::now();
            last_report_tick = done;
        }
    }

    let path = config
        .output_path
        .clone()
        .unwrap_or_else(default_output_path);
    save_frame(&sim, &path)?;
    log::info!(
        "Saved frame after {} ticks ({} generations) to {}",
        sim.ticks(),
        sim.world().generation,
        path.display()
    );
    Ok(path)
}

fn save_frame(sim: &Simulation, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    sim.current_frame().save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::GridSize;

    #[test]
    fn writes_png_of_viewport_size() {
        let dir = std::env::temp_dir().join(format!("grayscott_headless_{}", std::process::id()));
        let out = dir.join("frame.png");
        let run = RunConfig {
            grid: GridSize::new(32, 24),
            seed: Some(8),
            diag_interval: 5,
            ..RunConfig::default()
        };
        let config = HeadlessConfig {
            ticks: 10,
            viewport: Some((70, 50)),
            output_path: Some(out.clone()),
            progress_interval: 4,
        };

        let written = run_headless(&run, &config).unwrap();
        assert_eq!(written, out);

        let img = image::open(&out).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (70, 50));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn default_name_is_png() {
        let path = default_output_path();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
    }
}
