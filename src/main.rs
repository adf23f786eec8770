// ============================================================================
// main.rs — Gray-Scott
// Entry point. Parses the command line, initializes logging, and runs either
// the windowed viewer or the headless runner.
// ============================================================================

mod app;
mod config;
mod error;
mod headless;
mod input;
mod kernel;
mod metrics;
mod palette;
mod pipeline;
mod render;
mod simulation;
mod viewport;
mod world;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use winit::event_loop::EventLoop;

use app::App;
use config::RunConfig;
use error::{Result, SimError};
use headless::{run_headless, HeadlessConfig};
use viewport::GridSize;

/// Gray-Scott reaction-diffusion simulator
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// JSON run configuration; missing fields use defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for reproducible resets
    #[arg(short, long)]
    seed: Option<u64>,

    /// Grid size as WIDTHxHEIGHT
    #[arg(short, long, value_parser = parse_grid)]
    grid: Option<GridSize>,

    /// Run without a window and write the final frame as PNG
    #[arg(long)]
    headless: bool,

    /// Ticks to run in headless mode
    #[arg(long, default_value_t = 5_000)]
    ticks: u64,

    /// Headless output image size as WIDTHxHEIGHT (defaults to the grid size)
    #[arg(long, value_parser = parse_grid)]
    viewport: Option<GridSize>,

    /// Headless output path (defaults to a timestamped name)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn parse_grid(text: &str) -> std::result::Result<GridSize, String> {
    let (w, h) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{text}'"))?;
    let width: u32 = w.trim().parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let height: u32 = h.trim().parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    if width == 0 || height == 0 {
        return Err(String::from("dimensions must be non-zero"));
    }
    Ok(GridSize::new(width, height))
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(grid) = cli.grid {
        config.grid = grid;
    }

    if cli.print_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    if cli.headless {
        let headless = HeadlessConfig {
            ticks: cli.ticks,
            viewport: cli.viewport.map(|v| (v.width, v.height)),
            output_path: cli.out,
            ..HeadlessConfig::default()
        };
        run_headless(&config, &headless)?;
        return Ok(());
    }

    let event_loop = EventLoop::new().map_err(|e| SimError::Gpu(format!("event loop: {e}")))?;
    let mut app = App::new(config)?;
    event_loop
        .run_app(&mut app)
        .map_err(|e| SimError::Gpu(format!("event loop: {e}")))?;

    match app.take_failure() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_argument_parses() {
        assert_eq!(parse_grid("300x200").unwrap(), GridSize::new(300, 200));
        assert_eq!(parse_grid("64X64").unwrap(), GridSize::new(64, 64));
        assert!(parse_grid("300").is_err());
        assert!(parse_grid("0x10").is_err());
        assert!(parse_grid("ax10").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_overrides_seed_and_grid() {
        let cli = Cli::parse_from(["grayscott", "--seed", "9", "--grid", "40x30", "--headless"]);
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.grid, Some(GridSize::new(40, 30)));
        assert!(cli.headless);
        assert_eq!(cli.ticks, 5_000);
    }
}
