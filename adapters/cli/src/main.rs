#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates Cybermaze levels and exercises them in
//! a headless scripted session.

mod ascii;
mod config;
mod export;
mod session;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cybermaze_core::Surface;
use cybermaze_system_maze_generation::MazeGenerator;
use cybermaze_world::query;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{FileConfig, LevelOverrides},
    export::LevelExport,
    session::Session,
};

/// Command-line arguments accepted by the Cybermaze CLI.
#[derive(Debug, Parser)]
#[command(name = "cybermaze", about = "Generate and exercise Cybermaze levels")]
struct CliArgs {
    /// TOML file providing `[level]` and `[session]` settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed for every random decision; drawn at random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of grid columns.
    #[arg(long)]
    columns: Option<u32>,
    /// Number of grid rows.
    #[arg(long)]
    rows: Option<u32>,
    /// Corridor width in cells.
    #[arg(long)]
    corridor_width: Option<u32>,
    /// Probability that an interior wall decays into a destructible one.
    #[arg(long)]
    wall_weakness: Option<f64>,
    /// Probability that a corridor cell receives destructible debris.
    #[arg(long)]
    debris: Option<f64>,
    /// Surface width the grid is fitted into.
    #[arg(long, default_value_t = 1280.0)]
    width: f32,
    /// Surface height the grid is fitted into.
    #[arg(long, default_value_t = 720.0)]
    height: f32,
    /// Number of session ticks to simulate after generation.
    #[arg(long)]
    ticks: Option<u64>,
    /// Writes the generated level as JSON to this path.
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,
    /// Skips printing the level map.
    #[arg(long)]
    quiet: bool,
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log: String,
}

impl CliArgs {
    fn resolve(&self) -> Result<FileConfig> {
        let mut config = match &self.config {
            Some(path) => config::load(path)?,
            None => FileConfig::default(),
        };

        LevelOverrides {
            columns: self.columns,
            rows: self.rows,
            corridor_width: self.corridor_width,
            wall_weakness_ratio: self.wall_weakness,
            debris_chance: self.debris,
        }
        .apply(&mut config.level);
        if let Some(ticks) = self.ticks {
            config.session.ticks = ticks;
        }

        Ok(config)
    }
}

/// Entry point for the Cybermaze command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log)?;

    let config = args.resolve()?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let generator = MazeGenerator::new(config.level).context("invalid level configuration")?;
    let (grid, stats) = generator
        .generate_with_stats(Surface::new(args.width, args.height), &mut rng)
        .context("level generation failed")?;
    let reachable = query::walkable_field(&grid, cybermaze_system_maze_generation::CARVE_ORIGIN)
        .reachable_count();
    info!(
        seed,
        columns = grid.columns(),
        rows = grid.rows(),
        junctions = stats.junctions,
        decayed_walls = stats.decayed_walls,
        debris = stats.debris,
        reachable,
        "level generated"
    );

    if let Some(path) = &args.export {
        LevelExport::new(seed, config.level, &grid).write(path)?;
        info!(path = %path.display(), "level exported");
    }

    let grid = if config.session.ticks > 0 {
        let (grid, report) = Session::new(grid, config.session, rng).run();
        println!(
            "session: {} ticks, {} agents, {} re-plans, {} walls destroyed, {} shots blocked, caught: {}",
            report.ticks,
            report.agents_spawned,
            report.replans,
            report.walls_destroyed,
            report.impacts_blocked,
            report
                .caught_at
                .map_or_else(|| "no".to_owned(), |tick| format!("tick {tick}")),
        );
        grid
    } else {
        grid
    };

    if !args.quiet {
        print!("{}", ascii::render(&grid));
    }
    println!("seed: {seed}");
    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            EnvFilter::try_new(level).with_context(|| format!("invalid log filter {level:?}"))?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to install log subscriber: {error}"))
}
