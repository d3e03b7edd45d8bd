#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for placing new enemy agents.
//!
//! Spawns are paced by an interval that shrinks after every spawn down to a
//! floor, capped by the number of agents alive, and placed in the centre pool
//! away from every player.

use std::time::Duration;

use cybermaze_core::{Event, SpawnPool, Vec2};
use cybermaze_world::CellGrid;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Number of draws attempted before accepting a spawn close to a player.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 10;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    initial_interval: Duration,
    minimum_interval: Duration,
    interval_decay: f64,
    max_alive: usize,
    min_separation: f32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration.
    ///
    /// `min_separation` is measured in cells.
    #[must_use]
    pub const fn new(
        initial_interval: Duration,
        minimum_interval: Duration,
        interval_decay: f64,
        max_alive: usize,
        min_separation: f32,
        rng_seed: u64,
    ) -> Self {
        Self {
            initial_interval,
            minimum_interval,
            interval_decay,
            max_alive,
            min_separation,
            rng_seed,
        }
    }

    /// Returns a copy of the configuration drawing from a different seed.
    #[must_use]
    pub const fn with_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = rng_seed;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(9_000),
            Duration::from_millis(800),
            0.99,
            3,
            6.0,
            0x6a09_e667_f3bc_c908,
        )
    }
}

/// Pure system that emits spawn positions as simulated time passes.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    interval: Duration,
    accumulator: Duration,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            interval: config.initial_interval,
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Interval that must elapse before the next spawn.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Consumes events and emits the world-space position of every agent that
    /// should spawn this tick.
    pub fn handle(
        &mut self,
        events: &[Event],
        grid: &CellGrid,
        alive: usize,
        players: &[Vec2],
        out: &mut Vec<Vec2>,
    ) {
        if self.interval.is_zero() {
            return;
        }

        let elapsed = events.iter().fold(Duration::ZERO, |total, event| match event {
            Event::TimeAdvanced { dt } => total.saturating_add(*dt),
            _ => total,
        });
        if elapsed.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(elapsed);
        let mut alive = alive;
        while self.accumulator >= self.interval {
            if alive >= self.config.max_alive {
                self.accumulator = Duration::ZERO;
                break;
            }

            self.accumulator -= self.interval;
            let min_distance = self.config.min_separation * grid.layout().cell_size();
            let position = place_separated(
                grid,
                SpawnPool::Center,
                players,
                min_distance,
                &mut self.rng,
            );
            out.push(position);
            alive += 1;
            self.decay_interval();
            debug!(
                x = position.x,
                y = position.y,
                next_interval_ms = self.interval.as_millis() as u64,
                "agent spawn scheduled"
            );
        }
    }

    fn decay_interval(&mut self) {
        let decayed = Duration::try_from_secs_f64(
            self.interval.as_secs_f64() * self.config.interval_decay,
        )
        .unwrap_or(self.interval);
        self.interval = decayed.max(self.config.minimum_interval);
    }
}

/// Draws a spawn from `pool` that keeps at least `min_distance` from every
/// point in `avoid`.
///
/// After [`MAX_PLACEMENT_ATTEMPTS`] rejected draws the last candidate is
/// returned regardless.
pub fn place_separated<R>(
    grid: &CellGrid,
    pool: SpawnPool,
    avoid: &[Vec2],
    min_distance: f32,
    rng: &mut R,
) -> Vec2
where
    R: Rng + ?Sized,
{
    let mut candidate = grid.pick_spawn(pool, rng);
    for _ in 1..MAX_PLACEMENT_ATTEMPTS {
        if is_separated(candidate, avoid, min_distance) {
            return candidate;
        }
        candidate = grid.pick_spawn(pool, rng);
    }
    candidate
}

fn is_separated(candidate: Vec2, avoid: &[Vec2], min_distance: f32) -> bool {
    avoid
        .iter()
        .all(|point| point.distance(candidate) >= min_distance)
}
