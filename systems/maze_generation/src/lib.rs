#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural level generator for Cybermaze.
//!
//! Generation runs once per level in four passes over a freshly allocated
//! grid: corridor carving with an explicit backtracking stack, wall decay that
//! weakens permanent walls into destructible ones, debris scattering inside
//! corridors, and spawn classification by distance from the grid centre. Every
//! random decision is drawn from the caller's generator so a fixed seed always
//! reproduces the same level.

use cybermaze_core::{CellCoord, CellState, GridLayout, SpawnCandidate, SpawnPool, Surface};
use cybermaze_world::{CellGrid, SpawnPools};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Cell where corridor carving begins.
pub const CARVE_ORIGIN: CellCoord = CellCoord::new(1, 1);

/// Cells with both row and column below this bound never receive debris.
pub const DEBRIS_SAFE_ZONE: u32 = 5;

/// Maximum number of cells kept in the periphery spawn pool.
pub const PERIPHERY_POOL_SIZE: usize = 16;

/// Tunable parameters for a generated level.
///
/// Every key is required when deserializing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelConfig {
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Width of every carved corridor in cells.
    pub corridor_width: u32,
    /// Probability that an interior permanent wall decays into a destructible one.
    pub wall_weakness_ratio: f64,
    /// Probability that an interior corridor cell receives destructible debris.
    pub debris_chance: f64,
}

impl LevelConfig {
    /// Creates a new level configuration.
    #[must_use]
    pub const fn new(
        columns: u32,
        rows: u32,
        corridor_width: u32,
        wall_weakness_ratio: f64,
        debris_chance: f64,
    ) -> Self {
        Self {
            columns,
            rows,
            corridor_width,
            wall_weakness_ratio,
            debris_chance,
        }
    }

    /// Checks every parameter before any generation work begins.
    pub fn validate(&self) -> Result<(), LevelConfigError> {
        if self.corridor_width == 0 {
            return Err(LevelConfigError::ZeroCorridorWidth);
        }

        validate_probability("wall_weakness_ratio", self.wall_weakness_ratio)?;
        validate_probability("debris_chance", self.debris_chance)?;

        let minimum = 3 * u64::from(self.corridor_width) + 2;
        if u64::from(self.columns) < minimum || u64::from(self.rows) < minimum {
            return Err(LevelConfigError::GridTooSmall {
                columns: self.columns,
                rows: self.rows,
                minimum,
            });
        }

        Ok(())
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self::new(41, 23, 2, 0.3, 0.1)
    }
}

fn validate_probability(name: &'static str, value: f64) -> Result<(), LevelConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(LevelConfigError::ProbabilityOutOfRange { name, value })
    }
}

/// Errors raised when a level cannot be generated from the supplied inputs.
#[derive(Debug, Error, PartialEq)]
pub enum LevelConfigError {
    /// Corridors must be at least one cell wide.
    #[error("corridor width must be at least one cell")]
    ZeroCorridorWidth,
    /// A probability parameter fell outside `0.0..=1.0`.
    #[error("{name} must be a finite value between 0 and 1, got {value}")]
    ProbabilityOutOfRange {
        /// Name of the offending parameter.
        name: &'static str,
        /// Value that was supplied.
        value: f64,
    },
    /// The grid cannot fit a border plus a single carved junction.
    #[error("a {columns}x{rows} grid is too small, both dimensions need at least {minimum} cells")]
    GridTooSmall {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
        /// Smallest dimension accepted for the requested corridor width.
        minimum: u64,
    },
    /// The rendering surface has no usable area.
    #[error("surface {width}x{height} must have a finite, positive size")]
    InvalidSurface {
        /// Requested surface width.
        width: f32,
        /// Requested surface height.
        height: f32,
    },
}

/// Counters describing a completed generation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Number of coarse junctions reached by the carver.
    pub junctions: usize,
    /// Permanent walls that decayed into destructible walls.
    pub decayed_walls: usize,
    /// Corridor cells that received debris.
    pub debris: usize,
}

/// Validated generator that builds playable grids.
#[derive(Clone, Copy, Debug)]
pub struct MazeGenerator {
    config: LevelConfig,
}

impl MazeGenerator {
    /// Creates a generator after validating `config`.
    pub fn new(config: LevelConfig) -> Result<Self, LevelConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration the generator was built with.
    #[must_use]
    pub const fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// Generates a new level fitted to `surface`.
    pub fn generate<R>(&self, surface: Surface, rng: &mut R) -> Result<CellGrid, LevelConfigError>
    where
        R: Rng + ?Sized,
    {
        self.generate_with_stats(surface, rng).map(|(grid, _)| grid)
    }

    /// Generates a new level and reports what each pass produced.
    pub fn generate_with_stats<R>(
        &self,
        surface: Surface,
        rng: &mut R,
    ) -> Result<(CellGrid, GenerationStats), LevelConfigError>
    where
        R: Rng + ?Sized,
    {
        if !(surface.width.is_finite() && surface.height.is_finite())
            || surface.width <= 0.0
            || surface.height <= 0.0
        {
            return Err(LevelConfigError::InvalidSurface {
                width: surface.width,
                height: surface.height,
            });
        }

        let config = &self.config;
        let mut carver = Carver::new(config.columns, config.rows, config.corridor_width);
        let stats = GenerationStats {
            junctions: carver.carve_corridors(rng),
            decayed_walls: carver.decay_walls(config.wall_weakness_ratio, rng),
            debris: carver.scatter_debris(config.debris_chance, rng),
        };
        debug!(
            junctions = stats.junctions,
            decayed_walls = stats.decayed_walls,
            debris = stats.debris,
            "generation passes complete"
        );

        let candidates = spawn_candidates(config.columns, config.rows, &carver.cells);
        let pools = classify_spawns(candidates);
        debug!(
            periphery = pools.cells(SpawnPool::Periphery).len(),
            center = pools.cells(SpawnPool::Center).len(),
            "spawn pools classified"
        );

        let layout = GridLayout::fit(surface, config.columns, config.rows);
        let grid = CellGrid::from_cells(config.columns, config.rows, layout, carver.cells)
            .with_spawn_pools(pools);
        Ok((grid, stats))
    }
}

/// Validates `config` and generates a level fitted to `surface`.
pub fn generate_level<R>(
    config: LevelConfig,
    surface: Surface,
    rng: &mut R,
) -> Result<CellGrid, LevelConfigError>
where
    R: Rng + ?Sized,
{
    MazeGenerator::new(config)?.generate(surface, rng)
}

/// Lists every open cell with its squared distance from the grid centre.
#[must_use]
pub fn spawn_candidates(columns: u32, rows: u32, cells: &[CellState]) -> Vec<SpawnCandidate> {
    let center_column = columns as f32 / 2.0;
    let center_row = rows as f32 / 2.0;
    let width = usize::try_from(columns).unwrap_or(0);

    cells
        .iter()
        .enumerate()
        .filter(|(_, state)| **state == CellState::Open)
        .filter_map(|(index, _)| {
            let column = u32::try_from(index % width).ok()?;
            let row = u32::try_from(index / width).ok()?;
            let dx = column as f32 - center_column;
            let dy = row as f32 - center_row;
            Some(SpawnCandidate {
                cell: CellCoord::new(column, row),
                squared_distance: dx * dx + dy * dy,
            })
        })
        .collect()
}

/// Splits candidates into the periphery pool (the farthest cells, capped at
/// [`PERIPHERY_POOL_SIZE`]) and the centre pool (the nearest half).
#[must_use]
pub fn classify_spawns(mut candidates: Vec<SpawnCandidate>) -> SpawnPools {
    candidates.sort_by(|a, b| b.squared_distance.total_cmp(&a.squared_distance));
    let periphery = candidates
        .iter()
        .take(PERIPHERY_POOL_SIZE)
        .map(|candidate| candidate.cell)
        .collect();

    let center_len = candidates.len() / 2;
    let center = candidates
        .iter()
        .rev()
        .take(center_len)
        .map(|candidate| candidate.cell)
        .collect();

    SpawnPools::new(periphery, center)
}

struct Carver {
    columns: u32,
    rows: u32,
    corridor_width: u32,
    cells: Vec<CellState>,
}

impl Carver {
    fn new(columns: u32, rows: u32, corridor_width: u32) -> Self {
        let count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            corridor_width,
            cells: vec![CellState::Solid; count],
        }
    }

    /// Carves corridors with a randomized depth-first walk over coarse
    /// junctions spaced `2 * corridor_width` apart.
    fn carve_corridors<R>(&mut self, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        let width = i64::from(self.corridor_width);
        let step = 2 * width;
        let mut directions = [(0_i64, -1_i64), (0, 1), (-1, 0), (1, 0)];
        let origin = (
            i64::from(CARVE_ORIGIN.column()),
            i64::from(CARVE_ORIGIN.row()),
        );

        self.open_block(origin.0, origin.1);
        let mut junctions = 1;
        let mut stack = vec![origin];

        while let Some(&(column, row)) = stack.last() {
            directions.shuffle(rng);
            let next = directions.iter().copied().find(|&(dx, dy)| {
                self.is_carvable(column + dx * step, row + dy * step)
            });

            let Some((dx, dy)) = next else {
                let _ = stack.pop();
                continue;
            };

            self.open_block(column + dx * width, row + dy * width);
            let junction = (column + dx * step, row + dy * step);
            self.open_block(junction.0, junction.1);
            stack.push(junction);
            junctions += 1;
        }

        junctions
    }

    /// Weakens interior permanent walls into destructible walls.
    fn decay_walls<R>(&mut self, ratio: f64, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        self.convert_interior(CellState::Solid, rng, |_, _| ratio)
    }

    /// Drops destructible debris into interior corridor cells outside the
    /// top-left safe zone.
    fn scatter_debris<R>(&mut self, chance: f64, rng: &mut R) -> usize
    where
        R: Rng + ?Sized,
    {
        self.convert_interior(CellState::Open, rng, |column, row| {
            if column < DEBRIS_SAFE_ZONE && row < DEBRIS_SAFE_ZONE {
                0.0
            } else {
                chance
            }
        })
    }

    fn convert_interior<R, P>(&mut self, from: CellState, rng: &mut R, probability: P) -> usize
    where
        R: Rng + ?Sized,
        P: Fn(u32, u32) -> f64,
    {
        let mut converted = 0;
        for row in 1..self.rows.saturating_sub(1) {
            for column in 1..self.columns.saturating_sub(1) {
                let Some(index) = self.index(i64::from(column), i64::from(row)) else {
                    continue;
                };
                if self.cells[index] != from {
                    continue;
                }

                let chance = probability(column, row);
                if chance > 0.0 && rng.gen_bool(chance) {
                    self.cells[index] = CellState::Destructible;
                    converted += 1;
                }
            }
        }
        converted
    }

    /// A junction is carvable when its whole block lies inside the border and
    /// is still solid.
    fn is_carvable(&self, column: i64, row: i64) -> bool {
        let width = i64::from(self.corridor_width);
        if column < 1
            || row < 1
            || column >= i64::from(self.columns) - width
            || row >= i64::from(self.rows) - width
        {
            return false;
        }

        (0..width).all(|dy| {
            (0..width).all(|dx| {
                self.index(column + dx, row + dy)
                    .map_or(false, |index| self.cells[index] == CellState::Solid)
            })
        })
    }

    fn open_block(&mut self, column: i64, row: i64) {
        let width = i64::from(self.corridor_width);
        for dy in 0..width {
            for dx in 0..width {
                if let Some(index) = self.index(column + dx, row + dy) {
                    self.cells[index] = CellState::Open;
                }
            }
        }
    }

    fn index(&self, column: i64, row: i64) -> Option<usize> {
        if column < 0 || row < 0 || column >= i64::from(self.columns) || row >= i64::from(self.rows)
        {
            return None;
        }
        usize::try_from(row * i64::from(self.columns) + column).ok()
    }
}
