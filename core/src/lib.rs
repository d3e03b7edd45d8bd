#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cybermaze engine.
//!
//! This crate defines the vocabulary that connects the level generator, the
//! authoritative cell grid, and the pure systems that consume it. Systems read
//! immutable [`CellGridView`] snapshots, submit [`Command`] values describing
//! grid mutations, and react to the [`Event`] values the world broadcasts after
//! applying them.

use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// State of a single cell within the navigable grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Walkable corridor space.
    Open,
    /// Permanent wall that can never be removed.
    Solid,
    /// Wall that blocks movement until an impact destroys it.
    Destructible,
}

impl CellState {
    /// Reports whether the state blocks movement, projectiles, and path search.
    #[must_use]
    pub const fn is_blocking(self) -> bool {
        matches!(self, Self::Solid | Self::Destructible)
    }
}

/// Cardinal directions used for grid neighbourhoods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
    /// Movement toward increasing column indices.
    East,
}

impl Direction {
    /// Fixed neighbour order used by every search: up, down, left, right.
    pub const CARDINAL: [Self; 4] = [Self::North, Self::South, Self::West, Self::East];

    /// Column and row offsets applied by a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::West => (-1, 0),
            Self::East => (1, 0),
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Returns the adjacent cell in `direction` if it lies inside a
    /// `columns` x `rows` grid.
    #[must_use]
    pub fn neighbor(self, direction: Direction, columns: u32, rows: u32) -> Option<CellCoord> {
        let (column_offset, row_offset) = direction.offset();
        let column = i64::from(self.column) + column_offset;
        let row = i64::from(self.row) + row_offset;
        if column < 0 || row < 0 || column >= i64::from(columns) || row >= i64::from(rows) {
            return None;
        }

        Some(CellCoord::new(
            u32::try_from(column).ok()?,
            u32::try_from(row).ok()?,
        ))
    }

    /// Reports whether the cell sits on the outermost ring of the grid.
    #[must_use]
    pub const fn is_border(&self, columns: u32, rows: u32) -> bool {
        self.column == 0
            || self.row == 0
            || self.column.saturating_add(1) >= columns
            || self.row.saturating_add(1) >= rows
    }
}

/// Record mirroring a destructible cell for constant-time impact resolution.
///
/// The `active` flag only ever transitions from `true` to `false`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destructible {
    cell: CellCoord,
    active: bool,
}

impl Destructible {
    /// Creates an active destructible record for the provided cell.
    #[must_use]
    pub const fn new(cell: CellCoord) -> Self {
        Self { cell, active: true }
    }

    /// Cell occupied by the destructible wall.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Whether the wall still stands.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Permanently disables the wall.
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

/// Result of resolving a point impact against the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImpactOutcome {
    /// The point lies in open space and nothing changed.
    Clear,
    /// The point lies outside the grid or inside a permanent wall.
    Blocked,
    /// The point destroyed an active destructible wall.
    Destroyed,
}

/// Spawn pools classified from the generated corridors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnPool {
    /// Open cells farthest from the grid centre, used for players.
    Periphery,
    /// Open cells nearest the grid centre, used for enemies.
    Center,
}

/// Open cell considered during spawn classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnCandidate {
    /// Open cell that may host a spawn.
    pub cell: CellCoord,
    /// Squared Euclidean distance from the grid centre in cell units.
    pub squared_distance: f32,
}

/// Size of the rendering surface the grid is fitted into.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// Surface width in world units.
    pub width: f32,
    /// Surface height in world units.
    pub height: f32,
}

impl Surface {
    /// Creates a new surface description.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Layout constants that map the cell grid onto a surface.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    cell_size: f32,
    margin_left: f32,
    margin_top: f32,
}

impl GridLayout {
    /// Creates a layout from explicit constants.
    #[must_use]
    pub const fn new(cell_size: f32, margin_left: f32, margin_top: f32) -> Self {
        Self {
            cell_size,
            margin_left,
            margin_top,
        }
    }

    /// Fits square cells of a `columns` x `rows` grid into the surface and
    /// centres the result.
    #[must_use]
    pub fn fit(surface: Surface, columns: u32, rows: u32) -> Self {
        let columns = columns.max(1) as f32;
        let rows = rows.max(1) as f32;
        let cell_size = (surface.width / columns).min(surface.height / rows);
        Self {
            cell_size,
            margin_left: (surface.width - cell_size * columns) / 2.0,
            margin_top: (surface.height - cell_size * rows) / 2.0,
        }
    }

    /// Side length of a single square cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Horizontal offset of the grid's left edge.
    #[must_use]
    pub const fn margin_left(&self) -> f32 {
        self.margin_left
    }

    /// Vertical offset of the grid's top edge.
    #[must_use]
    pub const fn margin_top(&self) -> f32 {
        self.margin_top
    }
}

/// Read-only snapshot of the grid handed to presentation layers.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct CellGridView<'a> {
    columns: u32,
    rows: u32,
    layout: GridLayout,
    cells: &'a [CellState],
    destructibles: &'a [Destructible],
}

impl<'a> CellGridView<'a> {
    /// Captures a view backed by the provided row-major cell slice.
    #[must_use]
    pub const fn new(
        columns: u32,
        rows: u32,
        layout: GridLayout,
        cells: &'a [CellState],
        destructibles: &'a [Destructible],
    ) -> Self {
        Self {
            columns,
            rows,
            layout,
            cells,
            destructibles,
        }
    }

    /// Provides the dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Layout constants used to place cells on the surface.
    #[must_use]
    pub const fn layout(&self) -> GridLayout {
        self.layout
    }

    /// State of the provided cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn state(&self, cell: CellCoord) -> Option<CellState> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        self.cells.get(row * width + column).copied()
    }

    /// Row-major cell states.
    #[must_use]
    pub const fn cells(&self) -> &'a [CellState] {
        self.cells
    }

    /// Destructible walls that are still standing.
    pub fn active_destructibles(&self) -> impl Iterator<Item = CellCoord> + 'a {
        self.destructibles
            .iter()
            .filter(|destructible| destructible.is_active())
            .map(Destructible::cell)
    }
}

/// Identifier assigned to an autonomous agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Commands that express every permissible grid mutation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Resolves a single projectile impact at a world-space point.
    ResolveImpact {
        /// World-space point that was struck.
        point: Vec2,
    },
    /// Resolves an area effect, striking every cell whose centre lies in range.
    ResolveBlast {
        /// World-space centre of the blast.
        center: Vec2,
        /// Blast radius in world units.
        radius: f32,
    },
}

/// Events broadcast after grid mutations and system updates.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: std::time::Duration,
    },
    /// Confirms that a destructible wall was removed from the grid.
    WallDestroyed {
        /// Cell that turned into open space.
        cell: CellCoord,
    },
    /// Reports that an impact struck a permanent wall or the world boundary.
    ImpactBlocked {
        /// World-space point of the impact.
        point: Vec2,
    },
    /// Reports that an agent computed a fresh route.
    AgentReplanned {
        /// Agent that re-planned.
        agent: AgentId,
        /// Number of waypoints in the new route; zero means hold position.
        waypoints: usize,
    },
}
