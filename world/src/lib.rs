#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative cell grid for Cybermaze.
//!
//! The [`CellGrid`] owns every cell state, the destructible wall records, the
//! layout constants that map cells onto the rendering surface, and the spawn
//! pools classified at generation time. Collision and path queries borrow it
//! immutably; only impact resolution mutates it, and every mutation is visible
//! to the next query issued in the same tick.

mod navigation;
mod spawn;

use cybermaze_core::{
    CellCoord, CellGridView, CellState, Command, Destructible, Event, GridLayout, ImpactOutcome,
    SpawnPool, Vec2,
};
use rand::{seq::SliceRandom, Rng};
use tracing::debug;

pub use navigation::DistanceField;
pub use spawn::SpawnPools;

/// Two-dimensional map of cell states plus the records needed to resolve
/// impacts in constant time.
#[derive(Clone, Debug)]
pub struct CellGrid {
    columns: u32,
    rows: u32,
    layout: GridLayout,
    cells: Vec<CellState>,
    destructibles: Vec<Destructible>,
    destructible_slots: Vec<Option<usize>>,
    spawn_pools: SpawnPools,
}

impl CellGrid {
    /// Builds a grid from row-major cell states.
    ///
    /// Missing trailing cells are filled with [`CellState::Solid`] and surplus
    /// cells are dropped. A destructible record is created for every
    /// [`CellState::Destructible`] cell in row-major order.
    #[must_use]
    pub fn from_cells(
        columns: u32,
        rows: u32,
        layout: GridLayout,
        mut cells: Vec<CellState>,
    ) -> Self {
        let cell_count = cell_count(columns, rows);
        cells.resize(cell_count, CellState::Solid);

        let mut destructibles = Vec::new();
        let mut destructible_slots = vec![None; cell_count];
        let width = usize::try_from(columns).unwrap_or(0);

        for (index, state) in cells.iter().enumerate() {
            if *state != CellState::Destructible {
                continue;
            }

            let (Ok(column), Ok(row)) = (u32::try_from(index % width), u32::try_from(index / width))
            else {
                continue;
            };
            destructible_slots[index] = Some(destructibles.len());
            destructibles.push(Destructible::new(CellCoord::new(column, row)));
        }

        Self {
            columns,
            rows,
            layout,
            cells,
            destructibles,
            destructible_slots,
            spawn_pools: SpawnPools::default(),
        }
    }

    /// Attaches classified spawn pools to the grid.
    #[must_use]
    pub fn with_spawn_pools(mut self, spawn_pools: SpawnPools) -> Self {
        self.spawn_pools = spawn_pools;
        self
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Layout constants mapping cells onto the surface.
    #[must_use]
    pub const fn layout(&self) -> GridLayout {
        self.layout
    }

    /// Spawn pools classified when the grid was generated.
    #[must_use]
    pub const fn spawn_pools(&self) -> &SpawnPools {
        &self.spawn_pools
    }

    /// Every destructible record, active or not, in creation order.
    #[must_use]
    pub fn destructibles(&self) -> &[Destructible] {
        &self.destructibles
    }

    /// State of `cell`, or `None` when it lies outside the grid.
    #[must_use]
    pub fn state(&self, cell: CellCoord) -> Option<CellState> {
        self.index(cell).map(|index| self.cells[index])
    }

    /// Converts a world-space point into the cell containing it.
    ///
    /// Returns `None` for points outside the grid; those points are treated as
    /// blocking by every query.
    #[must_use]
    pub fn world_to_cell(&self, point: Vec2) -> Option<CellCoord> {
        let (column, row) = self.locate(point);
        let _ = self.signed_index(column, row)?;
        Some(CellCoord::new(
            u32::try_from(column).ok()?,
            u32::try_from(row).ok()?,
        ))
    }

    /// World-space centre of `cell`.
    #[must_use]
    pub fn cell_to_world_center(&self, cell: CellCoord) -> Vec2 {
        let size = self.layout.cell_size();
        Vec2::new(
            self.layout.margin_left() + (cell.column() as f32 + 0.5) * size,
            self.layout.margin_top() + (cell.row() as f32 + 0.5) * size,
        )
    }

    /// Reports whether `cell` blocks movement, projectiles, and path search.
    ///
    /// Cells outside the grid always block.
    #[must_use]
    pub fn is_blocking(&self, cell: CellCoord) -> bool {
        self.state(cell).map_or(true, CellState::is_blocking)
    }

    /// Tests a circle against every blocking cell its bounding box overlaps.
    ///
    /// The overlap test compares the circle's bounding box with each cell's
    /// square footprint rather than computing true circle distance. Cells
    /// outside the grid count as blocking, and touching an edge is not an
    /// overlap.
    #[must_use]
    pub fn check_circle_collision(&self, center: Vec2, radius: f32) -> bool {
        let size = self.layout.cell_size();
        let local = self.local(center);
        let (min_column, max_column) = cell_span(local.x, radius, size);
        let (min_row, max_row) = cell_span(local.y, radius, size);

        for row in min_row..=max_row {
            for column in min_column..=max_column {
                let blocking = self
                    .signed_index(column, row)
                    .map_or(true, |index| self.cells[index].is_blocking());
                if !blocking {
                    continue;
                }

                let left = column as f32 * size;
                let top = row as f32 * size;
                if local.x + radius > left
                    && local.x - radius < left + size
                    && local.y + radius > top
                    && local.y - radius < top + size
                {
                    return true;
                }
            }
        }

        false
    }

    /// Moves a circle by `delta`, resolving each axis independently so that
    /// motion along a wall survives when the perpendicular component is
    /// rejected.
    #[must_use]
    pub fn slide_circle(&self, position: Vec2, delta: Vec2, radius: f32) -> Vec2 {
        let mut resolved = position;

        let horizontal = Vec2::new(position.x + delta.x, position.y);
        if delta.x != 0.0 && !self.check_circle_collision(horizontal, radius) {
            resolved.x = horizontal.x;
        }

        let vertical = Vec2::new(resolved.x, position.y + delta.y);
        if delta.y != 0.0 && !self.check_circle_collision(vertical, radius) {
            resolved.y = vertical.y;
        }

        resolved
    }

    /// Resolves a projectile impact at `point`.
    ///
    /// An active destructible wall is destroyed and its cell becomes open; a
    /// second impact on the same cell reports [`ImpactOutcome::Clear`].
    pub fn resolve_point_impact(&mut self, point: Vec2) -> ImpactOutcome {
        let (column, row) = self.locate(point);
        let Some(index) = self.signed_index(column, row) else {
            return ImpactOutcome::Blocked;
        };

        match self.cells[index] {
            CellState::Open => ImpactOutcome::Clear,
            CellState::Solid => ImpactOutcome::Blocked,
            CellState::Destructible => {
                self.cells[index] = CellState::Open;
                if let Some(slot) = self.destructible_slots[index] {
                    self.destructibles[slot].deactivate();
                }
                ImpactOutcome::Destroyed
            }
        }
    }

    /// Strikes every destructible cell whose centre lies within `radius` of
    /// `center` and returns the cells that were destroyed.
    pub fn resolve_area_impact(&mut self, center: Vec2, radius: f32) -> Vec<CellCoord> {
        let mut destroyed = Vec::new();
        if radius.is_nan() || radius < 0.0 {
            return destroyed;
        }

        let size = self.layout.cell_size();
        let local = self.local(center);
        let (min_column, max_column) = cell_span(local.x, radius, size);
        let (min_row, max_row) = cell_span(local.y, radius, size);
        let min_column = min_column.max(0);
        let min_row = min_row.max(0);
        let max_column = max_column.min(i64::from(self.columns) - 1);
        let max_row = max_row.min(i64::from(self.rows) - 1);

        for row in min_row..=max_row {
            for column in min_column..=max_column {
                let (Ok(column), Ok(row)) = (u32::try_from(column), u32::try_from(row)) else {
                    continue;
                };
                let cell = CellCoord::new(column, row);
                if self.state(cell) != Some(CellState::Destructible) {
                    continue;
                }

                let cell_center = self.cell_to_world_center(cell);
                if cell_center.distance(center) > radius {
                    continue;
                }

                if self.resolve_point_impact(cell_center) == ImpactOutcome::Destroyed {
                    destroyed.push(cell);
                }
            }
        }

        destroyed
    }

    /// Draws a world-space spawn position from `pool`.
    ///
    /// An empty pool falls back to a fixed cell: `(1, 1)` for the periphery and
    /// the grid centre for the centre pool.
    pub fn pick_spawn<R>(&self, pool: SpawnPool, rng: &mut R) -> Vec2
    where
        R: Rng + ?Sized,
    {
        self.cell_to_world_center(self.pick_spawn_cell(pool, rng))
    }

    /// Draws a spawn cell from `pool`, applying the same fallback as
    /// [`CellGrid::pick_spawn`].
    pub fn pick_spawn_cell<R>(&self, pool: SpawnPool, rng: &mut R) -> CellCoord
    where
        R: Rng + ?Sized,
    {
        if let Some(cell) = self.spawn_pools.cells(pool).choose(rng) {
            return *cell;
        }

        let fallback = SpawnPools::fallback(pool, self.columns, self.rows);
        debug!(?pool, ?fallback, "spawn pool empty, using fallback cell");
        fallback
    }

    /// Captures a read-only snapshot for presentation layers.
    #[must_use]
    pub fn view(&self) -> CellGridView<'_> {
        CellGridView::new(
            self.columns,
            self.rows,
            self.layout,
            &self.cells,
            &self.destructibles,
        )
    }

    fn local(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x - self.layout.margin_left(),
            point.y - self.layout.margin_top(),
        )
    }

    fn locate(&self, point: Vec2) -> (i64, i64) {
        let size = self.layout.cell_size();
        let local = self.local(point);
        (
            (local.x / size).floor() as i64,
            (local.y / size).floor() as i64,
        )
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        self.signed_index(i64::from(cell.column()), i64::from(cell.row()))
    }

    fn signed_index(&self, column: i64, row: i64) -> Option<usize> {
        if column < 0 || row < 0 || column >= i64::from(self.columns) || row >= i64::from(self.rows)
        {
            return None;
        }

        let width = usize::try_from(self.columns).ok()?;
        let row = usize::try_from(row).ok()?;
        let column = usize::try_from(column).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

fn cell_count(columns: u32, rows: u32) -> usize {
    let columns = usize::try_from(columns).unwrap_or(0);
    let rows = usize::try_from(rows).unwrap_or(0);
    columns.checked_mul(rows).unwrap_or(0)
}

fn cell_span(local: f32, radius: f32, size: f32) -> (i64, i64) {
    (
        ((local - radius) / size).floor() as i64,
        ((local + radius) / size).floor() as i64,
    )
}

/// Resolves a single impact and broadcasts its consequence.
pub fn resolve_impact(
    grid: &mut CellGrid,
    point: Vec2,
    out_events: &mut Vec<Event>,
) -> ImpactOutcome {
    let cell = grid.world_to_cell(point);
    let outcome = grid.resolve_point_impact(point);

    match (outcome, cell) {
        (ImpactOutcome::Destroyed, Some(cell)) => {
            debug!(column = cell.column(), row = cell.row(), "destructible wall destroyed");
            out_events.push(Event::WallDestroyed { cell });
        }
        (ImpactOutcome::Blocked, _) => out_events.push(Event::ImpactBlocked { point }),
        _ => {}
    }

    outcome
}

/// Applies the provided command to the grid, mutating state deterministically.
pub fn apply(grid: &mut CellGrid, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ResolveImpact { point } => {
            let _ = resolve_impact(grid, point, out_events);
        }
        Command::ResolveBlast { center, radius } => {
            let destroyed = grid.resolve_area_impact(center, radius);
            debug!(count = destroyed.len(), "blast resolved");
            out_events.extend(
                destroyed
                    .into_iter()
                    .map(|cell| Event::WallDestroyed { cell }),
            );
        }
    }
}

/// Query functions that provide read-only access to the grid state.
pub mod query {
    use super::{CellGrid, DistanceField};
    use cybermaze_core::{CellCoord, CellGridView, CellState};

    /// Captures the snapshot handed to presentation layers.
    #[must_use]
    pub fn drawable_state(grid: &CellGrid) -> CellGridView<'_> {
        grid.view()
    }

    /// Destructible walls that are still standing.
    #[must_use]
    pub fn active_destructibles(grid: &CellGrid) -> Vec<CellCoord> {
        grid.view().active_destructibles().collect()
    }

    /// Every cell currently in `state`, in row-major order.
    #[must_use]
    pub fn cells_in_state(grid: &CellGrid, state: CellState) -> Vec<CellCoord> {
        let mut cells = Vec::new();
        for row in 0..grid.rows() {
            for column in 0..grid.columns() {
                let cell = CellCoord::new(column, row);
                if grid.state(cell) == Some(state) {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    /// Floods the walkable corridors outward from `origin`.
    #[must_use]
    pub fn walkable_field(grid: &CellGrid, origin: CellCoord) -> DistanceField {
        DistanceField::flood(grid.columns(), grid.rows(), origin, |cell| {
            grid.is_blocking(cell)
        })
    }
}
