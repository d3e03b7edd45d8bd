#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bounded A* search over the Cybermaze cell grid.
//!
//! The search expands cells in the fixed neighbour order up, down, left,
//! right, scores them with the Manhattan heuristic, and gives up once its
//! expansion budget is spent so a single query can never stall a tick. Routes
//! exclude the start cell and end at the target, or at the first walkable
//! neighbour of a blocked target.

use cybermaze_core::{CellCoord, Direction, Vec2};
use cybermaze_world::CellGrid;
use tracing::trace;

/// Number of node expansions a search may perform before giving up.
pub const DEFAULT_EXPANSION_BUDGET: usize = 500;

#[derive(Clone, Copy, Debug)]
struct PathNode {
    cell: CellCoord,
    parent: Option<usize>,
    cost: u32,
    estimate: u32,
}

impl PathNode {
    fn score(&self) -> u32 {
        self.cost.saturating_add(self.estimate)
    }
}

/// Reusable A* search with a bounded expansion budget.
///
/// Scratch buffers are kept between queries; results never depend on
/// previous searches.
#[derive(Clone, Debug)]
pub struct Pathfinder {
    expansion_budget: usize,
    nodes: Vec<PathNode>,
    open: Vec<usize>,
    closed: Vec<bool>,
    node_at: Vec<Option<usize>>,
}

impl Pathfinder {
    /// Creates a pathfinder using [`DEFAULT_EXPANSION_BUDGET`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_expansion_budget(DEFAULT_EXPANSION_BUDGET)
    }

    /// Creates a pathfinder that gives up after `expansion_budget` expansions.
    #[must_use]
    pub fn with_expansion_budget(expansion_budget: usize) -> Self {
        Self {
            expansion_budget,
            nodes: Vec::new(),
            open: Vec::new(),
            closed: Vec::new(),
            node_at: Vec::new(),
        }
    }

    /// Maximum number of expansions performed by a single query.
    #[must_use]
    pub const fn expansion_budget(&self) -> usize {
        self.expansion_budget
    }

    /// Finds a route between two world-space points on `grid`.
    ///
    /// Waypoints are cell centres. An empty route means no route was found,
    /// either endpoint lies outside the grid, or the start already occupies the
    /// destination cell.
    pub fn find_path(&mut self, grid: &CellGrid, start: Vec2, target: Vec2) -> Vec<Vec2> {
        let (Some(start_cell), Some(target_cell)) =
            (grid.world_to_cell(start), grid.world_to_cell(target))
        else {
            trace!(?start, ?target, "route endpoint outside grid");
            return Vec::new();
        };

        self.find_cell_path(grid.columns(), grid.rows(), start_cell, target_cell, |cell| {
            grid.is_blocking(cell)
        })
        .into_iter()
        .map(|cell| grid.cell_to_world_center(cell))
        .collect()
    }

    /// Finds a route between two cells of a `columns` x `rows` grid whose
    /// blocked cells are reported by `is_blocked`.
    ///
    /// The start cell itself is never tested against `is_blocked`. A blocked
    /// target is replaced by its first walkable neighbour in the order up,
    /// down, left, right.
    pub fn find_cell_path<F>(
        &mut self,
        columns: u32,
        rows: u32,
        start: CellCoord,
        target: CellCoord,
        is_blocked: F,
    ) -> Vec<CellCoord>
    where
        F: Fn(CellCoord) -> bool,
    {
        let in_bounds = |cell: CellCoord| cell.column() < columns && cell.row() < rows;
        if !in_bounds(start) || !in_bounds(target) {
            return Vec::new();
        }

        let goal = if is_blocked(target) {
            let substitute = Direction::CARDINAL
                .iter()
                .filter_map(|&direction| target.neighbor(direction, columns, rows))
                .find(|&cell| !is_blocked(cell));
            match substitute {
                Some(cell) => cell,
                None => {
                    trace!(?target, "target enclosed by walls");
                    return Vec::new();
                }
            }
        } else {
            target
        };

        if start == goal {
            return Vec::new();
        }

        let width = usize::try_from(columns).unwrap_or(0);
        if !self.prepare_workspace(columns, rows) {
            return Vec::new();
        }

        self.push_node(width, start, None, 0, start.manhattan_distance(goal));
        let mut expansions = 0;

        while !self.open.is_empty() {
            if expansions >= self.expansion_budget {
                trace!(?start, ?goal, expansions, "expansion budget exhausted");
                return Vec::new();
            }
            expansions += 1;

            let position = self.lowest_score_position();
            let current = self.open.remove(position);
            let node = self.nodes[current];
            if node.cell == goal {
                return self.reconstruct(current);
            }

            if let Some(index) = index(width, node.cell) {
                self.closed[index] = true;
            }

            for direction in Direction::CARDINAL {
                let Some(neighbor) = node.cell.neighbor(direction, columns, rows) else {
                    continue;
                };
                let Some(neighbor_index) = index(width, neighbor) else {
                    continue;
                };
                if self.closed[neighbor_index] || is_blocked(neighbor) {
                    continue;
                }

                let cost = node.cost + 1;
                match self.node_at[neighbor_index] {
                    None => self.push_node(
                        width,
                        neighbor,
                        Some(current),
                        cost,
                        neighbor.manhattan_distance(goal),
                    ),
                    Some(existing) => {
                        let existing = &mut self.nodes[existing];
                        if cost < existing.cost {
                            existing.cost = cost;
                            existing.parent = Some(current);
                        }
                    }
                }
            }
        }

        trace!(?start, ?goal, "no route");
        Vec::new()
    }

    fn prepare_workspace(&mut self, columns: u32, rows: u32) -> bool {
        let node_count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        if node_count == 0 {
            return false;
        }

        self.nodes.clear();
        self.open.clear();
        self.closed.clear();
        self.closed.resize(node_count, false);
        self.node_at.clear();
        self.node_at.resize(node_count, None);
        true
    }

    fn push_node(
        &mut self,
        width: usize,
        cell: CellCoord,
        parent: Option<usize>,
        cost: u32,
        estimate: u32,
    ) {
        let Some(cell_index) = index(width, cell) else {
            return;
        };
        let id = self.nodes.len();
        self.nodes.push(PathNode {
            cell,
            parent,
            cost,
            estimate,
        });
        self.node_at[cell_index] = Some(id);
        self.open.push(id);
    }

    /// Position in the open list of the node with the lowest score; ties go to
    /// the node inserted first.
    fn lowest_score_position(&self) -> usize {
        let mut best = 0;
        for (position, &id) in self.open.iter().enumerate().skip(1) {
            if self.nodes[id].score() < self.nodes[self.open[best]].score() {
                best = position;
            }
        }
        best
    }

    fn reconstruct(&self, goal: usize) -> Vec<CellCoord> {
        let mut route = Vec::new();
        let mut current = goal;
        while let Some(parent) = self.nodes[current].parent {
            route.push(self.nodes[current].cell);
            current = parent;
        }
        route.reverse();
        route
    }
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new()
    }
}

fn index(width: usize, cell: CellCoord) -> Option<usize> {
    let row = usize::try_from(cell.row()).ok()?;
    let column = usize::try_from(cell.column()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
