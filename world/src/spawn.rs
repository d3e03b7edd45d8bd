//! Spawn pool storage attached to a generated grid.

use cybermaze_core::{CellCoord, SpawnPool};

/// Candidate cells grouped by spawn pool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpawnPools {
    periphery: Vec<CellCoord>,
    center: Vec<CellCoord>,
}

impl SpawnPools {
    /// Creates spawn pools from pre-classified candidate cells.
    #[must_use]
    pub fn new(periphery: Vec<CellCoord>, center: Vec<CellCoord>) -> Self {
        Self { periphery, center }
    }

    /// Candidate cells belonging to `pool`.
    #[must_use]
    pub fn cells(&self, pool: SpawnPool) -> &[CellCoord] {
        match pool {
            SpawnPool::Periphery => &self.periphery,
            SpawnPool::Center => &self.center,
        }
    }

    /// Cell used when `pool` holds no candidates.
    #[must_use]
    pub(crate) fn fallback(pool: SpawnPool, columns: u32, rows: u32) -> CellCoord {
        match pool {
            SpawnPool::Periphery => CellCoord::new(1, 1),
            SpawnPool::Center => CellCoord::new(columns / 2, rows / 2),
        }
    }
}
