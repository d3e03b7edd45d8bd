//! JSON export of a generated level.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use cybermaze_core::{CellCoord, CellGridView, SpawnPool};
use cybermaze_system_maze_generation::LevelConfig;
use cybermaze_world::{query, CellGrid};
use serde::Serialize;

/// Serializable description of a generated level.
#[derive(Debug, Serialize)]
pub(crate) struct LevelExport<'a> {
    /// Seed the level was generated from.
    pub(crate) seed: u64,
    /// Parameters the level was generated with.
    pub(crate) config: LevelConfig,
    /// Cell states, layout, and destructible walls.
    pub(crate) grid: CellGridView<'a>,
    /// Cells eligible for player spawns.
    pub(crate) periphery: &'a [CellCoord],
    /// Cells eligible for enemy spawns.
    pub(crate) center: &'a [CellCoord],
}

impl<'a> LevelExport<'a> {
    /// Captures the export for `grid`.
    pub(crate) fn new(seed: u64, config: LevelConfig, grid: &'a CellGrid) -> Self {
        Self {
            seed,
            config,
            grid: query::drawable_state(grid),
            periphery: grid.spawn_pools().cells(SpawnPool::Periphery),
            center: grid.spawn_pools().cells(SpawnPool::Center),
        }
    }

    /// Encodes the export as pretty-printed JSON.
    pub(crate) fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to encode level export")
    }

    /// Writes the export to `path`.
    pub(crate) fn write(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path, json)
            .with_context(|| format!("failed to write level export to {}", path.display()))
    }
}
