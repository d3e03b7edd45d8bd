//! TOML configuration file support for the command-line adapter.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use cybermaze_system_maze_generation::LevelConfig;
use serde::Deserialize;

/// Settings resolved from a configuration file on top of the defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct FileConfig {
    /// Level generation parameters.
    pub(crate) level: LevelConfig,
    /// Scripted session parameters.
    pub(crate) session: SessionSettings,
}

/// Raw contents of a configuration file. Every section and key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSections {
    level: LevelOverrides,
    session: SessionSettings,
}

/// Level keys present in a configuration file or on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LevelOverrides {
    /// Number of grid columns.
    pub(crate) columns: Option<u32>,
    /// Number of grid rows.
    pub(crate) rows: Option<u32>,
    /// Corridor width in cells.
    pub(crate) corridor_width: Option<u32>,
    /// Wall decay probability.
    pub(crate) wall_weakness_ratio: Option<f64>,
    /// Debris probability.
    pub(crate) debris_chance: Option<f64>,
}

impl LevelOverrides {
    /// Replaces every parameter of `level` that this set provides.
    pub(crate) fn apply(self, level: &mut LevelConfig) {
        if let Some(columns) = self.columns {
            level.columns = columns;
        }
        if let Some(rows) = self.rows {
            level.rows = rows;
        }
        if let Some(corridor_width) = self.corridor_width {
            level.corridor_width = corridor_width;
        }
        if let Some(ratio) = self.wall_weakness_ratio {
            level.wall_weakness_ratio = ratio;
        }
        if let Some(chance) = self.debris_chance {
            level.debris_chance = chance;
        }
    }
}

/// Parameters of the scripted session run after generation.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SessionSettings {
    /// Number of ticks to simulate; zero skips the session.
    pub(crate) ticks: u64,
    /// Simulated milliseconds per tick.
    pub(crate) tick_ms: u64,
    /// Agent speed in cells per tick.
    pub(crate) agent_speed: f32,
    /// Agent collision radius in cells.
    pub(crate) agent_radius: f32,
    /// Player catch radius in cells.
    pub(crate) player_radius: f32,
    /// Ticks between two bolts fired by the player.
    pub(crate) fire_interval: u64,
    /// Ticks between two blast charges fired by the player.
    pub(crate) charge_interval: u64,
    /// Shot speed in cells per tick.
    pub(crate) shot_speed: f32,
    /// Shot lifetime in ticks.
    pub(crate) shot_lifetime: u32,
    /// Blast radius of charges in cells.
    pub(crate) blast_radius: f32,
    /// Initial milliseconds between two agent spawns.
    pub(crate) spawn_interval_ms: u64,
    /// Floor of the spawn interval in milliseconds.
    pub(crate) min_spawn_interval_ms: u64,
    /// Factor applied to the spawn interval after each spawn.
    pub(crate) spawn_decay: f64,
    /// Largest number of agents alive at once.
    pub(crate) max_agents: usize,
    /// Distance in cells new agents try to keep from the player.
    pub(crate) spawn_separation: f32,
    /// Stop the session as soon as an agent reaches the player.
    pub(crate) stop_on_catch: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ticks: 0,
            tick_ms: 16,
            agent_speed: 0.08,
            agent_radius: 0.3,
            player_radius: 0.35,
            fire_interval: 20,
            charge_interval: 150,
            shot_speed: 0.4,
            shot_lifetime: 90,
            blast_radius: 2.5,
            spawn_interval_ms: 9_000,
            min_spawn_interval_ms: 800,
            spawn_decay: 0.99,
            max_agents: 3,
            spawn_separation: 6.0,
            stop_on_catch: true,
        }
    }
}

/// Reads and parses a configuration file.
pub(crate) fn load(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration at {}", path.display()))?;
    parse(&contents).with_context(|| format!("failed to parse configuration at {}", path.display()))
}

fn parse(contents: &str) -> Result<FileConfig> {
    let sections: FileSections = toml::from_str(contents).context("invalid configuration toml")?;
    let mut level = LevelConfig::default();
    sections.level.apply(&mut level);
    Ok(FileConfig {
        level,
        session: sections.session,
    })
}
