//! Scripted headless session that exercises a generated level.
//!
//! A stationary player holds a periphery spawn and shoots at the nearest
//! agent while the spawning system feeds agents from the centre pool and the
//! pursuit system steers them through the corridors.

use std::time::Duration;

use cybermaze_core::{Event, SpawnPool};
use cybermaze_system_pathfinding::Pathfinder;
use cybermaze_system_projectiles::{Projectiles, Shot};
use cybermaze_system_pursuit::{self as pursuit, Pursuit};
use cybermaze_system_spawning::{self as spawning, Spawning};
use cybermaze_world::CellGrid;
use glam::Vec2;
use rand::Rng;
use tracing::{debug, info};

use crate::config::SessionSettings;

/// Outcome of a scripted session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SessionReport {
    /// Ticks that were simulated.
    pub(crate) ticks: u64,
    /// Agents that entered the level.
    pub(crate) agents_spawned: usize,
    /// Route computations performed by agents.
    pub(crate) replans: usize,
    /// Destructible walls removed by shots and blasts.
    pub(crate) walls_destroyed: usize,
    /// Shots stopped by permanent walls or the level edge.
    pub(crate) impacts_blocked: usize,
    /// Tick on which an agent reached the player, if any.
    pub(crate) caught_at: Option<u64>,
}

/// Drives every system over a single level.
pub(crate) struct Session<R> {
    grid: CellGrid,
    settings: SessionSettings,
    player: Vec2,
    pursuit: Pursuit,
    spawning: Spawning,
    projectiles: Projectiles,
    rng: R,
    report: SessionReport,
}

impl<R: Rng> Session<R> {
    /// Places the player on a periphery cell and prepares every system.
    pub(crate) fn new(grid: CellGrid, settings: SessionSettings, mut rng: R) -> Self {
        let player = grid.pick_spawn(SpawnPool::Periphery, &mut rng);
        let spawn_config = spawning::Config::new(
            Duration::from_millis(settings.spawn_interval_ms),
            Duration::from_millis(settings.min_spawn_interval_ms),
            settings.spawn_decay,
            settings.max_agents,
            settings.spawn_separation,
            rng.gen(),
        );
        info!(x = player.x, y = player.y, "player placed");

        Self {
            grid,
            settings,
            player,
            pursuit: Pursuit::new(pursuit::Config::default(), Pathfinder::new()),
            spawning: Spawning::new(spawn_config),
            projectiles: Projectiles::new(),
            rng,
            report: SessionReport::default(),
        }
    }

    /// Runs the configured number of ticks and returns the report.
    pub(crate) fn run(mut self) -> (CellGrid, SessionReport) {
        for tick in 1..=self.settings.ticks {
            self.step(tick);
            if self.report.caught_at.is_some() && self.settings.stop_on_catch {
                break;
            }
        }

        let report = self.report;
        info!(
            ticks = report.ticks,
            agents_spawned = report.agents_spawned,
            replans = report.replans,
            walls_destroyed = report.walls_destroyed,
            impacts_blocked = report.impacts_blocked,
            caught_at = ?report.caught_at,
            "session finished"
        );
        (self.grid, report)
    }

    fn step(&mut self, tick: u64) {
        let cell_size = self.grid.layout().cell_size();
        let clock = [Event::TimeAdvanced {
            dt: Duration::from_millis(self.settings.tick_ms),
        }];
        let mut events = clock.to_vec();

        self.projectiles.handle(&clock, &mut self.grid, &mut events);

        let mut spawns = Vec::new();
        self.spawning.handle(
            &events,
            &self.grid,
            self.pursuit.len(),
            &[self.player],
            &mut spawns,
        );
        for position in spawns {
            let id = self.pursuit.spawn(
                position,
                self.settings.agent_radius * cell_size,
                self.settings.agent_speed * cell_size,
                &mut self.rng,
            );
            debug!(agent = id.get(), tick, "agent spawned");
            self.report.agents_spawned += 1;
        }

        let mut outcomes = Vec::new();
        self.pursuit
            .handle(&events, &self.grid, self.player, &mut self.rng, &mut outcomes);
        events.extend(outcomes);

        self.fire(tick, cell_size);
        self.record(tick, &events, cell_size);
    }

    fn fire(&mut self, tick: u64, cell_size: f32) {
        let charge = self.settings.charge_interval > 0 && tick % self.settings.charge_interval == 0;
        let bolt = self.settings.fire_interval > 0 && tick % self.settings.fire_interval == 0;
        if !charge && !bolt {
            return;
        }

        let Some(aim) = self.nearest_agent() else {
            return;
        };
        let direction = (aim - self.player).normalize_or_zero();
        if direction == Vec2::ZERO {
            return;
        }

        self.projectiles.fire(Shot {
            origin: self.player,
            velocity: direction * self.settings.shot_speed * cell_size,
            lifetime: self.settings.shot_lifetime,
            blast_radius: charge.then_some(self.settings.blast_radius * cell_size),
        });
    }

    fn nearest_agent(&self) -> Option<Vec2> {
        self.pursuit
            .snapshots()
            .into_iter()
            .map(|agent| agent.position)
            .min_by(|a, b| {
                a.distance_squared(self.player)
                    .total_cmp(&b.distance_squared(self.player))
            })
    }

    fn record(&mut self, tick: u64, events: &[Event], cell_size: f32) {
        self.report.ticks = tick;
        for event in events {
            match event {
                Event::WallDestroyed { .. } => self.report.walls_destroyed += 1,
                Event::ImpactBlocked { .. } => self.report.impacts_blocked += 1,
                Event::AgentReplanned { .. } => self.report.replans += 1,
                Event::TimeAdvanced { .. } => {}
            }
        }

        if self.report.caught_at.is_some() {
            return;
        }

        let reach = (self.settings.agent_radius + self.settings.player_radius) * cell_size;
        let caught = self
            .pursuit
            .snapshots()
            .iter()
            .any(|agent| agent.position.distance(self.player) <= reach);
        if caught {
            info!(tick, "agent reached the player");
            self.report.caught_at = Some(tick);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cybermaze_core::Surface;
    use cybermaze_system_maze_generation::{generate_level, LevelConfig};
    use cybermaze_world::query;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn session(seed: u64, settings: SessionSettings) -> Session<ChaCha8Rng> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = generate_level(LevelConfig::default(), Surface::new(1230.0, 690.0), &mut rng)
            .expect("default configuration is valid");
        Session::new(grid, settings, rng)
    }

    fn busy_settings() -> SessionSettings {
        SessionSettings {
            ticks: 900,
            spawn_interval_ms: 200,
            min_spawn_interval_ms: 100,
            charge_interval: 30,
            fire_interval: 5,
            stop_on_catch: false,
            ..SessionSettings::default()
        }
    }

    #[test]
    fn player_starts_on_a_periphery_cell() {
        let session = session(3, SessionSettings::default());
        let cell = session
            .grid
            .world_to_cell(session.player)
            .expect("player inside grid");
        assert!(session
            .grid
            .spawn_pools()
            .cells(SpawnPool::Periphery)
            .contains(&cell));
    }

    #[test]
    fn zero_ticks_leave_the_level_untouched() {
        let session = session(4, SessionSettings::default());
        let before = query::drawable_state(&session.grid).cells().to_vec();
        let (grid, report) = session.run();

        assert_eq!(report, SessionReport::default());
        assert_eq!(query::drawable_state(&grid).cells(), before.as_slice());
    }

    #[test]
    fn busy_session_spawns_plans_and_shoots() {
        let (grid, report) = session(5, busy_settings()).run();

        assert_eq!(report.ticks, 900);
        assert_eq!(report.agents_spawned, busy_settings().max_agents);
        assert!(report.replans >= report.agents_spawned);
        assert!(report.walls_destroyed + report.impacts_blocked > 0);
        let destroyed = grid
            .destructibles()
            .iter()
            .filter(|wall| !wall.is_active())
            .count();
        assert_eq!(destroyed, report.walls_destroyed);
    }

    #[test]
    fn sessions_replay_deterministically() {
        assert_eq!(
            session(6, busy_settings()).run().1,
            session(6, busy_settings()).run().1
        );
    }
}
