#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pursuit system that steers autonomous agents toward a moving target.
//!
//! Agents re-plan on a staggered countdown rather than every tick, follow the
//! waypoints of their last route in between, and hold position when no route
//! exists. Each agent carries an accuracy roll; a missed roll aims the next
//! route at a point jittered around the target.

use std::collections::VecDeque;

use cybermaze_core::{AgentId, Event, Vec2};
use cybermaze_system_pathfinding::Pathfinder;
use cybermaze_world::CellGrid;
use rand::Rng;
use tracing::trace;

/// Lowest accuracy an agent can roll at spawn.
pub const MIN_ACCURACY: f32 = 0.75;

/// Tuning parameters for agent re-planning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    replan_interval: u32,
    replan_stagger: u32,
    targeting_fuzz: f32,
}

impl Config {
    /// Creates a configuration from a re-plan interval in ticks, the largest
    /// per-agent offset subtracted from it, and the targeting jitter span in
    /// cells.
    #[must_use]
    pub const fn new(replan_interval: u32, replan_stagger: u32, targeting_fuzz: f32) -> Self {
        Self {
            replan_interval,
            replan_stagger,
            targeting_fuzz,
        }
    }

    /// Ticks between two re-plans of the same agent before staggering.
    #[must_use]
    pub const fn replan_interval(&self) -> u32 {
        self.replan_interval
    }

    /// Largest number of ticks a re-plan may be brought forward.
    #[must_use]
    pub const fn replan_stagger(&self) -> u32 {
        self.replan_stagger
    }

    /// Width in cells of the square a missed accuracy roll aims into.
    #[must_use]
    pub const fn targeting_fuzz(&self) -> f32 {
        self.targeting_fuzz
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(30, 15, 5.0)
    }
}

#[derive(Clone, Debug)]
struct Agent {
    id: AgentId,
    position: Vec2,
    radius: f32,
    speed: f32,
    accuracy: f32,
    route: VecDeque<Vec2>,
    countdown: u32,
    holding: bool,
}

/// Read-only description of an agent exposed to adapters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentSnapshot {
    /// Identifier of the agent.
    pub id: AgentId,
    /// Current world-space position.
    pub position: Vec2,
    /// Collision radius in world units.
    pub radius: f32,
    /// Next waypoint the agent is heading for, if any.
    pub next_waypoint: Option<Vec2>,
    /// Number of waypoints left on the current route.
    pub remaining_waypoints: usize,
}

/// Pure system that owns agent routes and advances agents along them.
#[derive(Debug)]
pub struct Pursuit {
    config: Config,
    pathfinder: Pathfinder,
    agents: Vec<Agent>,
    next_id: u32,
}

impl Pursuit {
    /// Creates an empty pursuit system.
    #[must_use]
    pub fn new(config: Config, pathfinder: Pathfinder) -> Self {
        Self {
            config,
            pathfinder,
            agents: Vec::new(),
            next_id: 0,
        }
    }

    /// Adds an agent at `position` moving `speed` world units per tick.
    ///
    /// The agent rolls its accuracy immediately and plans its first route on
    /// the next tick.
    pub fn spawn<R>(&mut self, position: Vec2, radius: f32, speed: f32, rng: &mut R) -> AgentId
    where
        R: Rng + ?Sized,
    {
        let id = AgentId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let accuracy = MIN_ACCURACY + rng.gen::<f32>() * (1.0 - MIN_ACCURACY);
        self.agents.push(Agent {
            id,
            position,
            radius,
            speed,
            accuracy,
            route: VecDeque::new(),
            countdown: 0,
            holding: false,
        });
        id
    }

    /// Removes an agent, returning whether it existed.
    pub fn despawn(&mut self, id: AgentId) -> bool {
        let before = self.agents.len();
        self.agents.retain(|agent| agent.id != id);
        self.agents.len() != before
    }

    /// Number of live agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether no agents are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Captures every live agent in spawn order.
    #[must_use]
    pub fn snapshots(&self) -> Vec<AgentSnapshot> {
        self.agents
            .iter()
            .map(|agent| AgentSnapshot {
                id: agent.id,
                position: agent.position,
                radius: agent.radius,
                next_waypoint: agent.route.front().copied(),
                remaining_waypoints: agent.route.len(),
            })
            .collect()
    }

    /// Consumes the tick's events and advances every agent toward `target`.
    ///
    /// Nothing moves unless the events contain [`Event::TimeAdvanced`]. A
    /// destroyed wall releases agents that were holding position so they
    /// re-plan on this tick.
    pub fn handle<R>(
        &mut self,
        events: &[Event],
        grid: &CellGrid,
        target: Vec2,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) where
        R: Rng + ?Sized,
    {
        if events
            .iter()
            .any(|event| matches!(event, Event::WallDestroyed { .. }))
        {
            for agent in &mut self.agents {
                agent.holding = false;
            }
        }

        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        let cell_size = grid.layout().cell_size();
        for agent in &mut self.agents {
            agent.countdown = agent.countdown.saturating_sub(1);

            let exhausted = agent.route.is_empty() && !agent.holding;
            if agent.countdown == 0 || exhausted {
                let aim = aim_point(&self.config, agent.accuracy, target, cell_size, rng);
                agent.route = self.pathfinder.find_path(grid, agent.position, aim).into();
                agent.holding = agent.route.is_empty();
                agent.countdown = next_countdown(&self.config, rng);
                trace!(
                    agent = agent.id.get(),
                    waypoints = agent.route.len(),
                    countdown = agent.countdown,
                    "agent re-planned"
                );
                out.push(Event::AgentReplanned {
                    agent: agent.id,
                    waypoints: agent.route.len(),
                });
            }

            advance(agent, grid);
        }
    }
}

fn aim_point<R>(config: &Config, accuracy: f32, target: Vec2, cell_size: f32, rng: &mut R) -> Vec2
where
    R: Rng + ?Sized,
{
    if rng.gen::<f32>() <= accuracy {
        return target;
    }

    let span = config.targeting_fuzz * cell_size;
    let jitter = Vec2::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5) * span;
    target + jitter
}

fn next_countdown<R>(config: &Config, rng: &mut R) -> u32
where
    R: Rng + ?Sized,
{
    let offset = if config.replan_stagger == 0 {
        0
    } else {
        rng.gen_range(1..=config.replan_stagger)
    };
    config.replan_interval.saturating_sub(offset).max(1)
}

fn advance(agent: &mut Agent, grid: &CellGrid) {
    let Some(&waypoint) = agent.route.front() else {
        return;
    };

    let offset = waypoint - agent.position;
    let distance = offset.length();
    if distance <= agent.speed {
        agent.position = waypoint;
        let _ = agent.route.pop_front();
        return;
    }

    let step = offset / distance * agent.speed;
    agent.position = grid.slide_circle(agent.position, step, agent.radius);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn countdown_stays_within_the_stagger_window() {
        let config = Config::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..200 {
            let countdown = next_countdown(&config, &mut rng);
            assert!((15..=29).contains(&countdown), "countdown {countdown}");
        }
        assert_eq!(next_countdown(&Config::new(30, 0, 5.0), &mut rng), 30);
        assert_eq!(next_countdown(&Config::new(3, 10, 5.0), &mut rng), 1);
    }

    #[test]
    fn perfect_accuracy_aims_at_the_target() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let target = Vec2::new(40.0, 60.0);
        for _ in 0..50 {
            assert_eq!(aim_point(&Config::default(), 1.0, target, 10.0, &mut rng), target);
        }
    }

    #[test]
    fn missed_rolls_stay_inside_the_fuzz_square() {
        let mut rng = ChaCha8Rng::seed_from_u64(15);
        let target = Vec2::new(100.0, 100.0);
        let mut missed = 0;
        for _ in 0..200 {
            let aim = aim_point(&Config::default(), 0.0, target, 10.0, &mut rng);
            let offset = aim - target;
            assert!(offset.x.abs() <= 25.0 && offset.y.abs() <= 25.0);
            if aim != target {
                missed += 1;
            }
        }
        assert!(missed > 150);
    }

    #[test]
    fn accuracy_rolls_fall_in_range() {
        let mut pursuit = Pursuit::new(Config::default(), Pathfinder::new());
        let mut rng = ChaCha8Rng::seed_from_u64(16);
        for _ in 0..32 {
            let _ = pursuit.spawn(Vec2::ZERO, 1.0, 1.0, &mut rng);
        }
        assert!(pursuit
            .agents
            .iter()
            .all(|agent| (MIN_ACCURACY..=1.0).contains(&agent.accuracy)));
        assert_eq!(pursuit.len(), 32);
    }
}
