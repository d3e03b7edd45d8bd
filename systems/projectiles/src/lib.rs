#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Projectile system that flies shots through the grid and resolves their
//! impacts immediately.
//!
//! Each shot advances in sub-steps no longer than half a cell so that it
//! cannot skip over a single-cell wall. The first non-clear impact consumes
//! the shot; shots carrying a blast radius detonate where they stop.

use cybermaze_core::{Command, Event, ImpactOutcome, Vec2};
use cybermaze_world::{self as world, CellGrid};

const MAX_SUBSTEPS: u32 = 64;

/// Parameters describing a single shot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shot {
    /// World-space point the shot starts from.
    pub origin: Vec2,
    /// Displacement applied every tick in world units.
    pub velocity: Vec2,
    /// Number of ticks the shot survives without hitting anything.
    pub lifetime: u32,
    /// Radius of the blast released when the shot stops, if any.
    pub blast_radius: Option<f32>,
}

#[derive(Clone, Copy, Debug)]
struct Projectile {
    position: Vec2,
    velocity: Vec2,
    remaining: u32,
    blast_radius: Option<f32>,
}

/// Pure system that owns every projectile in flight.
#[derive(Debug, Default)]
pub struct Projectiles {
    live: Vec<Projectile>,
}

impl Projectiles {
    /// Creates an empty projectile system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Launches a new shot.
    pub fn fire(&mut self, shot: Shot) {
        if shot.lifetime == 0 {
            return;
        }

        self.live.push(Projectile {
            position: shot.origin,
            velocity: shot.velocity,
            remaining: shot.lifetime,
            blast_radius: shot.blast_radius,
        });
    }

    /// Number of shots in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no shots are in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Positions of every shot in flight, in launch order.
    #[must_use]
    pub fn positions(&self) -> Vec<Vec2> {
        self.live.iter().map(|projectile| projectile.position).collect()
    }

    /// Advances every shot by one tick, resolving impacts against `grid` as
    /// they happen and broadcasting their consequences.
    pub fn handle(&mut self, events: &[Event], grid: &mut CellGrid, out: &mut Vec<Event>) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        let half_cell = grid.layout().cell_size() * 0.5;
        self.live.retain_mut(|projectile| {
            let count = substeps(projectile.velocity.length(), half_cell);
            let step = projectile.velocity / count as f32;

            let mut stopped = false;
            for _ in 0..count {
                projectile.position += step;
                if world::resolve_impact(grid, projectile.position, out) != ImpactOutcome::Clear {
                    stopped = true;
                    break;
                }
            }

            projectile.remaining -= 1;
            if !stopped && projectile.remaining > 0 {
                return true;
            }

            if let Some(radius) = projectile.blast_radius {
                world::apply(
                    grid,
                    Command::ResolveBlast {
                        center: projectile.position,
                        radius,
                    },
                    out,
                );
            }
            false
        });
    }
}

fn substeps(distance: f32, max_step: f32) -> u32 {
    if max_step.is_nan() || max_step <= 0.0 || !distance.is_finite() {
        return 1;
    }
    ((distance / max_step).ceil() as u32).clamp(1, MAX_SUBSTEPS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substeps_never_exceed_half_a_cell() {
        assert_eq!(substeps(0.0, 5.0), 1);
        assert_eq!(substeps(5.0, 5.0), 1);
        assert_eq!(substeps(5.1, 5.0), 2);
        assert_eq!(substeps(12.0, 0.0), 1);
        assert_eq!(substeps(1.0e9, 1.0), MAX_SUBSTEPS);
    }

    #[test]
    fn zero_lifetime_shots_are_ignored() {
        let mut projectiles = Projectiles::new();
        projectiles.fire(Shot {
            origin: Vec2::ZERO,
            velocity: Vec2::X,
            lifetime: 0,
            blast_radius: None,
        });
        assert!(projectiles.is_empty());
    }
}
