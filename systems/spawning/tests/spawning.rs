use std::time::Duration;

use cybermaze_core::{CellCoord, CellState, Event, GridLayout, SpawnPool, Surface, Vec2};
use cybermaze_system_maze_generation::{generate_level, LevelConfig};
use cybermaze_system_spawning::{place_separated, Config, Spawning};
use cybermaze_world::{CellGrid, SpawnPools};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn level(seed: u64) -> CellGrid {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate_level(LevelConfig::default(), Surface::new(1230.0, 690.0), &mut rng)
        .expect("default configuration is valid")
}

fn advance(dt: Duration) -> Vec<Event> {
    vec![Event::TimeAdvanced { dt }]
}

fn fast_config(max_alive: usize) -> Config {
    Config::new(
        Duration::from_millis(500),
        Duration::from_millis(100),
        0.5,
        max_alive,
        0.0,
        0x1234_5678,
    )
}

#[test]
fn emits_multiple_spawns_for_large_dt() {
    let grid = level(1);
    let mut spawning = Spawning::new(fast_config(10));
    let mut spawns = Vec::new();

    // 500 + 250 + 125 + 100 + 100 ms fit in 1.1 s.
    spawning.handle(&advance(Duration::from_millis(1_100)), &grid, 0, &[], &mut spawns);

    assert_eq!(spawns.len(), 5, "expected one spawn per elapsed interval");
    assert_eq!(spawning.interval(), Duration::from_millis(100));
    let centre_cells = grid.spawn_pools().cells(SpawnPool::Center);
    for position in spawns {
        let cell = grid.world_to_cell(position).expect("spawn lies inside grid");
        assert!(centre_cells.contains(&cell), "{cell:?} is not a centre cell");
    }
}

#[test]
fn live_cap_stops_spawning_and_drops_backlog() {
    let grid = level(2);
    let mut spawning = Spawning::new(fast_config(3));
    let mut spawns = Vec::new();

    spawning.handle(&advance(Duration::from_secs(10)), &grid, 1, &[], &mut spawns);
    assert_eq!(spawns.len(), 2);

    spawns.clear();
    spawning.handle(&advance(Duration::from_millis(50)), &grid, 2, &[], &mut spawns);
    assert!(spawns.is_empty(), "backlog must not burst once a slot frees");
}

#[test]
fn ignores_ticks_without_elapsed_time() {
    let grid = level(3);
    let mut spawning = Spawning::new(fast_config(3));
    let mut spawns = Vec::new();

    spawning.handle(&[], &grid, 0, &[], &mut spawns);
    spawning.handle(
        &[Event::WallDestroyed {
            cell: CellCoord::new(1, 1),
        }],
        &grid,
        0,
        &[],
        &mut spawns,
    );
    assert!(spawns.is_empty());
}

#[test]
fn identical_seeds_replay_identical_spawns() {
    let grid = level(4);
    let run = |seed: u64| {
        let mut spawning = Spawning::new(fast_config(50).with_seed(seed));
        let mut spawns = Vec::new();
        for _ in 0..20 {
            spawning.handle(&advance(Duration::from_millis(250)), &grid, 0, &[], &mut spawns);
        }
        spawns
    };

    assert_eq!(run(7), run(7));
    assert_ne!(run(7), run(8));
}

#[test]
fn placement_keeps_away_from_players() {
    let grid = level(5);
    let player = grid.cell_to_world_center(CellCoord::new(20, 11));
    let min_distance = 3.0 * grid.layout().cell_size();
    let mut rng = ChaCha8Rng::seed_from_u64(6);

    let mut separated = 0;
    for _ in 0..100 {
        let spawn = place_separated(&grid, SpawnPool::Center, &[player], min_distance, &mut rng);
        if spawn.distance(player) >= min_distance {
            separated += 1;
        }
    }
    assert!(separated > 90, "only {separated} of 100 spawns kept their distance");
}

#[test]
fn placement_falls_back_to_the_last_draw() {
    let cells = vec![CellState::Open; 9];
    let grid = CellGrid::from_cells(3, 3, GridLayout::new(10.0, 0.0, 0.0), cells)
        .with_spawn_pools(SpawnPools::new(Vec::new(), vec![CellCoord::new(1, 1)]));
    let crowd = [Vec2::new(15.0, 15.0)];
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    assert_eq!(
        place_separated(&grid, SpawnPool::Center, &crowd, 100.0, &mut rng),
        Vec2::new(15.0, 15.0)
    );
}
