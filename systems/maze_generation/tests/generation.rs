use cybermaze_core::{CellCoord, CellState, SpawnPool, Surface};
use cybermaze_system_maze_generation::{
    generate_level, LevelConfig, LevelConfigError, MazeGenerator, CARVE_ORIGIN,
};
use cybermaze_world::{query, CellGrid, DistanceField};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const SURFACE: Surface = Surface::new(1230.0, 690.0);

fn generate(config: LevelConfig, seed: u64) -> CellGrid {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate_level(config, SURFACE, &mut rng).expect("configuration is valid")
}

fn assert_border_is_solid(grid: &CellGrid) {
    for row in 0..grid.rows() {
        for column in 0..grid.columns() {
            let cell = CellCoord::new(column, row);
            if cell.is_border(grid.columns(), grid.rows()) {
                assert_eq!(grid.state(cell), Some(CellState::Solid), "border at {cell:?}");
            }
        }
    }
}

fn state_counts(grid: &CellGrid) -> (usize, usize, usize) {
    let view = query::drawable_state(grid);
    view.cells().iter().fold((0, 0, 0), |(open, solid, destructible), state| match state {
        CellState::Open => (open + 1, solid, destructible),
        CellState::Solid => (open, solid + 1, destructible),
        CellState::Destructible => (open, solid, destructible + 1),
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_corridor_cell_is_connected(
        seed in any::<u64>(),
        corridor_width in 1_u32..4,
        extra_columns in 0_u32..20,
        extra_rows in 0_u32..20,
        wall_weakness_ratio in 0.0_f64..=1.0,
        debris_chance in 0.0_f64..=1.0,
    ) {
        let minimum = 3 * corridor_width + 2;
        let config = LevelConfig::new(
            minimum + extra_columns,
            minimum + extra_rows,
            corridor_width,
            wall_weakness_ratio,
            debris_chance,
        );
        let grid = generate(config, seed);

        // Destructible cells count as passable here; only permanent walls split
        // the corridor network.
        let field = DistanceField::flood(grid.columns(), grid.rows(), CARVE_ORIGIN, |cell| {
            grid.state(cell).map_or(true, |state| state == CellState::Solid)
        });
        for cell in query::cells_in_state(&grid, CellState::Open) {
            prop_assert!(field.reaches(cell), "open cell {:?} is sealed off", cell);
        }

        for row in 0..grid.rows() {
            for column in 0..grid.columns() {
                let cell = CellCoord::new(column, row);
                if cell.is_border(grid.columns(), grid.rows()) {
                    prop_assert_eq!(grid.state(cell), Some(CellState::Solid));
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn debris_free_levels_connect_around_active_walls(
        seed in any::<u64>(),
        corridor_width in 1_u32..4,
        extra_columns in 0_u32..24,
        extra_rows in 0_u32..24,
        wall_weakness_ratio in 0.0_f64..=1.0,
    ) {
        let minimum = 3 * corridor_width + 2;
        let config = LevelConfig::new(
            minimum + extra_columns,
            minimum + extra_rows,
            corridor_width,
            wall_weakness_ratio,
            0.0,
        );
        let grid = generate(config, seed);

        let field = query::walkable_field(&grid, CARVE_ORIGIN);
        let open = query::cells_in_state(&grid, CellState::Open);
        prop_assert_eq!(field.reachable_count(), open.len());
    }
}

#[test]
fn debris_free_levels_connect_through_open_cells_alone() {
    for seed in 0..16 {
        let grid = generate(LevelConfig::new(41, 23, 2, 0.3, 0.0), seed);
        let field = query::walkable_field(&grid, CARVE_ORIGIN);
        let open = query::cells_in_state(&grid, CellState::Open);

        assert_eq!(field.reachable_count(), open.len(), "seed {seed}");
        assert_border_is_solid(&grid);
    }
}

#[test]
fn default_level_has_every_cell_kind() {
    let grid = generate(LevelConfig::default(), 42);
    let (open, solid, destructible) = state_counts(&grid);

    assert_eq!(open + solid + destructible, 41 * 23);
    assert!(open > 0 && solid > 0 && destructible > 0);
    assert_eq!(grid.destructibles().len(), destructible);
    assert!(grid.destructibles().iter().all(|wall| wall.is_active()));
}

#[test]
fn zero_probabilities_leave_no_destructibles() {
    let grid = generate(LevelConfig::new(21, 15, 1, 0.0, 0.0), 9);
    let (_, _, destructible) = state_counts(&grid);

    assert_eq!(destructible, 0);
    assert!(grid.destructibles().is_empty());
}

#[test]
fn identical_seeds_reproduce_identical_levels() {
    let config = LevelConfig::default();
    let first = generate(config, 0xfeed);
    let second = generate(config, 0xfeed);
    let other = generate(config, 0xbeef);

    assert_eq!(
        query::drawable_state(&first).cells(),
        query::drawable_state(&second).cells()
    );
    assert_eq!(first.spawn_pools(), second.spawn_pools());
    assert_ne!(
        query::drawable_state(&first).cells(),
        query::drawable_state(&other).cells()
    );
}

#[test]
fn grid_is_fitted_and_centred_on_the_surface() {
    let grid = generate(LevelConfig::default(), 1);
    let layout = grid.layout();

    assert!((layout.cell_size() - 30.0).abs() < 1e-4);
    assert!((layout.margin_left()).abs() < 1e-3);
    assert!((layout.margin_top()).abs() < 1e-3);
}

#[test]
fn spawn_pools_only_hold_open_cells() {
    let grid = generate(LevelConfig::default(), 5);
    for pool in [SpawnPool::Periphery, SpawnPool::Center] {
        let cells = grid.spawn_pools().cells(pool);
        assert!(!cells.is_empty(), "{pool:?} pool is empty");
        for cell in cells {
            assert_eq!(grid.state(*cell), Some(CellState::Open));
        }
    }
    assert_eq!(grid.spawn_pools().cells(SpawnPool::Periphery).len(), 16);
}

#[test]
fn periphery_draws_land_farther_from_centre_than_center_draws() {
    let grid = generate(LevelConfig::default(), 77);
    let mut rng = ChaCha8Rng::seed_from_u64(78);
    let centre = (grid.columns() as f32 / 2.0, grid.rows() as f32 / 2.0);
    let mut mean = |pool: SpawnPool| {
        let draws = 500;
        let total: f32 = (0..draws)
            .map(|_| {
                let cell = grid.pick_spawn_cell(pool, &mut rng);
                let dx = cell.column() as f32 - centre.0;
                let dy = cell.row() as f32 - centre.1;
                dx * dx + dy * dy
            })
            .sum();
        total / draws as f32
    };

    let periphery = mean(SpawnPool::Periphery);
    let center = mean(SpawnPool::Center);
    assert!(
        periphery > center,
        "periphery mean {periphery} should exceed center mean {center}"
    );
}

#[test]
fn invalid_configuration_never_allocates_a_grid() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    assert_eq!(
        generate_level(LevelConfig::new(41, 23, 2, -0.1, 0.1), SURFACE, &mut rng).err(),
        Some(LevelConfigError::ProbabilityOutOfRange {
            name: "wall_weakness_ratio",
            value: -0.1,
        })
    );
    assert!(MazeGenerator::new(LevelConfig::new(4, 4, 1, 0.1, 0.1)).is_err());
}

#[test]
fn level_config_requires_every_key() {
    let complete: LevelConfig = toml::from_str(
        r#"
        columns = 31
        rows = 17
        corridor_width = 1
        wall_weakness_ratio = 0.25
        debris_chance = 0.0
        "#,
    )
    .expect("complete table parses");
    assert_eq!(complete, LevelConfig::new(31, 17, 1, 0.25, 0.0));
    assert_eq!(complete.validate(), Ok(()));

    let partial = toml::from_str::<LevelConfig>("columns = 31\ndebris_chance = 0.0\n");
    let message = partial.expect_err("missing keys are rejected").to_string();
    assert!(message.contains("rows"), "unexpected error: {message}");
}
