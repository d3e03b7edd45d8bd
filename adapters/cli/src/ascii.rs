//! Plain-text rendering of a generated level.

use cybermaze_core::{CellCoord, CellState, SpawnPool};
use cybermaze_world::{query, CellGrid};

/// Renders the grid one character per cell.
///
/// `#` marks permanent walls, `%` destructible walls, `.` open corridor, `P`
/// periphery spawn cells and `E` centre spawn cells.
pub(crate) fn render(grid: &CellGrid) -> String {
    let view = query::drawable_state(grid);
    let (columns, rows) = view.dimensions();
    let pools = grid.spawn_pools();
    let width = usize::try_from(columns).unwrap_or(0);
    let mut output = String::with_capacity((width + 1) * usize::try_from(rows).unwrap_or(0));

    for row in 0..rows {
        for column in 0..columns {
            let cell = CellCoord::new(column, row);
            let glyph = match view.state(cell) {
                Some(CellState::Solid) | None => '#',
                Some(CellState::Destructible) => '%',
                Some(CellState::Open) if pools.cells(SpawnPool::Periphery).contains(&cell) => 'P',
                Some(CellState::Open) if pools.cells(SpawnPool::Center).contains(&cell) => 'E',
                Some(CellState::Open) => '.',
            };
            output.push(glyph);
        }
        output.push('\n');
    }

    output
}
