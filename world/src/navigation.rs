//! Breadth-first reachability field used to audit corridor connectivity.

use std::collections::VecDeque;

use cybermaze_core::{CellCoord, Direction};

/// Dense step-count grid seeded from a single origin cell.
///
/// Distances default to `u32::MAX` for cells the search never reached so callers
/// can distinguish walls and sealed pockets from traversable corridors.
#[derive(Clone, Debug, Default)]
pub struct DistanceField {
    columns: u32,
    rows: u32,
    distances: Vec<u32>,
}

impl DistanceField {
    /// Floods outward from `origin`, stepping only through cells for which
    /// `is_blocked` returns `false`.
    ///
    /// A blocked or out-of-bounds origin yields an empty field.
    pub fn flood<F>(columns: u32, rows: u32, origin: CellCoord, mut is_blocked: F) -> Self
    where
        F: FnMut(CellCoord) -> bool,
    {
        let width = usize::try_from(columns).unwrap_or(0);
        let height = usize::try_from(rows).unwrap_or(0);
        let cell_count = width.checked_mul(height).unwrap_or(0);
        let mut field = Self {
            columns,
            rows,
            distances: vec![u32::MAX; cell_count],
        };

        if origin.column() >= columns || origin.row() >= rows || is_blocked(origin) {
            return field;
        }

        let Some(origin_index) = index(width, origin) else {
            return field;
        };
        field.distances[origin_index] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(origin);

        while let Some(cell) = queue.pop_front() {
            let Some(current_index) = index(width, cell) else {
                continue;
            };
            let next_distance = field.distances[current_index].saturating_add(1);

            for direction in Direction::CARDINAL {
                let Some(neighbor) = cell.neighbor(direction, columns, rows) else {
                    continue;
                };
                let Some(neighbor_index) = index(width, neighbor) else {
                    continue;
                };

                if field.distances[neighbor_index] <= next_distance || is_blocked(neighbor) {
                    continue;
                }

                field.distances[neighbor_index] = next_distance;
                queue.push_back(neighbor);
            }
        }

        field
    }

    /// Number of steps from the origin to `cell`, or `None` when the cell is
    /// outside the field or unreachable.
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<u32> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }

        let width = usize::try_from(self.columns).ok()?;
        index(width, cell)
            .and_then(|offset| self.distances.get(offset).copied())
            .filter(|&distance| distance != u32::MAX)
    }

    /// Reports whether the search reached `cell`.
    #[must_use]
    pub fn reaches(&self, cell: CellCoord) -> bool {
        self.distance(cell).is_some()
    }

    /// Number of cells the search reached, the origin included.
    #[must_use]
    pub fn reachable_count(&self) -> usize {
        self.distances
            .iter()
            .filter(|&&distance| distance != u32::MAX)
            .count()
    }
}

fn index(width: usize, cell: CellCoord) -> Option<usize> {
    let row = usize::try_from(cell.row()).ok()?;
    let column = usize::try_from(cell.column()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flood_counts_steps_around_walls() {
        // 3x3 with the centre blocked.
        let blocked = CellCoord::new(1, 1);
        let field = DistanceField::flood(3, 3, CellCoord::new(0, 0), |cell| cell == blocked);

        assert_eq!(field.distance(CellCoord::new(0, 0)), Some(0));
        assert_eq!(field.distance(CellCoord::new(2, 2)), Some(4));
        assert_eq!(field.distance(blocked), None);
        assert_eq!(field.reachable_count(), 8);
    }

    #[test]
    fn blocked_origin_reaches_nothing() {
        let field = DistanceField::flood(4, 4, CellCoord::new(1, 1), |_| true);
        assert_eq!(field.reachable_count(), 0);
        assert!(!field.reaches(CellCoord::new(1, 1)));
    }

    #[test]
    fn sealed_pocket_is_unreachable() {
        let wall_column = 2;
        let field = DistanceField::flood(5, 2, CellCoord::new(0, 0), |cell| {
            cell.column() == wall_column
        });

        assert!(field.reaches(CellCoord::new(1, 1)));
        assert!(!field.reaches(CellCoord::new(3, 0)));
        assert_eq!(field.distance(CellCoord::new(9, 9)), None);
    }
}
