//! Match detection for the tile board.
//!
//! A horizontal or vertical run of at least [`MIN_RUN`] equal tiles is a
//! match. Matched tiles of the same kind that touch orthogonally are cleared
//! together and count as a single combo. After clearing, the remaining tiles
//! fall down without refilling the board and the board is matched again until
//! no runs are left.

use super::Tile;

/// Shortest run of equal tiles that is cleared.
pub const MIN_RUN: usize = 3;

/// Board being resolved: `None` marks a cleared cell.
struct Board {
    rows: usize,
    columns: usize,
    cells: Vec<Option<Tile>>,
}

impl Board {
    fn index(&self, row: usize, column: usize) -> usize {
        row * self.columns + column
    }

    /// Marks all cells that belong to a run of at least [`MIN_RUN`] tiles.
    fn find_matches(&self) -> Vec<bool> {
        let mut matched = vec![false; self.cells.len()];
        for row in 0..self.rows {
            let line = (0..self.columns).map(|column| self.index(row, column)).collect::<Vec<_>>();
            self.mark_runs(&line, &mut matched);
        }
        for column in 0..self.columns {
            let line = (0..self.rows).map(|row| self.index(row, column)).collect::<Vec<_>>();
            self.mark_runs(&line, &mut matched);
        }
        matched
    }

    fn mark_runs(&self, line: &[usize], matched: &mut [bool]) {
        let mut start = 0;
        while start < line.len() {
            let tile = self.cells[line[start]];
            let mut end = start + 1;
            while end < line.len() && self.cells[line[end]] == tile {
                end += 1;
            }
            if tile.is_some() && end - start >= MIN_RUN {
                for &index in &line[start..end] {
                    matched[index] = true;
                }
            }
            start = end;
        }
    }

    /// Clears matched cells and returns the number of combos among them.
    fn clear(&mut self, matched: &[bool]) -> u32 {
        let mut visited = vec![false; self.cells.len()];
        let mut combos = 0;
        for start in 0..self.cells.len() {
            if !matched[start] || visited[start] {
                continue;
            }
            combos += 1;
            let tile = self.cells[start];
            visited[start] = true;
            let mut stack = vec![start];
            while let Some(index) = stack.pop() {
                let (row, column) = (index / self.columns, index % self.columns);
                let neighbours = [
                    (row > 0).then(|| index - self.columns),
                    (row + 1 < self.rows).then(|| index + self.columns),
                    (column > 0).then(|| index - 1),
                    (column + 1 < self.columns).then(|| index + 1),
                ];
                for next in neighbours.into_iter().flatten() {
                    if matched[next] && !visited[next] && self.cells[next] == tile {
                        visited[next] = true;
                        stack.push(next);
                    }
                }
            }
        }
        for (cell, &cleared) in self.cells.iter_mut().zip(matched) {
            if cleared {
                *cell = None;
            }
        }
        combos
    }

    /// Lets the remaining tiles fall to the bottom row.
    fn collapse(&mut self) {
        for column in 0..self.columns {
            let mut bottom = self.rows;
            for row in (0..self.rows).rev() {
                let index = self.index(row, column);
                if let Some(tile) = self.cells[index] {
                    bottom -= 1;
                    self.cells[index] = None;
                    let target = self.index(bottom, column);
                    self.cells[target] = Some(tile);
                }
            }
        }
    }
}

/// Counts the combos produced by resolving the board, cascades included.
/// `tiles` holds `rows * columns` tile kinds in row-major order, the top row
/// first.
#[must_use]
pub fn count_combos(rows: usize, columns: usize, tiles: &[Tile]) -> u32 {
    debug_assert_eq!(tiles.len(), rows * columns);
    let mut board = Board {
        rows,
        columns,
        cells: tiles.iter().copied().map(Some).collect(),
    };
    let mut total = 0;
    loop {
        let matched = board.find_matches();
        if !matched.contains(&true) {
            return total;
        }
        total += board.clear(&matched);
        board.collapse();
    }
}

/// Returns `true` if the board contains at least one run.
#[must_use]
pub fn has_match(rows: usize, columns: usize, tiles: &[Tile]) -> bool {
    let board = Board {
        rows,
        columns,
        cells: tiles.iter().copied().map(Some).collect(),
    };
    board.find_matches().contains(&true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiles(rows: &[&str]) -> Vec<Tile> {
        rows.iter()
            .flat_map(|row| row.bytes().map(|b| b - b'0'))
            .collect()
    }

    #[test]
    fn no_runs() {
        let board = tiles(&["012", "120", "201"]);
        assert!(!has_match(3, 3, &board));
        assert_eq!(count_combos(3, 3, &board), 0);
    }

    #[test]
    fn horizontal_and_vertical_runs() {
        let board = tiles(&["1112", "3452", "5342", "3455"]);
        assert!(has_match(4, 4, &board));
        assert_eq!(count_combos(4, 4, &board), 2);
    }

    #[test]
    fn touching_runs_are_one_combo() {
        // An L shape of ones next to a connected block of zeros.
        let board = tiles(&["1000", "1000", "1110"]);
        assert_eq!(count_combos(3, 4, &board), 2);
    }

    #[test]
    fn separate_runs_of_one_kind() {
        let board = tiles(&["1112", "2321", "1113"]);
        assert_eq!(count_combos(3, 4, &board), 2);
    }

    #[test]
    fn cascade() {
        // Clearing the row of fours drops the top row onto the ones below and
        // completes a vertical run in the first column.
        let board = tiles(&["123", "444", "132", "123"]);
        assert_eq!(count_combos(4, 3, &board), 2);
    }

    #[test]
    fn short_runs_stay() {
        let board = tiles(&["1122", "2211"]);
        assert_eq!(count_combos(2, 4, &board), 0);
    }
}
