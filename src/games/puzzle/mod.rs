//! Tile-swap puzzle: a rectangular board of tile kinds where one selected tile
//! is dragged around by swapping it with its orthogonal neighbours. After the
//! swaps the board is resolved and scored by the number of combos (see
//! [`combo`]).
//!
//! The board usually comes from an external classifier that recognizes tiles
//! on screen. [`PuzzleState::random`] produces synthetic boards instead.

use std::fmt;

use anyhow::bail;
use itertools::Itertools;
use rand::Rng;

use crate::environment::{GameState, Player};

pub mod combo;

/// Tile kind code.
pub type Tile = u8;

/// Combo counts up to this value score zero.
pub const COMBO_THRESHOLD: u32 = 4;
/// Default number of swaps before the board is resolved.
pub const DEFAULT_MAX_SWAPS: u32 = 10;
/// Tile kinds are written as single decimal digits.
pub const MAX_TILE_KINDS: Tile = 10;

/// Board coordinates, rows counted from the top.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: usize,
    pub column: usize,
}

impl Cell {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Direction of a swap with the neighbouring tile.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions in the order used by the move generator.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Returns the neighbour of `cell` in this direction if it is on a board
    /// of the given size.
    #[must_use]
    pub fn step(self, cell: Cell, rows: usize, columns: usize) -> Option<Cell> {
        let (row, column) = match self {
            Self::Up => (cell.row.checked_sub(1)?, cell.column),
            Self::Down => (cell.row + 1, cell.column),
            Self::Left => (cell.row, cell.column.checked_sub(1)?),
            Self::Right => (cell.row, cell.column + 1),
        };
        (row < rows && column < columns).then_some(Cell::new(row, column))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

/// A move either picks up the tile to drag or drags it one step further.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PuzzleMove {
    /// Picks up the tile at the given cell. Only legal before any selection.
    Select(Cell),
    /// Swaps the selected tile with its neighbour. Only legal after a
    /// selection.
    Swap(Direction),
}

impl fmt::Display for PuzzleMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(cell) => write!(f, "select {cell}"),
            Self::Swap(direction) => write!(f, "swap {direction}"),
        }
    }
}

/// Position of the puzzle. Both players share the score, so the alternating
/// turn bookkeeping only keeps the search tree consistent with two-player
/// games.
#[derive(Clone, PartialEq, Eq)]
pub struct PuzzleState {
    rows: usize,
    columns: usize,
    tiles: Vec<Tile>,
    selected: Option<Cell>,
    depth: u32,
    max_swaps: u32,
    combo_threshold: u32,
    player_just_moved: Player,
}

impl PuzzleState {
    /// Creates a puzzle from `rows * columns` tile kinds in row-major order.
    ///
    /// # Errors
    ///
    /// Fails if the board is empty or the number of tiles does not match its
    /// size.
    pub fn new(rows: usize, columns: usize, tiles: Vec<Tile>) -> anyhow::Result<Self> {
        if rows == 0 || columns == 0 {
            bail!("board should have at least one row and column, got {rows}x{columns}");
        }
        if tiles.len() != rows * columns {
            bail!(
                "{rows}x{columns} board needs {} tiles, got {}",
                rows * columns,
                tiles.len()
            );
        }
        Ok(Self::from_tiles(rows, columns, tiles))
    }

    /// Generates a board without any runs of equal tiles.
    ///
    /// # Panics
    ///
    /// Panics if the board is empty or `tile_kinds` is not within
    /// `3..=MAX_TILE_KINDS`: with fewer kinds some cells can not avoid runs.
    #[must_use]
    pub fn random(rows: usize, columns: usize, tile_kinds: Tile, rng: &mut impl Rng) -> Self {
        assert!(rows > 0 && columns > 0, "empty {rows}x{columns} board");
        assert!(
            (3..=MAX_TILE_KINDS).contains(&tile_kinds),
            "expected 3 to {MAX_TILE_KINDS} tile kinds, got {tile_kinds}"
        );
        let mut tiles: Vec<Tile> = Vec::with_capacity(rows * columns);
        for row in 0..rows {
            for column in 0..columns {
                let index = row * columns + column;
                let left = (column >= 2 && tiles[index - 1] == tiles[index - 2])
                    .then(|| tiles[index - 1]);
                let above = (row >= 2 && tiles[index - columns] == tiles[index - 2 * columns])
                    .then(|| tiles[index - columns]);
                let allowed = (0..tile_kinds)
                    .filter(|&kind| Some(kind) != left && Some(kind) != above)
                    .collect_vec();
                tiles.push(allowed[rng.gen_range(0..allowed.len())]);
            }
        }
        debug_assert!(!combo::has_match(rows, columns, &tiles));
        Self::from_tiles(rows, columns, tiles)
    }

    const fn from_tiles(rows: usize, columns: usize, tiles: Vec<Tile>) -> Self {
        Self {
            rows,
            columns,
            tiles,
            selected: None,
            depth: 0,
            max_swaps: DEFAULT_MAX_SWAPS,
            combo_threshold: COMBO_THRESHOLD,
            player_just_moved: Player::Second,
        }
    }

    /// Limits the number of swaps before the board is resolved.
    #[must_use]
    pub fn with_max_swaps(mut self, max_swaps: u32) -> Self {
        self.max_swaps = max_swaps;
        self
    }

    /// Sets the combo count that has to be exceeded for a non-zero result.
    #[must_use]
    pub fn with_combo_threshold(mut self, combo_threshold: u32) -> Self {
        self.combo_threshold = combo_threshold;
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Returns the tile kind at `cell`.
    #[must_use]
    pub fn tile(&self, cell: Cell) -> Tile {
        self.tiles[self.index(cell)]
    }

    /// Returns the currently dragged tile, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<Cell> {
        self.selected
    }

    /// Number of swaps made so far.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Counts the combos the current board would produce.
    #[must_use]
    pub fn combos(&self) -> u32 {
        combo::count_combos(self.rows, self.columns, &self.tiles)
    }

    const fn index(&self, cell: Cell) -> usize {
        cell.row * self.columns + cell.column
    }

    const fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.column < self.columns
    }

    fn is_legal(&self, next_move: PuzzleMove) -> bool {
        if self.depth >= self.max_swaps {
            return false;
        }
        match (next_move, self.selected) {
            (PuzzleMove::Select(cell), None) => self.contains(cell),
            (PuzzleMove::Swap(direction), Some(cell)) => {
                direction.step(cell, self.rows, self.columns).is_some()
            },
            _ => false,
        }
    }
}

impl GameState for PuzzleState {
    type Move = PuzzleMove;
    type MoveList = Vec<PuzzleMove>;

    fn player_just_moved(&self) -> Player {
        self.player_just_moved
    }

    fn make_move(&mut self, next_move: &PuzzleMove) {
        assert!(
            self.is_legal(*next_move),
            "illegal move {next_move} in position {self}"
        );
        match *next_move {
            PuzzleMove::Select(cell) => self.selected = Some(cell),
            PuzzleMove::Swap(direction) => {
                let Some((from, to)) = self.selected.and_then(|from| {
                    direction
                        .step(from, self.rows, self.columns)
                        .map(|to| (from, to))
                }) else {
                    unreachable!("swap {direction} passed the legality check in {self}");
                };
                let (from_index, to_index) = (self.index(from), self.index(to));
                self.tiles.swap(from_index, to_index);
                self.selected = Some(to);
                self.depth += 1;
            },
        }
        self.player_just_moved = !self.player_just_moved;
    }

    fn generate_moves(&self) -> Vec<PuzzleMove> {
        if self.depth >= self.max_swaps {
            return Vec::new();
        }
        match self.selected {
            None => (0..self.rows)
                .cartesian_product(0..self.columns)
                .map(|(row, column)| PuzzleMove::Select(Cell::new(row, column)))
                .collect(),
            Some(cell) => Direction::ALL
                .into_iter()
                .filter(|direction| direction.step(cell, self.rows, self.columns).is_some())
                .map(PuzzleMove::Swap)
                .collect(),
        }
    }

    /// Both players get the same result: zero unless the resolved board
    /// produces more combos than the threshold, otherwise the share of the
    /// most combos the board could possibly hold.
    fn result(&self, _player: Player) -> f64 {
        assert!(
            self.is_terminal(),
            "result of non-terminal position {self}"
        );
        let combos = self.combos();
        if combos <= self.combo_threshold {
            return 0.0;
        }
        let max_combos = u32::try_from(self.tiles.len() / combo::MIN_RUN)
            .unwrap_or(u32::MAX)
            .max(1);
        (f64::from(combos) / f64::from(max_combos)).min(1.0)
    }
}

impl TryFrom<&str> for PuzzleState {
    type Error = anyhow::Error;

    /// Parses rows of tile digits separated by `/` or whitespace, e.g.
    /// `012/120/201`.
    fn try_from(input: &str) -> anyhow::Result<Self> {
        let mut tiles = Vec::new();
        let mut rows = 0;
        let mut columns = None;
        for line in input
            .split(|c: char| c == '/' || c.is_whitespace())
            .filter(|line| !line.is_empty())
        {
            let width = line.chars().count();
            match columns {
                None => columns = Some(width),
                Some(expected) if expected != width => {
                    bail!("all rows should have {expected} tiles, row {rows} has {width}")
                },
                Some(_) => {},
            }
            for c in line.chars() {
                match c.to_digit(10) {
                    Some(kind) => tiles.push(Tile::try_from(kind)?),
                    None => bail!("unexpected tile '{c}', expected a digit"),
                }
            }
            rows += 1;
        }
        Self::new(rows, columns.unwrap_or(0), tiles)
    }
}

impl fmt::Display for PuzzleState {
    /// Prints the rows of tiles separated by `/`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self
            .tiles
            .chunks(self.columns)
            .map(|row| row.iter().join(""))
            .join("/");
        write!(f, "{rows}")
    }
}

impl fmt::Debug for PuzzleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, tiles) in self.tiles.chunks(self.columns).enumerate() {
            let line = tiles
                .iter()
                .enumerate()
                .map(|(column, tile)| {
                    if self.selected == Some(Cell::new(row, column)) {
                        format!("[{tile}]")
                    } else {
                        format!(" {tile} ")
                    }
                })
                .join("");
            writeln!(f, "{}", line.trim_end())?;
        }
        match self.selected {
            Some(cell) => writeln!(f, "Selected: {cell}")?,
            None => writeln!(f, "Selected: -")?,
        }
        writeln!(f, "Swaps: {}/{}", self.depth, self.max_swaps)?;
        writeln!(f, "Player just moved: {}", self.player_just_moved)?;
        Ok(())
    }
}
