//! Three-in-a-row marking game on a 3×3 grid (tic-tac-toe). Squares are
//! numbered row by row:
//!
//! ```text
//! 0 1 2
//! 3 4 5
//! 6 7 8
//! ```

use std::fmt;

use anyhow::bail;
use arrayvec::ArrayVec;
use itertools::Itertools;

use crate::environment::{GameState, Player, ZeroSum};

#[allow(missing_docs)]
pub const BOARD_WIDTH: usize = 3;
#[allow(missing_docs)]
pub const BOARD_SIZE: usize = BOARD_WIDTH * BOARD_WIDTH;

/// Index of a grid cell in `0..BOARD_SIZE`.
pub type Square = usize;

/// Legal moves never exceed the number of cells.
pub type MoveList = ArrayVec<Square, BOARD_SIZE>;

/// Rows, columns and both diagonals.
const LINES: [[Square; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Position of the grid game. The game is over as soon as one player
/// completes a line or the board is full.
#[derive(Clone, PartialEq, Eq)]
pub struct GridState {
    board: [Option<Player>; BOARD_SIZE],
    player_just_moved: Player,
}

impl GridState {
    /// Creates an empty board with [`Player::First`] to move.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            board: [None; BOARD_SIZE],
            player_just_moved: Player::Second,
        }
    }

    /// Returns the mark placed on `square`, if any.
    #[must_use]
    pub fn at(&self, square: Square) -> Option<Player> {
        self.board[square]
    }

    /// Returns the owner of the first completed line.
    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        self.line_owners().next()
    }

    fn line_owners(&self) -> impl Iterator<Item = Player> + '_ {
        LINES.iter().filter_map(|&[a, b, c]| match self.board[a] {
            Some(owner) if self.board[b] == Some(owner) && self.board[c] == Some(owner) => {
                Some(owner)
            },
            _ => None,
        })
    }

    fn is_full(&self) -> bool {
        self.board.iter().all(Option::is_some)
    }
}

impl Default for GridState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for GridState {
    type Move = Square;
    type MoveList = MoveList;

    fn player_just_moved(&self) -> Player {
        self.player_just_moved
    }

    fn make_move(&mut self, square: &Square) {
        let square = *square;
        assert!(
            square < BOARD_SIZE && self.board[square].is_none() && self.winner().is_none(),
            "illegal move {square} in position {self}"
        );
        self.player_just_moved = !self.player_just_moved;
        self.board[square] = Some(self.player_just_moved);
    }

    fn generate_moves(&self) -> MoveList {
        if self.winner().is_some() {
            return MoveList::new();
        }
        (0..BOARD_SIZE)
            .filter(|&square| self.board[square].is_none())
            .collect()
    }

    fn result(&self, player: Player) -> f64 {
        match self.winner() {
            Some(winner) if winner == player => 1.0,
            Some(_) => 0.0,
            None => {
                assert!(self.is_full(), "result of non-terminal position {self}");
                0.5
            },
        }
    }
}

impl ZeroSum for GridState {}

impl TryFrom<&str> for GridState {
    type Error = anyhow::Error;

    /// Parses nine marks out of `.XO`. Rows can be separated with `/` or
    /// whitespace. `X` always moves first.
    fn try_from(input: &str) -> anyhow::Result<Self> {
        let marks = input
            .chars()
            .filter(|c| *c != '/' && !c.is_whitespace())
            .collect_vec();
        if marks.len() != BOARD_SIZE {
            bail!("expected {BOARD_SIZE} cells, got {}", marks.len());
        }
        let mut board = [None; BOARD_SIZE];
        for (cell, mark) in board.iter_mut().zip(marks) {
            *cell = match mark {
                '.' => None,
                'X' | 'x' => Some(Player::First),
                'O' | 'o' => Some(Player::Second),
                _ => bail!("unexpected mark '{mark}', expected one of '.XO'"),
            };
        }
        let first = board.iter().filter(|&&c| c == Some(Player::First)).count();
        let second = board.iter().filter(|&&c| c == Some(Player::Second)).count();
        let player_just_moved = match first.checked_sub(second) {
            Some(0) => Player::Second,
            Some(1) => Player::First,
            _ => bail!("expected as many X as O or one more X, got {first} X and {second} O"),
        };
        let state = Self {
            board,
            player_just_moved,
        };
        if let Some(owner) = state
            .line_owners()
            .find(|&owner| owner != player_just_moved)
        {
            bail!("player {owner} completed a line but the game went on: {state}");
        }
        Ok(state)
    }
}

const fn mark(cell: Option<Player>) -> char {
    match cell {
        None => '.',
        Some(Player::First) => 'X',
        Some(Player::Second) => 'O',
    }
}

impl fmt::Display for GridState {
    /// Prints the rows separated by `/`, e.g. `X.O/.X./..O`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self
            .board
            .chunks(BOARD_WIDTH)
            .map(|row| row.iter().copied().map(mark).collect::<String>())
            .join("/");
        write!(f, "{rows}")
    }
}

impl fmt::Debug for GridState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.board.chunks(BOARD_WIDTH) {
            writeln!(f, "{}", row.iter().copied().map(mark).collect::<String>())?;
        }
        writeln!(f, "Player just moved: {}", self.player_just_moved)?;
        Ok(())
    }
}
