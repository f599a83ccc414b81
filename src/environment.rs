//! Interface between the search and the game rules. Any deterministic,
//! perfect-information, two-player, zero-sum turn-based game can be searched
//! once it implements [`GameState`].

use std::fmt;
use std::ops::{Deref, Not};

/// Players alternate turns: [`Player::First`] has the first move in a fresh
/// game.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    First = 1,
    Second = 2,
}

impl Not for Player {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// A self-contained position of the game together with the bookkeeping of
/// whose turn has just completed.
///
/// The search clones the root state for every iteration and mutates the
/// clones, so [`Clone`] has to produce an independent deep copy.
///
/// Calling [`GameState::make_move`] with a move that is not in
/// [`GameState::generate_moves`] or [`GameState::result`] on a position that
/// is not terminal is a programming error: implementations panic instead of
/// recovering.
pub trait GameState: Clone {
    /// Edge label of the search tree.
    type Move: Copy + PartialEq + fmt::Debug + fmt::Display;
    /// Container returned by the move generator. Fixed-capacity containers
    /// avoid allocations in the rollouts.
    type MoveList: Deref<Target = [Self::Move]>;

    /// The player whose turn has just completed. At the root of a fresh game
    /// this is [`Player::Second`], so that [`Player::First`] moves next.
    fn player_just_moved(&self) -> Player;

    /// Applies a legal move in place and hands the turn to the other player.
    ///
    /// # Panics
    ///
    /// Panics if `next_move` is not legal in the current position.
    fn make_move(&mut self, next_move: &Self::Move);

    /// Returns all legal moves in a deterministic order. An empty list means
    /// the position is terminal.
    fn generate_moves(&self) -> Self::MoveList;

    /// Returns the result of a terminal position from the perspective of
    /// `player`: 1.0 for a win, 0.0 for a loss and 0.5 for a draw. Puzzle
    /// variants may return anything in between.
    ///
    /// # Panics
    ///
    /// Panics if the position is not terminal.
    fn result(&self, player: Player) -> f64;

    /// Returns `true` if no legal moves are left.
    fn is_terminal(&self) -> bool {
        self.generate_moves().is_empty()
    }
}

/// Marks games where one player's win is the other's loss: the results of a
/// terminal position for both players add up to 1.0. Puzzles that share one
/// score between the players do not qualify.
pub trait ZeroSum: GameState {}
