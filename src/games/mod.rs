//! Concrete [`crate::environment::GameState`] implementations.

pub mod grid;
pub mod puzzle;

pub use grid::GridState;
pub use puzzle::PuzzleState;
