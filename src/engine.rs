//! The engine puts all pieces together: it plays full games between two
//! searching players with independent iteration budgets, drags the tiles of a
//! puzzle board until the swap budget is spent and runs a fixed search
//! workload for performance measurements.
//!
//! All human-readable output is written to the provided stream.

use std::fmt;
use std::io::Write;
use std::time::Instant;

use anyhow::bail;
use itertools::Itertools;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::environment::{GameState, Player, ZeroSum};
use crate::games::puzzle::PuzzleMove;
use crate::games::{GridState, PuzzleState};
use crate::mcts::{self, Config, Tree};

/// Final result of a two-player game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The given player won.
    Win(Player),
    /// Nobody won.
    Draw,
}

impl Outcome {
    /// Interprets the `result` of a terminal position from the perspective of
    /// `player`.
    #[must_use]
    pub fn from_result(player: Player, result: f64) -> Self {
        if (result - 1.0).abs() < f64::EPSILON {
            Self::Win(player)
        } else if result.abs() < f64::EPSILON {
            Self::Win(!player)
        } else {
            Self::Draw
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Win(player) => write!(f, "Player {player} wins!"),
            Self::Draw => write!(f, "Nobody wins!"),
        }
    }
}

/// Moves played on a puzzle board and what they achieved.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    /// Selection followed by the swaps, in the order they were played.
    pub moves: Vec<PuzzleMove>,
    /// Combos of the final board.
    pub combos: u32,
    /// Result of the final board.
    pub result: f64,
}

/// Drives searches over whole games, owning the random number generator all
/// searches draw from.
pub struct Engine<R: Rng> {
    first: Config,
    second: Config,
    verbose: bool,
    rng: R,
}

impl<R: Rng> Engine<R> {
    /// Creates an engine where each player searches with its own config.
    #[must_use]
    pub const fn new(first: Config, second: Config, rng: R) -> Self {
        Self {
            first,
            second,
            verbose: false,
            rng,
        }
    }

    /// Prints the whole search tree after each search instead of the root's
    /// children only.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    const fn config(&self, player: Player) -> &Config {
        match player {
            Player::First => &self.first,
            Player::Second => &self.second,
        }
    }

    fn report<M>(&self, tree: &Tree<M>, output: &mut impl Write) -> anyhow::Result<()>
    where
        M: Copy + PartialEq + fmt::Display,
    {
        if self.verbose {
            write!(output, "{tree}")?;
        } else {
            write!(output, "{}", tree.root_children())?;
        }
        Ok(())
    }

    /// Plays `state` until the end, letting the player to move search with
    /// its config each turn. Only zero-sum games have a winner to report,
    /// puzzles are driven by [`Engine::solve`].
    ///
    /// # Errors
    ///
    /// Fails if writing to `output` fails or the search does not produce a
    /// move.
    pub fn play<S>(&mut self, mut state: S, output: &mut impl Write) -> anyhow::Result<Outcome>
    where
        S: ZeroSum + fmt::Debug,
    {
        while !state.is_terminal() {
            writeln!(output, "{state:?}")?;
            let player = !state.player_just_moved();
            let config = *self.config(player);
            let tree = mcts::search(&state, &config, &mut self.rng);
            self.report(&tree, output)?;
            let Some(best_move) = tree.best_move() else {
                bail!("player {player} found no move after {} iterations", config.iterations);
            };
            writeln!(output, "Best move: {best_move}")?;
            state.make_move(&best_move);
        }
        writeln!(output, "{state:?}")?;
        let last = state.player_just_moved();
        let outcome = Outcome::from_result(last, state.result(last));
        writeln!(output, "{outcome}")?;
        info!(%outcome, "game over");
        Ok(outcome)
    }

    /// Searches with the first player's config and applies the best move
    /// until the puzzle is resolved.
    ///
    /// # Errors
    ///
    /// Fails if writing to `output` fails or the search does not produce a
    /// move.
    pub fn solve(
        &mut self,
        mut state: PuzzleState,
        output: &mut impl Write,
    ) -> anyhow::Result<Route> {
        let config = self.first;
        let mut moves = Vec::new();
        while !state.is_terminal() {
            writeln!(output, "{state:?}")?;
            let tree = mcts::search(&state, &config, &mut self.rng);
            self.report(&tree, output)?;
            let Some(best_move) = tree.best_move() else {
                bail!("found no move after {} iterations", config.iterations);
            };
            writeln!(output, "Best move: {best_move}")?;
            state.make_move(&best_move);
            moves.push(best_move);
        }
        writeln!(output, "{state:?}")?;
        let route = Route {
            combos: state.combos(),
            result: state.result(state.player_just_moved()),
            moves,
        };
        writeln!(output, "Route: {}", route.moves.iter().join(", "))?;
        writeln!(output, "Combos: {}", route.combos)?;
        info!(combos = route.combos, swaps = state.depth(), "puzzle resolved");
        Ok(route)
    }
}

/// Runs searches on a small set of positions to provide an estimate of the
/// engine's performance and writes `<nodes> nodes <nps> nps`.
///
/// # Errors
///
/// Fails if writing to `output` fails.
pub fn bench(output: &mut impl Write) -> anyhow::Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let config = Config::default().with_iterations(2000);
    let timer = Instant::now();
    let mut total_nodes = 0;

    for board in [".../.../...", "X.O/.X./...", "XX./OO./..."] {
        let state = GridState::try_from(board)?;
        total_nodes += mcts::search(&state, &config, &mut rng).len();
    }
    let puzzle = PuzzleState::random(5, 6, 6, &mut rng).with_max_swaps(6);
    total_nodes += mcts::search(&puzzle, &config, &mut rng).len();

    let elapsed = timer.elapsed();
    writeln!(
        output,
        "{} nodes {} nps",
        total_nodes,
        (total_nodes as f64 / elapsed.as_secs_f64()) as u64,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn engine(seed: u64) -> Engine<ChaCha8Rng> {
        Engine::new(
            Config::default().with_iterations(200),
            Config::default().with_iterations(50),
            ChaCha8Rng::seed_from_u64(seed),
        )
    }

    #[test]
    fn outcome() {
        assert_eq!(Outcome::from_result(Player::First, 1.0), Outcome::Win(Player::First));
        assert_eq!(Outcome::from_result(Player::First, 0.0), Outcome::Win(Player::Second));
        assert_eq!(Outcome::from_result(Player::Second, 0.5), Outcome::Draw);
        assert_eq!(Outcome::Win(Player::Second).to_string(), "Player 2 wins!");
        assert_eq!(Outcome::Draw.to_string(), "Nobody wins!");
    }

    #[test]
    fn play_grid_game() {
        let mut output = Vec::new();
        let outcome = engine(7)
            .play(GridState::new(), &mut output)
            .expect("writing to a vector");
        let transcript = String::from_utf8(output).expect("valid UTF-8");
        assert!(transcript.ends_with(&format!("{outcome}\n")));
        let moves = transcript.matches("Best move: ").count();
        assert!((5..=9).contains(&moves), "{moves} moves:\n{transcript}");
    }

    #[test]
    fn games_are_reproducible() {
        let mut first = Vec::new();
        let mut second = Vec::new();
        let _ = engine(3).play(GridState::new(), &mut first).expect("writing to a vector");
        let _ = engine(3).play(GridState::new(), &mut second).expect("writing to a vector");
        assert_eq!(String::from_utf8(first), String::from_utf8(second));
    }

    #[test]
    fn finished_game() {
        let mut output = Vec::new();
        let state = GridState::try_from("XXX/OO./...").expect("valid board");
        let outcome = engine(0).play(state, &mut output).expect("writing to a vector");
        assert_eq!(outcome, Outcome::Win(Player::First));
        assert_eq!(
            String::from_utf8(output).expect("valid UTF-8"),
            "XXX\nOO.\n...\nPlayer just moved: 1\nPlayer 1 wins!\n"
        );
    }

    #[test]
    fn winning_move_is_played() {
        let mut output = Vec::new();
        let state = GridState::try_from("XX./OO./...").expect("valid board");
        let outcome = engine(0).play(state, &mut output).expect("writing to a vector");
        assert_eq!(outcome, Outcome::Win(Player::First));
        let transcript = String::from_utf8(output).expect("valid UTF-8");
        assert!(transcript.contains("Best move: 2\n"));
        assert_eq!(transcript.matches("Best move: ").count(), 1);
    }

    #[test]
    fn verbose_prints_tree() {
        let mut output = Vec::new();
        let state = GridState::try_from("XOX/XOO/OX.").expect("valid board");
        let _ = engine(0)
            .verbose(true)
            .play(state, &mut output)
            .expect("writing to a vector");
        let transcript = String::from_utf8(output).expect("valid UTF-8");
        assert!(transcript.contains("[M:None W/V:"));
        assert!(transcript.contains("| [M:8 W/V:"));
    }

    #[test]
    fn solve_puzzle() {
        let state = PuzzleState::try_from("012345/123450/234501/345012/450123")
            .expect("valid board")
            .with_max_swaps(3);
        let mut output = Vec::new();
        let route = engine(11).solve(state, &mut output).expect("writing to a vector");
        assert_eq!(route.moves.len(), 4);
        assert!(matches!(route.moves[0], PuzzleMove::Select(_)));
        assert!(route.moves[1..]
            .iter()
            .all(|m| matches!(m, PuzzleMove::Swap(_))));
        assert!((0.0..=1.0).contains(&route.result));
        let transcript = String::from_utf8(output).expect("valid UTF-8");
        assert!(transcript.contains(&format!("Combos: {}\n", route.combos)));
    }

    #[test]
    fn bench_output() {
        let mut output = Vec::new();
        bench(&mut output).expect("writing to a vector");
        let line = String::from_utf8(output).expect("valid UTF-8");
        let parts = line.split_whitespace().collect::<Vec<_>>();
        assert_eq!(parts.len(), 4, "{line}");
        assert_eq!(parts[1], "nodes");
        assert_eq!(parts[3], "nps");
        assert!(parts[0].parse::<u64>().is_ok());
    }
}
