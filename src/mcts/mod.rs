//! Implements [Monte Carlo Tree Search] (MCTS) with the UCT selection policy.
//!
//! Every iteration runs four phases:
//!
//! 1. Selection: starting from the root, descend to the child with the best
//!    UCB1 score while the node is fully expanded and not terminal.
//! 2. Expansion: if the reached node has untried moves, pick one at random and
//!    add a child for it.
//! 3. Rollout: play uniformly random moves from the new node until the game
//!    ends.
//! 4. Backpropagation: record the result in the new node and all of its
//!    ancestors, each from the perspective of the player who moved into it.
//!
//! The move leading to the most visited child of the root is returned after
//! the iteration budget is exhausted.
//!
//! [Monte Carlo Tree Search]: https://en.wikipedia.org/wiki/Monte_Carlo_tree_search

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace};

use crate::environment::GameState;

pub mod tree;

pub use tree::{Node, NodeIndex, Tree};

/// Parameters of the search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Number of search iterations to perform.
    pub iterations: u32,
    /// Exploration constant multiplying the UCB1 exploration term. 1.0 gives
    /// the plain UCB1 formula.
    pub exploration: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            iterations: 1000,
            exploration: 1.0,
        }
    }
}

impl Config {
    /// Sets the number of iterations.
    #[must_use]
    pub const fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the exploration constant.
    #[must_use]
    pub const fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }
}

/// Builds a search tree from `root` by running `config.iterations` UCT
/// iterations. All randomness is drawn from `rng`, so the tree is
/// reproducible for a seeded generator.
pub fn search<S: GameState>(root: &S, config: &Config, rng: &mut impl Rng) -> Tree<S::Move> {
    let mut tree = Tree::new(root);

    for _ in 0..config.iterations {
        let mut node = Tree::<S::Move>::ROOT;
        let mut state = root.clone();

        // Selection.
        while tree[node].is_fully_expanded() && !tree[node].children().is_empty() {
            let (next_move, child) = tree.select_child(node, config.exploration);
            state.make_move(&next_move);
            node = child;
        }

        // Expansion.
        let untried = tree[node].untried_moves().choose(rng).copied();
        if let Some(next_move) = untried {
            state.make_move(&next_move);
            node = tree.expand(node, next_move, &state);
            trace!(node, %next_move, "expanded");
        }

        // Rollout.
        loop {
            let moves = state.generate_moves();
            let Some(&next_move) = moves.choose(rng) else {
                break;
            };
            state.make_move(&next_move);
        }

        tree.backpropagate(node, &state);
    }

    debug!(
        iterations = config.iterations,
        nodes = tree.len(),
        root_visits = tree[Tree::<S::Move>::ROOT].visits(),
        "search finished"
    );
    tree
}

/// Runs [`search`] and returns the move leading to the most visited child of
/// the root. Returns `None` if the root is terminal or no iterations were
/// run.
pub fn find_best_move<S: GameState>(
    root: &S,
    config: &Config,
    rng: &mut impl Rng,
) -> Option<S::Move> {
    let tree = search(root, config, rng);
    let best_move = tree.best_move();
    if let Some(best_move) = best_move {
        debug!(%best_move, "best move");
    }
    for &(next_move, child) in tree[Tree::<S::Move>::ROOT].children() {
        trace!(
            %next_move,
            visits = tree[child].visits(),
            wins = tree[child].wins(),
            "root child"
        );
    }
    best_move
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::games::GridState;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.iterations, 1000);
        assert!((config.exploration - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn builder() {
        let config = Config::default()
            .with_iterations(10)
            .with_exploration(0.5);
        assert_eq!(config.iterations, 10);
        assert!((config.exploration - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn root_is_expanded_first() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let tree = search(&GridState::new(), &Config::default().with_iterations(9), &mut rng);
        assert_eq!(tree.len(), 10);
        let root = &tree[Tree::<usize>::ROOT];
        assert_eq!(root.visits(), 9);
        assert!(root.is_fully_expanded());
        assert!(root.children().iter().all(|&(_, child)| tree[child].visits() == 1));
    }

    #[test]
    fn every_iteration_visits_root() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let tree = search(&GridState::new(), &Config::default().with_iterations(50), &mut rng);
        assert_eq!(tree[Tree::<usize>::ROOT].visits(), 50);
        assert!(tree.len() <= 51);
    }

    #[test]
    fn terminal_root() {
        let state = GridState::try_from("XXX/OO./...").expect("valid board");
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let tree = search(&state, &Config::default().with_iterations(10), &mut rng);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[Tree::<usize>::ROOT].visits(), 10);
        assert_eq!(find_best_move(&state, &Config::default(), &mut rng), None);
    }

    #[test]
    fn no_iterations() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = Config::default().with_iterations(0);
        assert_eq!(find_best_move(&GridState::new(), &config, &mut rng), None);
    }

    #[test]
    fn single_move() {
        let state = GridState::try_from("XOX/XOO/OX.").expect("valid board");
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            find_best_move(&state, &Config::default().with_iterations(5), &mut rng),
            Some(8)
        );
    }

    #[test]
    fn takes_immediate_win() {
        // X to move, the top row is one mark short.
        let state = GridState::try_from("XX./OO./...").expect("valid board");
        for seed in 0..5 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            assert_eq!(
                find_best_move(&state, &Config::default(), &mut rng),
                Some(2),
                "seed {seed}"
            );
        }
    }

    #[test]
    fn blocks_immediate_loss() {
        // O to move, X threatens the diagonal.
        let state = GridState::try_from("X.O/.X./...").expect("valid board");
        for seed in 0..5 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            assert_eq!(
                find_best_move(&state, &Config::default().with_iterations(2000), &mut rng),
                Some(8),
                "seed {seed}"
            );
        }
    }
}
