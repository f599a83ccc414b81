use arbor::environment::GameState;
use arbor::games::{GridState, PuzzleState};
use arbor::mcts::{self, Config, Tree};
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn search<S: GameState>(state: &S, iterations: u32, seed: u64) -> Tree<S::Move> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    mcts::search(state, &Config::default().with_iterations(iterations), &mut rng)
}

/// Checks the statistics of every node against its children.
fn check_tree<M>(tree: &Tree<M>, iterations: u32)
where
    M: Copy + PartialEq + std::fmt::Debug + std::fmt::Display,
{
    let root = &tree[Tree::<M>::ROOT];
    assert_eq!(root.visits(), iterations);
    for (index, node) in tree.nodes().iter().enumerate() {
        let child_visits: u32 = node.children().iter().map(|&(_, child)| tree[child].visits()).sum();
        if index == Tree::<M>::ROOT {
            if !node.is_terminal() {
                assert_eq!(node.visits(), child_visits);
            }
        } else if node.is_terminal() {
            // Terminal leaves are visited again on every selection reaching them.
            assert!(node.visits() >= 1);
        } else {
            assert_eq!(node.visits(), child_visits + 1, "node {index}: {node}");
        }
        assert!(node.wins() >= 0.0);
        assert!(node.wins() <= f64::from(node.visits()));
        for &(next_move, child) in node.children() {
            assert_eq!(tree[child].parent(), Some(index));
            assert_eq!(tree[child].last_move(), Some(next_move));
            assert!(!node.untried_moves().contains(&next_move));
        }
    }
}

#[test]
fn grid_tree_statistics() {
    for iterations in [1, 10, 100, 1000] {
        let tree = search(&GridState::new(), iterations, 0);
        check_tree(&tree, iterations);
        assert!(tree.len() <= iterations as usize + 1);
    }
}

#[test]
fn first_move_on_empty_grid() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let best_move = mcts::find_best_move(&GridState::new(), &Config::default(), &mut rng);
    assert!(best_move.is_some_and(|square| square < 9), "{best_move:?}");
}

#[test]
fn puzzle_tree_statistics() {
    let state = PuzzleState::random(4, 5, 5, &mut ChaCha8Rng::seed_from_u64(1)).with_max_swaps(4);
    let tree = search(&state, 500, 0);
    check_tree(&tree, 500);
    // The first layer selects a cell, the second layer swaps it.
    assert_eq!(tree[Tree::<arbor::games::puzzle::PuzzleMove>::ROOT].children().len(), 20);
}

#[test]
fn same_seed_same_tree() {
    let state = GridState::try_from("X../.O./...").expect("valid board");
    assert_eq!(search(&state, 300, 9).to_string(), search(&state, 300, 9).to_string());

    let puzzle = PuzzleState::try_from("012/120/201").expect("valid board");
    assert_eq!(search(&puzzle, 300, 9).to_string(), search(&puzzle, 300, 9).to_string());
}

#[test]
fn different_seeds_explore_differently() {
    let state = GridState::new();
    let trees = (0..4).map(|seed| search(&state, 50, seed).to_string()).collect::<Vec<_>>();
    assert!(trees.iter().any(|tree| tree != &trees[0]));
}

#[test]
fn self_play_terminates() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let strong = Config::default().with_iterations(500);
    let weak = Config::default().with_iterations(20);
    let mut state = GridState::new();
    let mut plies = 0;
    loop {
        let config = if plies % 2 == 0 { &strong } else { &weak };
        let Some(best_move) = mcts::find_best_move(&state, config, &mut rng) else {
            break;
        };
        assert!(state.generate_moves().contains(&best_move));
        state.make_move(&best_move);
        plies += 1;
    }
    assert!(state.is_terminal());
    assert!((5..=9).contains(&plies));
}
