//! Instruction counts of 1000-iteration searches on both games, to compare
//! against the wall-clock numbers in `time.rs`.

use arbor::games::{GridState, PuzzleState};
use arbor::mcts::{self, Config};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn grid_search() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let config = Config::default().with_iterations(1000);
    let _ = iai::black_box(mcts::search(&GridState::new(), &config, &mut rng));
}

fn puzzle_search() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let state = PuzzleState::random(5, 6, 6, &mut rng).with_max_swaps(6);
    let config = Config::default().with_iterations(1000);
    let _ = iai::black_box(mcts::search(&state, &config, &mut rng));
}

iai::main!(grid_search, puzzle_search);
