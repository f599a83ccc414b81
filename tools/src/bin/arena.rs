//! Plays many grid games between two iteration budgets in parallel and tallies
//! the outcomes.

use std::io;

use arbor::engine::{Engine, Outcome};
use arbor::environment::Player;
use arbor::games::GridState;
use arbor::mcts::Config;
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of games to play.
    #[arg(long, default_value_t = 100)]
    games: u64,
    /// Iterations per move for the first player.
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u32).range(1..))]
    first_iterations: u32,
    /// Iterations per move for the second player.
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..))]
    second_iterations: u32,
    /// Exploration constant of the UCB1 formula.
    #[arg(long, default_value_t = 1.0)]
    exploration: f64,
    /// Game `i` is seeded with `seed + i`.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Clone, Copy, Debug, Default)]
struct Tally {
    first: u64,
    second: u64,
    draws: u64,
}

impl Tally {
    fn record(mut self, outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win(Player::First) => self.first += 1,
            Outcome::Win(Player::Second) => self.second += 1,
            Outcome::Draw => self.draws += 1,
        }
        self
    }

    fn merge(self, other: Self) -> Self {
        Self {
            first: self.first + other.first,
            second: self.second + other.second,
            draws: self.draws + other.draws,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::default().with_exploration(args.exploration);
    let first = config.with_iterations(args.first_iterations);
    let second = config.with_iterations(args.second_iterations);

    let tally = (0..args.games)
        .into_par_iter()
        .map(|game| {
            let rng = ChaCha8Rng::seed_from_u64(args.seed.wrapping_add(game));
            Engine::new(first, second, rng).play(GridState::new(), &mut io::sink())
        })
        .try_fold(Tally::default, |tally, outcome| {
            outcome.map(|outcome| tally.record(outcome))
        })
        .try_reduce(Tally::default, |a, b| Ok(a.merge(b)))?;

    println!(
        "{} games: player 1 won {}, player 2 won {}, {} draws",
        args.games, tally.first, tally.second, tally.draws
    );
    Ok(())
}
