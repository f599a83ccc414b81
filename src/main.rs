//! Command line front end: plays grid games, solves puzzles and benchmarks
//! the search.

use std::io;

use anyhow::Context;
use arbor::games::puzzle::{Tile, COMBO_THRESHOLD, DEFAULT_MAX_SWAPS, MAX_TILE_KINDS};
use arbor::games::{GridState, PuzzleState};
use arbor::mcts::Config;
use arbor::Engine;
use clap::{Args, Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Finds moves with Monte Carlo Tree Search.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Log filter used unless RUST_LOG is set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plays a game on the 3×3 grid between two searching players.
    Grid {
        /// Starting board, e.g. "X.O/.X./...". Empty board by default.
        #[arg(long)]
        board: Option<String>,
        /// Iterations per move for the first player.
        #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u32).range(1..))]
        first_iterations: u32,
        /// Iterations per move for the second player.
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..))]
        second_iterations: u32,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Drags tiles on a puzzle board until the swap budget is spent.
    Puzzle {
        /// Rows of tile digits, e.g. "012/120/201". Random board by default.
        #[arg(long)]
        board: Option<String>,
        /// Rows of the random board.
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u16).range(1..))]
        rows: u16,
        /// Columns of the random board.
        #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u16).range(1..))]
        columns: u16,
        /// Number of tile kinds on the random board.
        #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u8).range(3..=i64::from(MAX_TILE_KINDS)))]
        tile_kinds: Tile,
        /// Swaps allowed after selecting a tile.
        #[arg(long, default_value_t = DEFAULT_MAX_SWAPS)]
        max_swaps: u32,
        /// Combos to exceed for a non-zero result.
        #[arg(long, default_value_t = COMBO_THRESHOLD)]
        threshold: u32,
        /// Iterations per move.
        #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u32).range(1..))]
        iterations: u32,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Runs a fixed search workload and reports the speed.
    Bench,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Exploration constant of the UCB1 formula.
    #[arg(long, default_value_t = 1.0)]
    exploration: f64,
    /// Seed of the random number generator. Drawn from entropy by default.
    #[arg(long)]
    seed: Option<u64>,
    /// Print the whole search tree after each move.
    #[arg(long)]
    verbose: bool,
}

impl SearchArgs {
    fn rng(&self) -> ChaCha8Rng {
        let seed = self.seed.unwrap_or_else(|| rand::thread_rng().r#gen());
        info!(seed, "seeded random number generator");
        ChaCha8Rng::seed_from_u64(seed)
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    arbor::print_engine_info();
    arbor::print_binary_info();

    let mut output = io::stdout().lock();
    match cli.command {
        Command::Grid {
            board,
            first_iterations,
            second_iterations,
            search,
        } => {
            let state = match board {
                Some(board) => GridState::try_from(board.as_str())
                    .with_context(|| format!("parsing grid board {board:?}"))?,
                None => GridState::new(),
            };
            let config = Config::default().with_exploration(search.exploration);
            let _ = Engine::new(
                config.with_iterations(first_iterations),
                config.with_iterations(second_iterations),
                search.rng(),
            )
            .verbose(search.verbose)
            .play(state, &mut output)?;
        },
        Command::Puzzle {
            board,
            rows,
            columns,
            tile_kinds,
            max_swaps,
            threshold,
            iterations,
            search,
        } => {
            let mut rng = search.rng();
            let state = match board {
                Some(board) => PuzzleState::try_from(board.as_str())
                    .with_context(|| format!("parsing puzzle board {board:?}"))?,
                None => PuzzleState::random(rows.into(), columns.into(), tile_kinds, &mut rng),
            }
            .with_max_swaps(max_swaps)
            .with_combo_threshold(threshold);
            let config = Config::default()
                .with_iterations(iterations)
                .with_exploration(search.exploration);
            let _ = Engine::new(config, config, rng)
                .verbose(search.verbose)
                .solve(state, &mut output)?;
        },
        Command::Bench => arbor::engine::bench(&mut output)?,
    }
    Ok(())
}
