//! Monte Carlo Tree Search with UCT for two-player zero-sum games with perfect
//! information.
//!
//! The search in [`mcts`] works with any game implementing
//! [`environment::GameState`]. Two games come with the crate: a 3×3
//! line-completion game ([`games::GridState`]) and a tile-dragging puzzle
//! ([`games::PuzzleState`]). [`Engine`] plays them from start to finish.

#![warn(missing_docs, variant_size_differences)]
// Rustdoc lints.
#![warn(
    rustdoc::private_doc_tests,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls
)]

pub mod engine;
pub mod environment;
pub mod games;
pub mod mcts;

pub use engine::Engine;
use shadow_rs::shadow;

shadow!(build);

/// Returns the full version that can be used to identify how the binary was
/// built in the first place.
fn engine_version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}

/// Prints the version on startup. Goes to stderr so that game transcripts on
/// stdout stay clean.
pub fn print_engine_info() {
    eprintln!("Arbor {}", engine_version());
}

/// Prints the build type, target and whether the build is clean.
pub fn print_binary_info() {
    eprintln!("Release build: {}", !shadow_rs::is_debug());
    eprintln!("Target: {}", build::BUILD_TARGET);
    if !shadow_rs::git_clean() {
        eprintln!("Warning: built with uncommitted changes");
    }
}
