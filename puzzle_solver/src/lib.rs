//! # Puzzle Solver Library
//!
//! This library models single-player puzzles as state-space search problems
//! and finds a move sequence that turns an initial configuration into a solved
//! one.
//!
//! It is used by two binaries:
//! - `solve`: Reads a puzzle file, solves it with the chosen algorithm and
//!   prints the moves.
//! - `benchmark`: Runs every algorithm over a fixed and a seeded random puzzle
//!   set and reports move counts and timings.
//!
//! ## Modules
//! - `state`: The `PuzzleState` contract every puzzle implements.
//! - `ball_sort`: Tube-sort puzzle (`BallSortState`, `BallSortMove`, `BallSortOptions`).
//! - `sokoban`: Push-box puzzle (`SokobanState`, `Cell`, `Direction`, `SokobanOptions`).
//! - `heuristics`: Deadlock detection and distance estimate for the push-box puzzle.
//! - `solver`: Breadth-first, depth-first, best-first and beam search (`solve`, `Solver`).
//! - `cancel`: `CancellationToken` for stopping a running search.
//! - `config`: TOML configuration (`SolverConfig`) and the hot-reload `ConfigHandle`.
//! - `error`: `SolveError` and `ConfigError`.
//! - `utils`: Parsers for the puzzle file formats.

pub mod ball_sort;
pub mod cancel;
pub mod config;
pub mod error;
mod frontier;
pub mod heuristics;
pub mod sokoban;
pub mod solver;
pub mod state;
pub mod utils;

pub use cancel::CancellationToken;
pub use error::{ConfigError, SolveError};
pub use solver::{solve, Algorithm, Solver};
pub use state::PuzzleState;
