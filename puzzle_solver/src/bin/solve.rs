use clap::{Parser, Subcommand};
use puzzle_solver::config::SolverConfig;
use puzzle_solver::utils::{ball_sort_from_str, sokoban_from_str};
use puzzle_solver::{Algorithm, CancellationToken, ConfigError, PuzzleState, SolveError, Solver};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Search algorithm: bfs, dfs, astar or beam (default: from the config)
    #[clap(short, long, global = true)]
    algorithm: Option<Algorithm>,

    /// Beam width, overriding the config for the chosen puzzle
    #[clap(short, long, global = true)]
    beam_width: Option<usize>,

    /// Path to a TOML solver configuration
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    /// Cancel the search after this many seconds
    #[clap(short, long, global = true)]
    timeout_secs: Option<u64>,

    #[clap(subcommand)]
    puzzle: Puzzle,
}

#[derive(Subcommand, Debug)]
enum Puzzle {
    /// Solve a tube-sort puzzle (one container per line, balls top to bottom)
    BallSort {
        /// Path to the puzzle file
        file: PathBuf,
    },
    /// Solve a push-box puzzle (one grid row per line)
    Sokoban {
        /// Path to the puzzle file
        file: PathBuf,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Solve(#[from] SolveError),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Solve(SolveError::MalformedInput(_)) => 20,
            CliError::Solve(SolveError::NoSolutionFound) => 30,
            CliError::Solve(SolveError::Cancelled) => 130,
            CliError::Read { .. } | CliError::Config(_) => 1,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("puzzle_solver=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn read_puzzle_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn load_config(args: &Args) -> Result<SolverConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => SolverConfig::load(path)?,
        None => SolverConfig::default(),
    };
    if let Some(width) = args.beam_width {
        config = config
            .with_ball_sort_beam_width(width)
            .with_sokoban_beam_width(width);
        config.validate()?;
    }
    Ok(config)
}

fn solve_and_print<S>(
    algorithm: Algorithm,
    initial: &S,
    options: S::Options,
    cancel: &CancellationToken,
) -> Result<(), CliError>
where
    S: PuzzleState + fmt::Display,
{
    println!("Initial state:\n{}\n", initial);
    println!("Searching with {} ({:?})...\n", algorithm, options);

    let solver: Solver<S> = Solver::new(algorithm, options);
    let started = Instant::now();
    let moves = solver.solve(initial, cancel)?;

    println!("Solution found in {:.2?}:\n", started.elapsed());
    println!("Moves ({}):", moves.len());
    if moves.is_empty() {
        println!("  No moves needed.");
    } else {
        for (i, mv) in moves.iter().enumerate() {
            println!("  Move {}: {}", i + 1, mv);
        }
    }
    println!("\nFinal state:\n{}", initial.apply_all(moves));
    Ok(())
}

fn run(args: &Args) -> Result<(), CliError> {
    let config = load_config(args)?;
    let algorithm = args.algorithm.unwrap_or(config.algorithm);

    let cancel = CancellationToken::new();
    let _deadline = args
        .timeout_secs
        .map(|secs| cancel.cancel_after(Duration::from_secs(secs)));

    match &args.puzzle {
        Puzzle::BallSort { file } => {
            let state = ball_sort_from_str(&read_puzzle_file(file)?)?;
            println!("Loaded tube-sort puzzle from {}\n", file.display());
            solve_and_print(algorithm, &state, config.ball_sort, &cancel)
        }
        Puzzle::Sokoban { file } => {
            let state = sokoban_from_str(&read_puzzle_file(file)?)?;
            println!("Loaded push-box puzzle from {}\n", file.display());
            solve_and_print(algorithm, &state, config.sokoban, &cancel)
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}
