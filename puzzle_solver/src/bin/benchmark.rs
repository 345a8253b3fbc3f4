use clap::Parser;
use puzzle_solver::ball_sort::{BallSortOptions, BallSortState};
use puzzle_solver::{solve, Algorithm, CancellationToken, PuzzleState, SolveError};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Compares the search algorithms on tube-sort puzzles", long_about = None)]
struct Args {
    /// Number of seeded random puzzles added to the fixed set
    #[clap(short = 'n', long, default_value_t = 5)]
    random: usize,

    /// Seed of the first random puzzle
    #[clap(short, long, default_value_t = 0)]
    seed: u64,

    /// Colors per random puzzle
    #[clap(long, default_value_t = 5)]
    colors: u8,

    /// Container capacity of random puzzles
    #[clap(long, default_value_t = 4)]
    capacity: usize,

    /// Empty containers in random puzzles
    #[clap(long, default_value_t = 2)]
    empty: usize,

    /// Time limit per algorithm and puzzle
    #[clap(short, long, default_value_t = 10)]
    timeout_secs: u64,

    /// Beam width for beam search
    #[clap(short, long, default_value_t = puzzle_solver::ball_sort::DEFAULT_BEAM_WIDTH)]
    beam_width: usize,
}

/// Puzzles every run starts with, listed top to bottom per container.
fn fixed_puzzles() -> Vec<(&'static str, BallSortState)> {
    let puzzles: [(&str, usize, Vec<Vec<u8>>); 3] = [
        (
            "fixed-1",
            4,
            vec![vec![1, 0, 0, 0], vec![3, 1, 1, 1], vec![0, 2, 2, 2], vec![2, 3, 3, 3], vec![]],
        ),
        (
            "fixed-2",
            4,
            vec![
                vec![3, 0, 1, 4],
                vec![0, 2, 0, 4],
                vec![],
                vec![2, 3, 3, 0],
                vec![],
                vec![2, 3, 2, 1],
                vec![1, 4, 1, 4],
            ],
        ),
        (
            "fixed-3",
            4,
            vec![
                vec![],
                vec![0, 3],
                vec![0, 4, 2],
                vec![3, 1, 3],
                vec![0, 2, 0, 1],
                vec![2, 4, 2, 3],
                vec![4, 1, 4, 1],
            ],
        ),
    ];

    puzzles
        .into_iter()
        .filter_map(|(name, capacity, layout)| match BallSortState::new(layout.len(), capacity, &layout) {
            Ok(state) => Some((name, state)),
            Err(err) => {
                eprintln!("Warning: skipping {}: {}", name, err);
                None
            }
        })
        .collect()
}

#[derive(Default)]
struct Totals {
    solved: usize,
    failed: usize,
    timed_out: usize,
    moves: usize,
    elapsed: Duration,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("puzzle_solver=warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let options = BallSortOptions {
        beam_width: args.beam_width.max(1),
        ..BallSortOptions::default()
    };

    let mut puzzles: Vec<(String, BallSortState)> = fixed_puzzles()
        .into_iter()
        .map(|(name, state)| (name.to_string(), state))
        .collect();
    for offset in 0..args.random as u64 {
        let seed = args.seed + offset;
        match BallSortState::new_random_with_seed(args.colors, args.capacity, args.empty, seed) {
            Ok(state) => puzzles.push((format!("random-{}", seed), state)),
            Err(err) => eprintln!("Warning: cannot generate puzzle for seed {}: {}", seed, err),
        }
    }

    let mut totals: BTreeMap<String, Totals> = BTreeMap::new();
    println!("Starting benchmark for {} puzzles...", puzzles.len());

    for (name, puzzle) in &puzzles {
        println!("\nPuzzle {} ({} containers, capacity {})", name, puzzle.containers(), puzzle.capacity());

        for algorithm in Algorithm::ALL {
            let cancel = CancellationToken::new();
            let deadline = cancel.cancel_after(Duration::from_secs(args.timeout_secs));
            let started = Instant::now();
            let outcome = solve(algorithm, puzzle, &options, &cancel);
            let elapsed = started.elapsed();
            drop(deadline);

            let entry = totals.entry(algorithm.to_string()).or_default();
            match outcome {
                Ok(moves) => {
                    if !puzzle.apply_all(moves.iter().copied()).is_solved() {
                        eprintln!("Error: {} returned a sequence that does not solve {}", algorithm, name);
                        entry.failed += 1;
                        continue;
                    }
                    println!("  {:<14} moves: {:<6} time: {:.2?}", algorithm, moves.len(), elapsed);
                    entry.solved += 1;
                    entry.moves += moves.len();
                    entry.elapsed += elapsed;
                }
                Err(SolveError::Cancelled) => {
                    println!("  {:<14} timed out after {:.2?}", algorithm, elapsed);
                    entry.timed_out += 1;
                }
                Err(err) => {
                    println!("  {:<14} {} ({:.2?})", algorithm, err, elapsed);
                    entry.failed += 1;
                }
            }
        }
    }

    println!("\n--- Benchmark Complete ---");
    println!("Puzzles evaluated: {}", puzzles.len());
    println!("\n--- Averages over solved puzzles ---");
    for (algorithm, total) in &totals {
        if total.solved == 0 {
            println!(
                "{:<14}: no puzzle solved (failed {}, timed out {})",
                algorithm, total.failed, total.timed_out
            );
            continue;
        }
        println!(
            "{:<14}: solved {:<3} failed {:<3} timed out {:<3} avg moves {:.2}  avg time {:.2?}",
            algorithm,
            total.solved,
            total.failed,
            total.timed_out,
            total.moves as f64 / total.solved as f64,
            total.elapsed / total.solved as u32,
        );
    }
}
