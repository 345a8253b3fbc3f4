//! Search algorithms over any [`PuzzleState`].
//!
//! All four algorithms share one expansion loop:
//! 1. Pop the next node from the frontier (the order depends on the algorithm).
//! 2. Apply every valid move to get candidate states.
//! 3. A solved candidate ends the search; its path is rebuilt through the parent
//!    links. Otherwise a candidate whose hash is new is marked visited and pushed.
//!
//! Beam search keeps the same loop but rebuilds its frontier every round from
//! the `beam_width` best-scoring children, trading completeness for bounded memory.
//!
//! The visited set, frontier and node tree belong to a single call, so separate
//! threads may solve concurrently.
use crate::cancel::CancellationToken;
use crate::config::ConfigHandle;
use crate::error::{Result, SolveError};
use crate::frontier::{FifoFrontier, Frontier, LifoFrontier, PriorityFrontier};
use crate::state::{PuzzleState, SearchOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Expansions between two progress events.
const PROGRESS_INTERVAL: u64 = 10_000;

/// Search strategy used by [`solve`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// FIFO frontier. Returns a solution with the fewest moves.
    #[serde(alias = "bfs")]
    BreadthFirst,
    /// LIFO frontier. Finds a solution quickly on narrow spaces, rarely a short one.
    #[serde(alias = "dfs")]
    DepthFirst,
    /// Frontier ordered by heuristic, lowest first.
    #[serde(alias = "astar", alias = "a-star")]
    BestFirst,
    /// Keeps the `beam_width` best children of each round.
    #[default]
    #[serde(alias = "beam-search")]
    Beam,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::BreadthFirst,
        Algorithm::DepthFirst,
        Algorithm::BestFirst,
        Algorithm::Beam,
    ];

    /// Returns `true` if the algorithm ranks candidates by heuristic.
    fn is_informed(self) -> bool {
        matches!(self, Algorithm::BestFirst | Algorithm::Beam)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::BreadthFirst => "breadth-first",
            Algorithm::DepthFirst => "depth-first",
            Algorithm::BestFirst => "best-first",
            Algorithm::Beam => "beam",
        };
        f.pad(name)
    }
}

impl FromStr for Algorithm {
    type Err = String;

    /// Accepts the display names plus the short forms `bfs`, `dfs`, `astar`.
    ///
    /// ```
    /// use puzzle_solver::solver::Algorithm;
    /// assert_eq!("BFS".parse::<Algorithm>(), Ok(Algorithm::BreadthFirst));
    /// assert_eq!("a-star".parse::<Algorithm>(), Ok(Algorithm::BestFirst));
    /// assert!("greedy".parse::<Algorithm>().is_err());
    /// ```
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bfs" | "breadth-first" => Ok(Algorithm::BreadthFirst),
            "dfs" | "depth-first" => Ok(Algorithm::DepthFirst),
            "astar" | "a-star" | "best-first" => Ok(Algorithm::BestFirst),
            "beam" | "beam-search" => Ok(Algorithm::Beam),
            other => Err(format!(
                "unknown algorithm '{}' (expected bfs, dfs, astar or beam)",
                other
            )),
        }
    }
}

/// A state together with the move that produced it and a link to its parent.
///
/// Children share their parent through `Rc`; a node lives as long as some
/// frontier entry or solution path still reaches it.
struct SearchNode<S: PuzzleState> {
    state: S,
    mv: Option<S::Move>,
    parent: Option<Rc<SearchNode<S>>>,
}

impl<S: PuzzleState> SearchNode<S> {
    fn root(state: S) -> Self {
        SearchNode {
            state,
            mv: None,
            parent: None,
        }
    }

    fn child(parent: &Rc<SearchNode<S>>, mv: S::Move, state: S) -> Self {
        SearchNode {
            state,
            mv: Some(mv),
            parent: Some(Rc::clone(parent)),
        }
    }

    /// Moves from the root to this node, in playing order.
    fn path(&self) -> Vec<S::Move> {
        let mut moves = Vec::new();
        let mut current = Some(self);
        while let Some(node) = current {
            moves.extend(node.mv);
            current = node.parent.as_deref();
        }
        moves.reverse();
        moves
    }
}

impl<S: PuzzleState> Drop for SearchNode<S> {
    // Unlink the ancestor chain iteratively; the default recursive drop would
    // overflow the stack on long depth-first paths.
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(node) = parent {
            match Rc::try_unwrap(node) {
                Ok(mut node) => parent = node.parent.take(),
                Err(_) => break,
            }
        }
    }
}

/// Counters reported in the log events of one search.
#[derive(Clone, Copy, Debug, Default)]
struct SearchStats {
    expanded: u64,
    generated: u64,
}

/// Per-call search context: options snapshot, cancellation and the visited set.
struct Search<'a, S: PuzzleState> {
    options: &'a S::Options,
    cancel: &'a CancellationToken,
    visited: HashSet<u64>,
    stats: SearchStats,
}

type NodeRef<S> = Rc<SearchNode<S>>;

impl<'a, S: PuzzleState> Search<'a, S> {
    fn new(options: &'a S::Options, cancel: &'a CancellationToken) -> Self {
        Search {
            options,
            cancel,
            visited: HashSet::new(),
            stats: SearchStats::default(),
        }
    }

    fn run(&mut self, algorithm: Algorithm, initial: &S) -> Result<Vec<S::Move>> {
        if initial.is_solved() {
            return Ok(initial.finishing_moves(self.options));
        }

        self.visited.insert(initial.state_hash());
        let root = Rc::new(SearchNode::root(initial.clone()));
        let scored = algorithm.is_informed();
        let goal = match algorithm {
            Algorithm::BreadthFirst => self.exhaustive(root, FifoFrontier::new(), scored),
            Algorithm::DepthFirst => self.exhaustive(root, LifoFrontier::new(), scored),
            Algorithm::BestFirst => self.exhaustive(root, PriorityFrontier::new(), scored),
            Algorithm::Beam => self.beam(root),
        }?;

        let mut moves = goal.path();
        moves.extend(goal.state.finishing_moves(self.options));
        Ok(moves)
    }

    /// Runs the expansion loop until the frontier is empty.
    fn exhaustive<F>(&mut self, root: NodeRef<S>, mut frontier: F, scored: bool) -> Result<NodeRef<S>>
    where
        F: Frontier<NodeRef<S>>,
    {
        frontier.push(root, 0.0);
        while let Some(node) = frontier.pop() {
            self.checkpoint(frontier.len())?;
            if let Some(goal) = self.expand(&node, scored, |child, score| frontier.push(child, score)) {
                return Ok(goal);
            }
        }
        Err(SolveError::NoSolutionFound)
    }

    fn beam(&mut self, root: NodeRef<S>) -> Result<NodeRef<S>> {
        let width = self.options.beam_width().max(1);
        let mut beam = vec![root];
        let mut round = 0u64;

        while !beam.is_empty() {
            round += 1;
            let mut candidates: PriorityFrontier<NodeRef<S>> = PriorityFrontier::new();
            for node in &beam {
                self.checkpoint(candidates.len())?;
                if let Some(goal) = self.expand(node, true, |child, score| candidates.push(child, score)) {
                    return Ok(goal);
                }
            }
            debug!(
                event = "beam_round",
                round,
                expanded = beam.len(),
                candidates = candidates.len(),
                width,
            );
            beam = candidates.drain_best(width);
        }
        Err(SolveError::NoSolutionFound)
    }

    /// Called once per expansion; the only point where cancellation is observed.
    fn checkpoint(&mut self, frontier_len: usize) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(SolveError::Cancelled);
        }
        self.stats.expanded += 1;
        trace!(event = "expand", frontier = frontier_len, visited = self.visited.len());
        if self.stats.expanded % PROGRESS_INTERVAL == 0 {
            debug!(
                event = "progress",
                expanded = self.stats.expanded,
                generated = self.stats.generated,
                visited = self.visited.len(),
                frontier = frontier_len,
            );
        }
        Ok(())
    }

    /// Generates the children of `node`.
    ///
    /// Returns the first solved child. Other unseen children are handed to `push`
    /// with their heuristic score (or `0.0` when `scored` is false); scored children
    /// that can never reach the goal are dropped.
    fn expand(
        &mut self,
        node: &NodeRef<S>,
        scored: bool,
        mut push: impl FnMut(NodeRef<S>, f64),
    ) -> Option<NodeRef<S>> {
        for mv in node.state.valid_moves() {
            let state = node.state.apply(mv);
            self.stats.generated += 1;

            if state.is_solved() {
                return Some(Rc::new(SearchNode::child(node, mv, state)));
            }
            if !self.visited.insert(state.state_hash()) {
                continue;
            }

            let score = if scored { state.heuristic(self.options) } else { 0.0 };
            if score.is_infinite() {
                continue;
            }
            push(Rc::new(SearchNode::child(node, mv, state)), score);
        }
        None
    }
}

/// Solves `initial` with `algorithm`.
///
/// # Arguments
/// * `algorithm` - The search strategy.
/// * `initial` - The starting state. It is never modified.
/// * `options` - Tunables for this call; they stay fixed until it returns.
/// * `cancel` - Checked once per expansion.
///
/// # Returns
/// * `Ok(moves)` - Moves that turn `initial` into a solved state, followed by the
///   puzzle's finishing moves. Empty if `initial` is already solved and the puzzle
///   adds no finishing moves.
/// * `Err(SolveError::NoSolutionFound)` - The frontier ran out.
/// * `Err(SolveError::Cancelled)` - `cancel` fired before a solution was found.
///
/// # Examples
///
/// ```
/// use puzzle_solver::ball_sort::{BallSortOptions, BallSortState};
/// use puzzle_solver::cancel::CancellationToken;
/// use puzzle_solver::solver::{solve, Algorithm};
/// use puzzle_solver::state::PuzzleState;
///
/// let start = BallSortState::new(3, 2, &[vec![1u8, 0], vec![0, 1], vec![]]).unwrap();
/// let moves = solve(Algorithm::BreadthFirst, &start, &BallSortOptions::default(), &CancellationToken::new()).unwrap();
/// assert_eq!(moves.len(), 3);
/// assert!(start.apply_all(moves).is_solved());
/// ```
pub fn solve<S: PuzzleState>(
    algorithm: Algorithm,
    initial: &S,
    options: &S::Options,
    cancel: &CancellationToken,
) -> Result<Vec<S::Move>> {
    let started = Instant::now();
    info!(
        event = "solve_start",
        algorithm = %algorithm,
        beam_width = options.beam_width(),
    );

    let mut search = Search::new(options, cancel);
    let outcome = search.run(algorithm, initial);
    let duration_ms = started.elapsed().as_millis() as u64;
    let stats = search.stats;
    let visited = search.visited.len();

    match &outcome {
        Ok(moves) => info!(
            event = "solve_end",
            algorithm = %algorithm,
            moves = moves.len(),
            expanded = stats.expanded,
            generated = stats.generated,
            visited,
            duration_ms,
        ),
        Err(SolveError::Cancelled) => warn!(
            event = "solve_cancelled",
            algorithm = %algorithm,
            expanded = stats.expanded,
            visited,
            duration_ms,
        ),
        Err(err) => info!(
            event = "solve_end",
            algorithm = %algorithm,
            error = %err,
            expanded = stats.expanded,
            generated = stats.generated,
            visited,
            duration_ms,
        ),
    }
    outcome
}

/// An algorithm bound to a hot-reloadable options value.
///
/// Each [`solve`](Self::solve) call reads one snapshot of the options when it
/// starts. Replacing the options through the handle affects later calls only.
pub struct Solver<S: PuzzleState> {
    algorithm: Algorithm,
    options: ConfigHandle<S::Options>,
}

impl<S: PuzzleState> Clone for Solver<S> {
    fn clone(&self) -> Self {
        Solver {
            algorithm: self.algorithm,
            options: self.options.clone(),
        }
    }
}

impl<S: PuzzleState> Solver<S> {
    pub fn new(algorithm: Algorithm, options: S::Options) -> Self {
        Self::with_handle(algorithm, ConfigHandle::new(options))
    }

    /// Creates a solver reading its options from a shared handle.
    pub fn with_handle(algorithm: Algorithm, options: ConfigHandle<S::Options>) -> Self {
        Solver { algorithm, options }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The handle to replace options through.
    pub fn options(&self) -> &ConfigHandle<S::Options> {
        &self.options
    }

    pub fn solve(&self, initial: &S, cancel: &CancellationToken) -> Result<Vec<S::Move>> {
        let options = self.options.snapshot();
        solve(self.algorithm, initial, &options, cancel)
    }
}
