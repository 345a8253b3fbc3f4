//! Tube-sort ("ball sort") puzzle state.
//!
//! This module defines:
//! - `BallSortMove`: moves the top ball of one container onto another.
//! - `BallSortOptions`: tunables for the search and the finishing moves.
//! - `BallSortState`: an immutable snapshot of every container.
//!
//! Containers are stored back to back in one flat buffer. Inside a container,
//! slot `0` is the top and slot `capacity - 1` the bottom; balls always sit in
//! the bottom-most slots and free slots hold [`EMPTY`].
use crate::error::{Result, SolveError};
use crate::state::{layout_hash, PuzzleState, SearchOptions};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel stored in free slots. It is never a valid ball color.
pub const EMPTY: u8 = u8::MAX;

/// Default number of candidates kept per beam search round.
pub const DEFAULT_BEAM_WIDTH: usize = 250;

/// Moves the top ball of container `from` onto container `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BallSortMove {
    pub from: usize,
    pub to: usize,
}

impl BallSortMove {
    pub fn new(from: usize, to: usize) -> Self {
        BallSortMove { from, to }
    }
}

impl fmt::Display for BallSortMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Options for solving tube-sort puzzles.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BallSortOptions {
    /// Candidates kept after each beam search round.
    pub beam_width: usize,
    /// After the goal is reached, append moves that place the sorted containers
    /// in ascending color order with the empty containers last.
    pub arrange_by_color: bool,
}

impl Default for BallSortOptions {
    fn default() -> Self {
        BallSortOptions {
            beam_width: DEFAULT_BEAM_WIDTH,
            arrange_by_color: false,
        }
    }
}

impl SearchOptions for BallSortOptions {
    fn beam_width(&self) -> usize {
        self.beam_width
    }
}

/// Immutable snapshot of a tube-sort board.
///
/// # Examples
/// ```
/// use puzzle_solver::ball_sort::{BallSortMove, BallSortState};
/// use puzzle_solver::state::PuzzleState;
///
/// let state = BallSortState::new(3, 2, &[vec![0u8], vec![1, 0], vec![1]]).unwrap();
/// let next = state.apply(BallSortMove::new(1, 2));
/// assert_eq!(next.items(2), vec![1, 1]);
/// assert_eq!(state.items(2), vec![1]); // the receiver is unchanged
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BallSortState {
    containers: usize,
    capacity: usize,
    layout: Vec<u8>,
}

impl BallSortState {
    /// Builds a state from per-container ball lists.
    ///
    /// # Arguments
    /// * `containers`: Number of containers; must equal `layout.len()`.
    /// * `capacity`: Slots per container; must be at least 1.
    /// * `layout`: For each container, its balls listed **top to bottom**. An empty
    ///   list is an empty container.
    ///
    /// # Returns
    /// * `Err(SolveError::MalformedInput)` if the dimensions disagree, a container
    ///   holds more than `capacity` balls, or a ball uses the [`EMPTY`] value.
    pub fn new<L: AsRef<[u8]>>(containers: usize, capacity: usize, layout: &[L]) -> Result<Self> {
        if containers == 0 {
            return Err(SolveError::malformed("at least one container is required"));
        }
        if capacity == 0 {
            return Err(SolveError::malformed("container capacity must be at least 1"));
        }
        if layout.len() != containers {
            return Err(SolveError::malformed(format!(
                "expected {} containers, found {}",
                containers,
                layout.len()
            )));
        }

        let mut flat = vec![EMPTY; containers * capacity];
        for (index, balls) in layout.iter().enumerate() {
            let balls = balls.as_ref();
            if balls.len() > capacity {
                return Err(SolveError::malformed(format!(
                    "container {} holds {} balls but capacity is {}",
                    index,
                    balls.len(),
                    capacity
                )));
            }
            if balls.contains(&EMPTY) {
                return Err(SolveError::malformed(format!(
                    "container {} uses reserved value {}",
                    index, EMPTY
                )));
            }
            let offset = index * capacity + (capacity - balls.len());
            flat[offset..offset + balls.len()].copy_from_slice(balls);
        }

        Ok(BallSortState {
            containers,
            capacity,
            layout: flat,
        })
    }

    /// Creates a shuffled puzzle from a seed.
    ///
    /// `colors * capacity` balls (`capacity` of each color) are dealt into
    /// `colors` full containers, followed by `empty` empty containers. The same
    /// arguments always produce the same puzzle.
    pub fn new_random_with_seed(colors: u8, capacity: usize, empty: usize, seed: u64) -> Result<Self> {
        if colors == 0 || colors == EMPTY {
            return Err(SolveError::malformed(format!(
                "color count must be between 1 and {}",
                EMPTY - 1
            )));
        }

        let mut balls: Vec<u8> = (0..colors)
            .flat_map(|color| std::iter::repeat(color).take(capacity))
            .collect();
        let mut rng = SmallRng::seed_from_u64(seed);
        balls.shuffle(&mut rng);

        let mut layout: Vec<Vec<u8>> = balls.chunks(capacity.max(1)).map(<[u8]>::to_vec).collect();
        layout.resize(colors as usize + empty, Vec::new());
        BallSortState::new(layout.len(), capacity, &layout)
    }

    /// Number of containers.
    pub fn containers(&self) -> usize {
        self.containers
    }

    /// Slots per container.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Balls of container `index`, top to bottom.
    ///
    /// # Panics
    /// Panics if `index >= self.containers()`.
    pub fn items(&self, index: usize) -> Vec<u8> {
        self.container(index)
            .iter()
            .copied()
            .filter(|&ball| ball != EMPTY)
            .collect()
    }

    fn container(&self, index: usize) -> &[u8] {
        &self.layout[index * self.capacity..(index + 1) * self.capacity]
    }

    /// Slot of the top ball of container `index`, or `None` if it is empty.
    fn top_slot(&self, index: usize) -> Option<usize> {
        self.container(index).iter().position(|&ball| ball != EMPTY)
    }

    fn top(&self, index: usize) -> Option<u8> {
        self.top_slot(index).map(|slot| self.container(index)[slot])
    }

    /// A container accepts `ball` when it is empty, or has a free slot and its
    /// top ball has the same color.
    fn accepts(&self, index: usize, ball: u8) -> bool {
        match self.top_slot(index) {
            None => true,
            Some(slot) => slot > 0 && self.container(index)[slot] == ball,
        }
    }

    /// Moves that place every sorted container in ascending color order with the
    /// empty containers last.
    ///
    /// Must be called on a solved state. A full container is relocated by pouring
    /// it into an empty one ball by ball, so nothing can be rearranged when the
    /// puzzle has no empty container.
    pub fn arrange_moves(&self) -> Vec<BallSortMove> {
        debug_assert!(self.is_solved(), "arrange_moves requires a solved state");

        let mut colors: Vec<Option<u8>> = (0..self.containers).map(|i| self.top(i)).collect();
        if !colors.iter().any(Option::is_none) {
            return Vec::new();
        }
        let mut wanted: Vec<u8> = colors.iter().flatten().copied().collect();
        wanted.sort_unstable();

        let mut moves = Vec::new();
        let pour = |from: usize, to: usize, moves: &mut Vec<BallSortMove>| {
            moves.extend(std::iter::repeat(BallSortMove::new(from, to)).take(self.capacity));
        };

        for (position, &color) in wanted.iter().enumerate() {
            if colors[position] == Some(color) {
                continue;
            }
            let Some(source) = (position + 1..self.containers).find(|&i| colors[i] == Some(color))
            else {
                break;
            };

            if let Some(displaced) = colors[position] {
                let Some(buffer) = colors.iter().position(Option::is_none) else {
                    break;
                };
                pour(position, buffer, &mut moves);
                colors[buffer] = Some(displaced);
            }
            pour(source, position, &mut moves);
            colors[position] = Some(color);
            colors[source] = None;
        }

        moves
    }
}

impl PuzzleState for BallSortState {
    type Move = BallSortMove;
    type Options = BallSortOptions;

    fn valid_moves(&self) -> impl Iterator<Item = BallSortMove> + '_ {
        (0..self.containers)
            .filter_map(move |from| self.top(from).map(|ball| (from, ball)))
            .flat_map(move |(from, ball)| {
                (0..self.containers)
                    .filter(move |&to| to != from && self.accepts(to, ball))
                    .map(move |to| BallSortMove::new(from, to))
            })
    }

    fn apply(&self, mv: BallSortMove) -> Self {
        assert!(
            mv.from < self.containers && mv.to < self.containers && mv.from != mv.to,
            "invalid move {:?} for {} containers",
            mv,
            self.containers
        );
        let from_slot = self
            .top_slot(mv.from)
            .unwrap_or_else(|| panic!("invalid move {:?}: source container is empty", mv));
        let ball = self.container(mv.from)[from_slot];
        assert!(
            self.accepts(mv.to, ball),
            "invalid move {:?}: destination cannot take ball {}",
            mv,
            ball
        );

        let to_slot = self.top_slot(mv.to).map_or(self.capacity - 1, |slot| slot - 1);
        let mut layout = self.layout.clone();
        layout[mv.from * self.capacity + from_slot] = EMPTY;
        layout[mv.to * self.capacity + to_slot] = ball;

        BallSortState {
            containers: self.containers,
            capacity: self.capacity,
            layout,
        }
    }

    /// Every container is either completely empty or completely filled with a
    /// single color.
    fn is_solved(&self) -> bool {
        self.layout
            .chunks(self.capacity)
            .all(|container| container.iter().all(|&ball| ball == container[0]))
    }

    /// Counts, per container, the balls whose color differs from the top ball.
    fn heuristic(&self, _options: &BallSortOptions) -> f64 {
        let mut score = 0usize;
        for index in 0..self.containers {
            if let Some(slot) = self.top_slot(index) {
                let container = self.container(index);
                let top = container[slot];
                score += container[slot..].iter().filter(|&&ball| ball != top).count();
            }
        }
        score as f64
    }

    fn state_hash(&self) -> u64 {
        layout_hash(self)
    }

    fn finishing_moves(&self, options: &BallSortOptions) -> Vec<BallSortMove> {
        if options.arrange_by_color {
            self.arrange_moves()
        } else {
            Vec::new()
        }
    }
}

impl fmt::Display for BallSortState {
    /// One line per container with its balls top to bottom; `-` marks an empty one.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..self.containers {
            let items = self.items(index);
            if items.is_empty() {
                write!(f, "-")?;
            } else {
                let line: Vec<String> = items.iter().map(u8::to_string).collect();
                write!(f, "{}", line.join(" "))?;
            }
            if index + 1 < self.containers {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
