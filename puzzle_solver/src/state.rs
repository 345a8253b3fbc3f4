//! The contract every puzzle exposes to the search engine.
//!
//! A puzzle is an immutable snapshot. The engine only ever asks it to list
//! moves, derive successors, test for the goal, score itself, and produce a
//! hash for duplicate detection. Adding a new puzzle means implementing
//! [`PuzzleState`] for its state type; nothing in [`crate::solver`] changes.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Tunable parameters the search drivers read from a puzzle's options.
pub trait SearchOptions {
    /// Number of candidates kept after each beam search round.
    fn beam_width(&self) -> usize;
}

/// Immutable puzzle snapshot driven by the search algorithms.
pub trait PuzzleState: Clone + Sized {
    /// One atomic transition of this puzzle.
    type Move: Copy + Eq + fmt::Debug + fmt::Display;
    /// Options consumed by [`heuristic`](Self::heuristic) and the search drivers.
    type Options: SearchOptions + fmt::Debug;

    /// Lists every move that is valid in this state.
    ///
    /// The iterator is lazy and can be restarted by calling this again. It never
    /// yields a no-op move or a move acting on an empty source.
    fn valid_moves(&self) -> impl Iterator<Item = Self::Move> + '_;

    /// Returns the state reached by playing `mv`.
    ///
    /// # Panics
    /// Panics if `mv` is not valid for this state. The receiver is never modified.
    fn apply(&self, mv: Self::Move) -> Self;

    /// Returns `true` if this state satisfies the puzzle's goal.
    fn is_solved(&self) -> bool;

    /// Estimates the remaining work; lower is better.
    ///
    /// Returns `f64::INFINITY` when the goal is provably unreachable.
    fn heuristic(&self, options: &Self::Options) -> f64;

    /// Deterministic hash of the canonical layout, used for visited-set membership.
    fn state_hash(&self) -> u64;

    /// Moves appended after a solved state is reached.
    ///
    /// Only called on solved states. Most puzzles have nothing to add.
    fn finishing_moves(&self, _options: &Self::Options) -> Vec<Self::Move> {
        Vec::new()
    }

    /// Returns `true` if `mv` is among [`valid_moves`](Self::valid_moves).
    fn is_valid_move(&self, mv: Self::Move) -> bool {
        self.valid_moves().any(|candidate| candidate == mv)
    }

    /// Plays `moves` in order starting from this state.
    ///
    /// # Panics
    /// Panics if any move is invalid at the point it is played.
    fn apply_all<I>(&self, moves: I) -> Self
    where
        I: IntoIterator<Item = Self::Move>,
    {
        moves
            .into_iter()
            .fold(self.clone(), |state, mv| state.apply(mv))
    }
}

/// Hashes a canonical layout with the std SipHash hasher (fixed keys, so stable
/// within a build).
pub(crate) fn layout_hash<T: Hash + ?Sized>(layout: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    layout.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_hash_is_deterministic() {
        let a = [1u8, 2, 3];
        let b = [1u8, 2, 3];
        assert_eq!(layout_hash(&a[..]), layout_hash(&b[..]));
        assert_ne!(layout_hash(&a[..]), layout_hash(&[3u8, 2, 1][..]));
    }
}
