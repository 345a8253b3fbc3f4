//! Board evaluation for the push-box puzzle.
//!
//! The estimate combines three signals for every box that is not yet on a
//! target:
//! - a **corner deadlock** (two perpendicular neighbours are obstacles) makes the
//!   whole state unsolvable, so the estimate becomes `f64::INFINITY`;
//! - the Manhattan distance to the nearest target;
//! - a penalty for each axis on which the box is **semi-locked** (both opposite
//!   neighbours are obstacles), since it can then only travel along the other axis.
//!
//! Only walls and out-of-bounds cells count as obstacles. Other boxes can move,
//! so they never prove a deadlock.
use crate::sokoban::{Cell, Direction, SokobanOptions, SokobanState};

/// Returns the indices of all cells whose flags include `flag`.
fn indices_with(state: &SokobanState, flag: Cell) -> Vec<usize> {
    state
        .cells()
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.contains(flag))
        .map(|(index, _)| index)
        .collect()
}

/// Returns `true` if the box at `index` is wedged into a corner.
///
/// A corner is any pair of perpendicular neighbours (up/right, right/down,
/// down/left, left/up) that are both obstacles. A box off target in a corner can
/// never be pushed again.
pub fn is_corner_deadlock(state: &SokobanState, index: usize) -> bool {
    Direction::ALL.into_iter().any(|direction| {
        state.is_obstacle(state.neighbor(index, direction))
            && state.is_obstacle(state.neighbor(index, direction.clockwise()))
    })
}

/// Counts the axes (vertical, horizontal) on which both neighbours of `index`
/// are obstacles.
pub fn semi_locked_axes(state: &SokobanState, index: usize) -> usize {
    [Direction::Up, Direction::Left]
        .into_iter()
        .filter(|&direction| {
            state.is_obstacle(state.neighbor(index, direction))
                && state.is_obstacle(state.neighbor(index, direction.opposite()))
        })
        .count()
}

/// Manhattan distance from `index` to the closest of `targets`.
///
/// # Returns
/// `None` if `targets` is empty.
pub fn nearest_target_distance(state: &SokobanState, index: usize, targets: &[usize]) -> Option<usize> {
    let (row, col) = state.position(index);
    targets
        .iter()
        .map(|&target| {
            let (t_row, t_col) = state.position(target);
            row.abs_diff(t_row) + col.abs_diff(t_col)
        })
        .min()
}

/// Estimates the remaining cost of `state`.
///
/// # Returns
/// * `0.0` for a solved board.
/// * `f64::INFINITY` if any unsolved box is corner-deadlocked or no target exists.
/// * Otherwise the sum, over unsolved boxes, of the distance to the nearest
///   target plus `options.semi_locked_penalty` per semi-locked axis.
pub fn estimate(state: &SokobanState, options: &SokobanOptions) -> f64 {
    let targets = indices_with(state, Cell::TARGET);
    let mut score = 0.0;

    for index in indices_with(state, Cell::BOX) {
        if state.cells()[index].contains(Cell::TARGET) {
            continue;
        }
        if is_corner_deadlock(state, index) {
            return f64::INFINITY;
        }
        let Some(distance) = nearest_target_distance(state, index, &targets) else {
            return f64::INFINITY;
        };
        score += distance as f64;
        score += semi_locked_axes(state, index) as f64 * options.semi_locked_penalty;
    }

    score
}
