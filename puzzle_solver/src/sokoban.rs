//! Push-box (Sokoban) puzzle state.
//!
//! The board is a `height x width` grid stored row-major. Every cell is a small
//! flag set ([`Cell`]); a box or the player standing on a target is simply the
//! union of the two flags.
use crate::error::{Result, SolveError};
use crate::heuristics;
use crate::state::{layout_hash, PuzzleState, SearchOptions};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of candidates kept per beam search round.
pub const DEFAULT_BEAM_WIDTH: usize = 500;

/// Default cost added for each axis on which a box is pinned between obstacles.
pub const DEFAULT_SEMI_LOCKED_PENALTY: f64 = 10.0;

/// Flag set describing one grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Cell(u8);

impl Cell {
    pub const EMPTY: Cell = Cell(0);
    pub const WALL: Cell = Cell(1 << 0);
    pub const TARGET: Cell = Cell(1 << 1);
    pub const BOX: Cell = Cell(1 << 2);
    pub const PLAYER: Cell = Cell(1 << 3);
    pub const OUT_OF_BOUNDS: Cell = Cell(1 << 4);
    pub const BOX_ON_TARGET: Cell = Cell(Self::BOX.0 | Self::TARGET.0);
    pub const PLAYER_ON_TARGET: Cell = Cell(Self::PLAYER.0 | Self::TARGET.0);

    /// Returns `true` if every flag of `other` is set in `self`.
    pub fn contains(self, other: Cell) -> bool {
        self.0 & other.0 == other.0
    }

    fn with(self, other: Cell) -> Cell {
        Cell(self.0 | other.0)
    }

    fn without(self, other: Cell) -> Cell {
        Cell(self.0 & !other.0)
    }

    /// A cell the player can step on or a box can be pushed onto.
    pub fn is_walkable(self) -> bool {
        self == Cell::EMPTY || self == Cell::TARGET
    }

    /// A cell that nothing can ever move into.
    pub fn is_obstacle(self) -> bool {
        self.contains(Cell::WALL) || self.contains(Cell::OUT_OF_BOUNDS)
    }

    /// Parses one character of the layout alphabet.
    ///
    /// ```
    /// use puzzle_solver::sokoban::Cell;
    /// assert_eq!(Cell::from_char('*'), Some(Cell::BOX_ON_TARGET));
    /// assert_eq!(Cell::from_char('x'), None);
    /// ```
    pub fn from_char(symbol: char) -> Option<Cell> {
        match symbol {
            '#' => Some(Cell::WALL),
            '.' => Some(Cell::TARGET),
            's' => Some(Cell::EMPTY),
            '$' => Some(Cell::BOX),
            '@' => Some(Cell::PLAYER),
            '*' => Some(Cell::BOX_ON_TARGET),
            '+' => Some(Cell::PLAYER_ON_TARGET),
            '!' => Some(Cell::OUT_OF_BOUNDS),
            _ => None,
        }
    }

    /// Converts the cell back to its layout character.
    pub fn to_char(self) -> char {
        match self {
            Cell::WALL => '#',
            Cell::TARGET => '.',
            Cell::BOX => '$',
            Cell::PLAYER => '@',
            Cell::BOX_ON_TARGET => '*',
            Cell::PLAYER_ON_TARGET => '+',
            Cell::OUT_OF_BOUNDS => '!',
            _ => 's',
        }
    }
}

/// Compass direction of a player step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions in enumeration order.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    /// Row and column delta of one step.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }

    /// The direction a quarter turn clockwise.
    pub fn clockwise(self) -> Direction {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    pub fn opposite(self) -> Direction {
        self.clockwise().clockwise()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "Up",
            Direction::Right => "Right",
            Direction::Down => "Down",
            Direction::Left => "Left",
        };
        f.write_str(name)
    }
}

/// Steps the player one cell, pushing a box if one is in the way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SokobanMove {
    pub direction: Direction,
}

impl SokobanMove {
    pub fn new(direction: Direction) -> Self {
        SokobanMove { direction }
    }
}

impl fmt::Display for SokobanMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.direction)
    }
}

/// Options for solving push-box puzzles.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SokobanOptions {
    /// Candidates kept after each beam search round.
    pub beam_width: usize,
    /// Cost added per axis on which a box sits between two obstacles.
    pub semi_locked_penalty: f64,
}

impl Default for SokobanOptions {
    fn default() -> Self {
        SokobanOptions {
            beam_width: DEFAULT_BEAM_WIDTH,
            semi_locked_penalty: DEFAULT_SEMI_LOCKED_PENALTY,
        }
    }
}

impl SearchOptions for SokobanOptions {
    fn beam_width(&self) -> usize {
        self.beam_width
    }
}

/// Immutable snapshot of a push-box board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SokobanState {
    height: usize,
    width: usize,
    cells: Vec<Cell>,
    player: usize,
}

impl SokobanState {
    /// Builds a state from a flattened, row-major layout string.
    ///
    /// Alphabet: `#` wall, `.` target, `s` empty, `$` box, `@` player,
    /// `*` box on target, `+` player on target, `!` out of bounds.
    ///
    /// # Returns
    /// * `Err(SolveError::MalformedInput)` if a dimension is zero, the layout
    ///   length is not `height * width`, a character is outside the alphabet, or
    ///   the grid does not contain exactly one player.
    pub fn new(height: usize, width: usize, layout: &str) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(SolveError::malformed("grid dimensions must be non-zero"));
        }

        let cells = layout
            .chars()
            .enumerate()
            .map(|(index, symbol)| {
                Cell::from_char(symbol).ok_or_else(|| {
                    SolveError::malformed(format!(
                        "unknown character '{}' at position {}",
                        symbol, index
                    ))
                })
            })
            .collect::<Result<Vec<Cell>>>()?;

        if cells.len() != height * width {
            return Err(SolveError::malformed(format!(
                "layout has {} cells, expected {}x{} = {}",
                cells.len(),
                height,
                width,
                height * width
            )));
        }

        let players: Vec<usize> = cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.contains(Cell::PLAYER))
            .map(|(index, _)| index)
            .collect();
        let player = match players.as_slice() {
            [single] => *single,
            _ => {
                return Err(SolveError::malformed(format!(
                    "expected exactly one player, found {}",
                    players.len()
                )))
            }
        };

        Ok(SokobanState {
            height,
            width,
            cells,
            player,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the cell at (`row`, `col`).
    ///
    /// # Panics
    /// Panics if the position is outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        assert!(row < self.height && col < self.width, "cell ({}, {}) is off the grid", row, col);
        self.cells[row * self.width + col]
    }

    /// Row and column of the player.
    pub fn player_position(&self) -> (usize, usize) {
        (self.player / self.width, self.player % self.width)
    }

    pub(crate) fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn position(&self, index: usize) -> (usize, usize) {
        (index / self.width, index % self.width)
    }

    /// Index of the cell one step from `index`, or `None` past the grid edge.
    pub(crate) fn neighbor(&self, index: usize, direction: Direction) -> Option<usize> {
        let (row, col) = self.position(index);
        let (dr, dc) = direction.delta();
        let row = row.checked_add_signed(dr)?;
        let col = col.checked_add_signed(dc)?;
        (row < self.height && col < self.width).then(|| row * self.width + col)
    }

    fn is_walkable(&self, index: Option<usize>) -> bool {
        index.map_or(false, |i| self.cells[i].is_walkable())
    }

    /// Off-grid positions count as obstacles.
    pub(crate) fn is_obstacle(&self, index: Option<usize>) -> bool {
        index.map_or(true, |i| self.cells[i].is_obstacle())
    }

    fn can_move(&self, direction: Direction) -> bool {
        let Some(to) = self.neighbor(self.player, direction) else {
            return false;
        };
        if self.cells[to].is_walkable() {
            return true;
        }
        self.cells[to].contains(Cell::BOX) && self.is_walkable(self.neighbor(to, direction))
    }
}

impl PuzzleState for SokobanState {
    type Move = SokobanMove;
    type Options = SokobanOptions;

    fn valid_moves(&self) -> impl Iterator<Item = SokobanMove> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |&direction| self.can_move(direction))
            .map(SokobanMove::new)
    }

    fn apply(&self, mv: SokobanMove) -> Self {
        assert!(self.can_move(mv.direction), "invalid move {:?}", mv);

        let mut cells = self.cells.clone();
        let to = self.neighbor(self.player, mv.direction).expect("checked by can_move");
        if cells[to].contains(Cell::BOX) {
            let beyond = self.neighbor(to, mv.direction).expect("checked by can_move");
            cells[to] = cells[to].without(Cell::BOX);
            cells[beyond] = cells[beyond].with(Cell::BOX);
        }
        cells[self.player] = cells[self.player].without(Cell::PLAYER);
        cells[to] = cells[to].with(Cell::PLAYER);

        SokobanState {
            height: self.height,
            width: self.width,
            cells,
            player: to,
        }
    }

    /// No box stands off a target.
    fn is_solved(&self) -> bool {
        !self.cells.iter().any(|&cell| cell == Cell::BOX)
    }

    fn heuristic(&self, options: &SokobanOptions) -> f64 {
        heuristics::estimate(self, options)
    }

    fn state_hash(&self) -> u64 {
        layout_hash(&(self.height, self.width, &self.cells))
    }
}

impl fmt::Display for SokobanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.cells.chunks(self.width).enumerate() {
            let line: String = cells.iter().map(|cell| cell.to_char()).collect();
            f.write_str(&line)?;
            if row + 1 < self.height {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const LEVEL: &str = "!!########!!#.s##ss#!!#...sss#!##s.##ss#!#s$.$s$####s##$#@s##ssss$s$s##sssss#ss###########";

    fn level(layout: &str) -> SokobanState {
        SokobanState::new(9, 10, layout).unwrap()
    }

    fn directions(state: &SokobanState) -> HashSet<Direction> {
        state.valid_moves().map(|m| m.direction).collect()
    }

    #[test]
    fn test_valid_moves_up_right_down() {
        let expected: HashSet<Direction> = [Direction::Up, Direction::Right, Direction::Down].into_iter().collect();
        assert_eq!(directions(&level(LEVEL)), expected);
    }

    #[test]
    fn test_valid_moves_all_directions() {
        let s = level("!!########!!#.s##ss#!!#...$@s#!##s.##ss#!#s$.$ss####s##$#ss##ssss$s$s##sssss#ss###########");
        assert_eq!(directions(&s), Direction::ALL.into_iter().collect());
    }

    #[test]
    fn test_valid_moves_right_left() {
        let s = level("!!########!!#.s##ss#!!#..*@ss#!##s.##ss#!#s$.$ss####s##$#ss##ssss$s$s##sssss#ss###########");
        let expected: HashSet<Direction> = [Direction::Right, Direction::Left].into_iter().collect();
        assert_eq!(directions(&s), expected);
    }

    #[test]
    fn test_apply_matches_expected_layouts() {
        let cases = [
            (LEVEL, Direction::Up, "!!########!!#.s##ss#!!#...sss#!##s.##$s#!#s$.$s@####s##$#ss##ssss$s$s##sssss#ss###########"),
            (LEVEL, Direction::Right, "!!########!!#.s##ss#!!#...sss#!##s.##ss#!#s$.$s$####s##$#s@##ssss$s$s##sssss#ss###########"),
            (LEVEL, Direction::Down, "!!########!!#.s##ss#!!#...sss#!##s.##ss#!#s$.$s$####s##$#ss##ssss$s@s##sssss#$s###########"),
            (
                "!!########!!#.s##ss#!!#...$@s#!##s.##ss#!#s$.$ss####s##$#ss##ssss$s$s##sssss#ss###########",
                Direction::Left,
                "!!########!!#.s##ss#!!#..*@ss#!##s.##ss#!#s$.$ss####s##$#ss##ssss$s$s##sssss#ss###########",
            ),
            (
                "!!########!!#.s##ss#!!#..*@ss#!##s.##ss#!#s$.$ss####s##$#ss##ssss$s$s##sssss#ss###########",
                Direction::Left,
                "!!########!!#.s##ss#!!#.*+sss#!##s.##ss#!#s$.$ss####s##$#ss##ssss$s$s##sssss#ss###########",
            ),
        ];

        for (before, direction, after) in cases {
            let applied = level(before).apply(SokobanMove::new(direction));
            let expected = level(after);
            assert_eq!(applied.state_hash(), expected.state_hash(), "{} from {}", direction, before);
            assert_eq!(applied, expected);
        }
    }

    #[test]
    fn test_apply_does_not_mutate_receiver() {
        let s = level(LEVEL);
        let before = s.state_hash();
        for mv in s.valid_moves() {
            let next = s.apply(mv);
            assert_ne!(next.state_hash(), before);
        }
        assert_eq!(s.state_hash(), before);
        assert_eq!(s.player_position(), (5, 7));
    }

    #[test]
    fn test_is_valid_move_guards_apply() {
        let s = level(LEVEL);
        assert!(s.is_valid_move(SokobanMove::new(Direction::Up)));
        assert!(!s.is_valid_move(SokobanMove::new(Direction::Left)));
        assert!(!SokobanState::new(1, 5, "@$$ss").unwrap().is_valid_move(SokobanMove::new(Direction::Right)));
    }

    #[test]
    #[should_panic(expected = "invalid move")]
    fn test_apply_into_wall_panics() {
        level(LEVEL).apply(SokobanMove::new(Direction::Left));
    }

    #[test]
    fn test_is_solved() {
        let solved = SokobanState::new(1, 6, "#.s@*!").unwrap();
        assert!(solved.is_solved());
        let unsolved = SokobanState::new(1, 7, "#.s@$*!").unwrap();
        assert!(!unsolved.is_solved());
    }

    #[test]
    fn test_state_hash_equal_and_not_equal() {
        assert_eq!(level(LEVEL).state_hash(), level(LEVEL).state_hash());
        let moved_box = level("!!########!!#.s##ss#!!#...$ss#!##s.##ss#!#s$.$s$####s##$#@s##ssss$s$s##sssss#ss###########");
        assert_ne!(level(LEVEL).state_hash(), moved_box.state_hash());
    }

    #[test]
    fn test_new_rejects_malformed_input() {
        assert!(matches!(SokobanState::new(1, 4, "#@x#"), Err(SolveError::MalformedInput(_))));
        assert!(SokobanState::new(1, 5, "#@s#").is_err());
        assert!(SokobanState::new(1, 4, "#ss#").is_err());
        assert!(SokobanState::new(1, 4, "@s@#").is_err());
        assert!(SokobanState::new(0, 4, "").is_err());
    }

    #[test]
    fn test_grid_edge_is_not_walkable() {
        let s = SokobanState::new(1, 3, "@$s").unwrap();
        let moves: Vec<Direction> = s.valid_moves().map(|m| m.direction).collect();
        assert_eq!(moves, vec![Direction::Right]);

        let pushed = s.apply(SokobanMove::new(Direction::Right));
        assert_eq!(pushed.to_string(), "s@$");
        assert!(pushed.valid_moves().all(|m| m.direction == Direction::Left));
    }

    #[test]
    fn test_cannot_push_two_boxes() {
        let s = SokobanState::new(1, 5, "@$$ss").unwrap();
        assert_eq!(s.valid_moves().count(), 0);
    }

    #[test]
    fn test_display_round_trips_layout() {
        let s = level(LEVEL);
        let flattened: String = s.to_string().lines().collect();
        assert_eq!(flattened, LEVEL);
        assert_eq!(s.to_string().lines().count(), 9);
    }

    #[test]
    fn test_direction_helpers() {
        assert_eq!(Direction::Up.clockwise(), Direction::Right);
        assert_eq!(Direction::Left.clockwise(), Direction::Up);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
        assert_eq!(SokobanMove::new(Direction::Down).to_string(), "Down");
    }
}
