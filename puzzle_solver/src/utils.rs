//! Text formats for puzzle files.
//!
//! Both parsers return [`SolveError::MalformedInput`] with the offending line
//! number, so the CLI can report bad files without panicking.
use crate::ball_sort::BallSortState;
use crate::error::{Result, SolveError};
use crate::sokoban::SokobanState;

/// Parses a tube-sort puzzle.
///
/// Format, one container per line:
/// - balls are whitespace-separated color numbers listed **top to bottom**;
/// - `-` is an empty container;
/// - an optional `capacity = N` line before the first container sets the
///   capacity, otherwise the fullest container's size is used;
/// - blank lines and lines starting with `#` are ignored.
///
/// # Arguments
/// * `s`: The whole file contents.
///
/// # Returns
/// * `Ok(BallSortState)` if every line parses and the layout is valid.
/// * `Err(SolveError::MalformedInput)` if a token is not a color in `0..=254`,
///   the capacity line is misplaced or invalid, there are no containers, or
///   [`BallSortState::new`] rejects the layout.
///
/// # Examples
/// ```
/// use puzzle_solver::utils::ball_sort_from_str;
///
/// let state = ball_sort_from_str("capacity = 3\n1 0 0\n0 1 1\n-\n").unwrap();
/// assert_eq!(state.containers(), 3);
/// assert_eq!(state.capacity(), 3);
/// assert_eq!(state.items(0), vec![1, 0, 0]);
/// assert!(state.items(2).is_empty());
///
/// assert!(ball_sort_from_str("1 x 0").is_err());
/// ```
pub fn ball_sort_from_str(s: &str) -> Result<BallSortState> {
    let mut capacity: Option<usize> = None;
    let mut layout: Vec<Vec<u8>> = Vec::new();

    for (index, raw) in s.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("capacity") {
            if capacity.is_some() || !layout.is_empty() {
                return Err(SolveError::malformed(format!(
                    "line {}: capacity must be given once, before the first container",
                    line_number
                )));
            }
            let value = rest
                .trim_start()
                .strip_prefix('=')
                .ok_or_else(|| SolveError::malformed(format!("line {}: expected 'capacity = N'", line_number)))?
                .trim();
            let parsed = value.parse::<usize>().map_err(|_| {
                SolveError::malformed(format!("line {}: '{}' is not a valid capacity", line_number, value))
            })?;
            capacity = Some(parsed);
            continue;
        }

        if line == "-" {
            layout.push(Vec::new());
            continue;
        }

        let balls = line
            .split_whitespace()
            .map(|token| {
                token.parse::<u8>().map_err(|_| {
                    SolveError::malformed(format!("line {}: '{}' is not a ball color", line_number, token))
                })
            })
            .collect::<Result<Vec<u8>>>()?;
        layout.push(balls);
    }

    if layout.is_empty() {
        return Err(SolveError::malformed("puzzle has no containers"));
    }
    let capacity = capacity.unwrap_or_else(|| layout.iter().map(Vec::len).max().unwrap_or(0));
    BallSortState::new(layout.len(), capacity, &layout)
}

/// Builds a push-box state from grid rows.
///
/// # Arguments
/// * `rows`: One string per grid row, top row first, using the layout alphabet
///   of [`SokobanState::new`].
///
/// # Returns
/// * `Err(SolveError::MalformedInput)` if there are no rows, the rows differ in
///   width, or [`SokobanState::new`] rejects the layout.
///
/// # Examples
/// ```
/// use puzzle_solver::utils::sokoban_from_lines;
///
/// let state = sokoban_from_lines(&["#####", "#@$.#", "#####"]).unwrap();
/// assert_eq!((state.height(), state.width()), (3, 5));
/// assert!(sokoban_from_lines(&["####", "#@$.#"]).is_err());
/// ```
pub fn sokoban_from_lines(rows: &[&str]) -> Result<SokobanState> {
    let Some(first) = rows.first() else {
        return Err(SolveError::malformed("grid has no rows"));
    };
    let width = first.chars().count();

    for (r, row) in rows.iter().enumerate() {
        let len = row.chars().count();
        if len != width {
            return Err(SolveError::malformed(format!(
                "row {} has {} cells, expected {}",
                r, len, width
            )));
        }
    }

    SokobanState::new(rows.len(), width, &rows.concat())
}

/// Parses a push-box puzzle file: one grid row per line.
///
/// Trailing whitespace and blank lines are ignored. Comments are not supported
/// since `#` is a wall.
pub fn sokoban_from_str(s: &str) -> Result<SokobanState> {
    let rows: Vec<&str> = s
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();
    sokoban_from_lines(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sokoban::Cell;
    use crate::state::PuzzleState;

    fn message(err: SolveError) -> String {
        match err {
            SolveError::MalformedInput(message) => message,
            other => panic!("expected MalformedInput, got {:?}", other),
        }
    }

    #[test]
    fn test_ball_sort_from_str_valid() {
        let input = "# level 1\ncapacity = 4\n\n1 0 0 0\n3 1 1 1\n0 2 2 2\n2 3 3 3\n-\n";
        let state = ball_sort_from_str(input).unwrap();
        assert_eq!(state.containers(), 5);
        assert_eq!(state.capacity(), 4);
        assert_eq!(state.items(1), vec![3, 1, 1, 1]);
        assert!(state.items(4).is_empty());
        assert_eq!(state.valid_moves().count(), 4);
    }

    #[test]
    fn test_ball_sort_from_str_infers_capacity() {
        let state = ball_sort_from_str("1 1\n0 0 0\n-").unwrap();
        assert_eq!(state.capacity(), 3);
        assert_eq!(state.items(0), vec![1, 1]);
    }

    #[test]
    fn test_ball_sort_from_str_matches_constructor() {
        let parsed = ball_sort_from_str("-\n0 0 0\n1 2 2\n1 1 2").unwrap();
        let built = BallSortState::new(4, 3, &[vec![], vec![0u8, 0, 0], vec![1, 2, 2], vec![1, 1, 2]]).unwrap();
        assert_eq!(parsed.state_hash(), built.state_hash());
        assert_eq!(parsed.to_string(), built.to_string());
    }

    #[test]
    fn test_ball_sort_from_str_invalid_token() {
        let err = ball_sort_from_str("1 0\n0 red").unwrap_err();
        assert!(message(err).contains("line 2: 'red' is not a ball color"));

        let err = ball_sort_from_str("255").unwrap_err();
        assert!(message(err).contains("reserved value"));

        assert!(ball_sort_from_str("256").is_err());
    }

    #[test]
    fn test_ball_sort_from_str_capacity_errors() {
        let err = ball_sort_from_str("1 0\ncapacity = 2").unwrap_err();
        assert!(message(err).contains("before the first container"));

        let err = ball_sort_from_str("capacity 2\n1 0").unwrap_err();
        assert!(message(err).contains("expected 'capacity = N'"));

        let err = ball_sort_from_str("capacity = two").unwrap_err();
        assert!(message(err).contains("not a valid capacity"));

        let err = ball_sort_from_str("capacity = 1\n0 0").unwrap_err();
        assert!(message(err).contains("capacity is 1"));
    }

    #[test]
    fn test_ball_sort_from_str_empty_input() {
        assert!(ball_sort_from_str("").is_err());
        assert!(ball_sort_from_str("# only a comment\n\n").is_err());
        // Only empty containers and no capacity line gives capacity 0.
        assert!(ball_sort_from_str("-\n-").is_err());
    }

    #[test]
    fn test_sokoban_from_str_valid() {
        let input = "!!########\n!!#.s##ss#\n!!#...sss#\n!##s.##ss#\n!#s$.$s$##\n##s##$#@s#\n#ssss$s$s#\n#sssss#ss#\n##########\n";
        let state = sokoban_from_str(input).unwrap();
        assert_eq!((state.height(), state.width()), (9, 10));
        assert_eq!(state.player_position(), (5, 7));
        assert_eq!(state.cell(0, 0), Cell::OUT_OF_BOUNDS);
        assert_eq!(state.cell(4, 3), Cell::BOX);
        assert_eq!(state.valid_moves().count(), 3);
    }

    #[test]
    fn test_sokoban_from_str_ignores_trailing_whitespace() {
        let state = sokoban_from_str("#####  \r\n#@$.#\n#####\n\n").unwrap();
        assert_eq!(state.to_string(), "#####\n#@$.#\n#####");
    }

    #[test]
    fn test_sokoban_from_lines_ragged_rows() {
        let err = sokoban_from_lines(&["#####", "#@$.", "#####"]).unwrap_err();
        assert!(message(err).contains("row 1 has 4 cells, expected 5"));
    }

    #[test]
    fn test_sokoban_from_lines_invalid() {
        assert!(sokoban_from_lines(&[]).is_err());
        assert!(sokoban_from_lines(&["#@X.#"]).is_err());
        assert!(sokoban_from_lines(&["#s$.#"]).is_err());
    }
}
