//! Error types for the puzzle solver.

use thiserror::Error;

/// Errors surfaced by puzzle construction and by [`crate::solver::solve`].
///
/// Applying a move that is not currently valid is a contract violation and
/// panics instead of producing one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The puzzle description could not be turned into a state.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The frontier was exhausted without reaching a solved state.
    #[error("Solution not found.")]
    NoSolutionFound,

    /// The cancellation token fired before the search finished.
    #[error("Search was cancelled")]
    Cancelled,
}

impl SolveError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        SolveError::MalformedInput(message.into())
    }
}

/// Result type alias for solver operations.
pub type Result<T> = std::result::Result<T, SolveError>;

/// Errors raised while loading or validating a [`crate::config::SolverConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SolveError::malformed("bad width").to_string(),
            "Malformed input: bad width"
        );
        assert_eq!(SolveError::NoSolutionFound.to_string(), "Solution not found.");
        assert_eq!(SolveError::Cancelled.to_string(), "Search was cancelled");
    }

    #[test]
    fn test_config_error_from_io() {
        let err: ConfigError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.to_string().starts_with("IO error"));
    }
}
