//! Solver configuration.
//!
//! Load per-puzzle tunables and the default algorithm from TOML so they can be
//! changed without rebuilding.
//!
//! # Examples
//!
//! ```
//! use puzzle_solver::config::SolverConfig;
//! use puzzle_solver::solver::Algorithm;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     algorithm = "best-first"
//!
//!     [ball_sort]
//!     beam_width = 100
//!
//!     [sokoban]
//!     semi_locked_penalty = 4.0
//! "#).unwrap();
//!
//! assert_eq!(config.algorithm, Algorithm::BestFirst);
//! assert_eq!(config.ball_sort.beam_width, 100);
//! assert_eq!(config.sokoban.beam_width, 500);
//! ```

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::ball_sort::BallSortOptions;
use crate::error::ConfigError;
use crate::sokoban::SokobanOptions;
use crate::solver::Algorithm;

/// Top-level configuration for both puzzles.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SolverConfig {
    /// Algorithm used when the caller does not pick one.
    pub algorithm: Algorithm,

    /// Tube-sort options.
    pub ball_sort: BallSortOptions,

    /// Push-box options.
    pub sokoban: SokobanOptions,
}

impl SolverConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file can't be read, contains invalid TOML, or fails
    /// [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable by the solver.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ball_sort.beam_width == 0 {
            return Err(ConfigError::Invalid(
                "ball_sort.beam_width must be greater than 0".to_string(),
            ));
        }
        if self.sokoban.beam_width == 0 {
            return Err(ConfigError::Invalid(
                "sokoban.beam_width must be greater than 0".to_string(),
            ));
        }
        let penalty = self.sokoban.semi_locked_penalty;
        if !penalty.is_finite() || penalty < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "sokoban.semi_locked_penalty must be a non-negative number, got {}",
                penalty
            )));
        }
        Ok(())
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_ball_sort_beam_width(mut self, width: usize) -> Self {
        self.ball_sort.beam_width = width;
        self
    }

    pub fn with_sokoban_beam_width(mut self, width: usize) -> Self {
        self.sokoban.beam_width = width;
        self
    }
}

/// Shared, replaceable configuration value.
///
/// Readers take a [`snapshot`](Self::snapshot) and keep using it even if
/// [`replace`](Self::replace) swaps in a new value afterwards, so a search that
/// is already running never sees options change under it.
#[derive(Debug)]
pub struct ConfigHandle<T> {
    current: Arc<RwLock<Arc<T>>>,
}

impl<T> Clone for ConfigHandle<T> {
    fn clone(&self) -> Self {
        ConfigHandle {
            current: Arc::clone(&self.current),
        }
    }
}

impl<T> ConfigHandle<T> {
    pub fn new(value: T) -> Self {
        ConfigHandle {
            current: Arc::new(RwLock::new(Arc::new(value))),
        }
    }

    /// Returns the value active right now.
    pub fn snapshot(&self) -> Arc<T> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Installs `value` for every later snapshot and returns the previous one.
    pub fn replace(&self, value: T) -> Arc<T> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SolverConfig::new();
        assert_eq!(config.algorithm, Algorithm::Beam);
        assert_eq!(config.ball_sort.beam_width, 250);
        assert!(!config.ball_sort.arrange_by_color);
        assert_eq!(config.sokoban.beam_width, 500);
        assert_eq!(config.sokoban.semi_locked_penalty, 10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_parsing() {
        let toml = r#"
            algorithm = "bfs"

            [ball_sort]
            beam_width = 32
            arrange_by_color = true

            [sokoban]
            beam_width = 64
            semi_locked_penalty = 2.5
        "#;

        let config = SolverConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.algorithm, Algorithm::BreadthFirst);
        assert_eq!(config.ball_sort.beam_width, 32);
        assert!(config.ball_sort.arrange_by_color);
        assert_eq!(config.sokoban.beam_width, 64);
        assert_eq!(config.sokoban.semi_locked_penalty, 2.5);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(SolverConfig::from_toml_str("").unwrap(), SolverConfig::default());
    }

    #[test]
    fn test_rejects_zero_beam_width() {
        let err = SolverConfig::from_toml_str("[ball_sort]\nbeam_width = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("ball_sort.beam_width"));

        let config = SolverConfig::new().with_sokoban_beam_width(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_penalty() {
        let err = SolverConfig::from_toml_str("[sokoban]\nsemi_locked_penalty = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_toml() {
        let err = SolverConfig::from_toml_str("algorithm = \"simulated-annealing\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("puzzle_solver_config_{}.toml", std::process::id()));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "algorithm = \"dfs\"").unwrap();
        }
        let config = SolverConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.algorithm, Algorithm::DepthFirst);

        assert!(matches!(SolverConfig::load(&path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_builder() {
        let config = SolverConfig::new()
            .with_algorithm(Algorithm::BestFirst)
            .with_ball_sort_beam_width(8)
            .with_sokoban_beam_width(16);
        assert_eq!(config.algorithm, Algorithm::BestFirst);
        assert_eq!(config.ball_sort.beam_width, 8);
        assert_eq!(config.sokoban.beam_width, 16);
    }

    #[test]
    fn test_handle_snapshot_survives_replace() {
        let handle = ConfigHandle::new(BallSortOptions::default());
        let before = handle.snapshot();
        let previous = handle.replace(BallSortOptions {
            beam_width: 1,
            ..BallSortOptions::default()
        });

        assert_eq!(before.beam_width, 250);
        assert_eq!(previous.beam_width, 250);
        assert_eq!(handle.snapshot().beam_width, 1);
        assert_eq!(handle.clone().snapshot().beam_width, 1);
    }
}
