//! Configuration system for SearchForge.
//!
//! Load solver configuration from TOML or YAML to control the environment
//! mode, termination, acceptors, foragers and move selection without code
//! changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use searchforge_config::{PhaseConfig, SolverConfig};
//! use std::time::Duration;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     random_seed = 7
//!
//!     [termination]
//!     seconds_spent_limit = 30
//!
//!     [[phases]]
//!     type = "local_search"
//!     [phases.acceptor]
//!     entity_tabu_size = 7
//!     [phases.forager]
//!     accepted_count_limit = 1000
//! "#).unwrap();
//!
//! assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
//! assert!(config.validate().is_ok());
//! let PhaseConfig::LocalSearch(local_search) = &config.phases[0];
//! assert_eq!(local_search.forager.as_ref().unwrap().accepted_count_limit, Some(1000));
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use searchforge_config::SolverConfig;
//!
//! let config = SolverConfig::load("solver.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

mod local_search;
mod selector;
mod termination;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::time::Duration;

use searchforge_core::SearchForgeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use local_search::{
    AcceptorConfig, AcceptorType, FinalistPodiumType, ForagerConfig, LocalSearchConfig,
    LocalSearchType, PickEarlyType,
};
pub use selector::{
    CartesianProductMoveSelectorConfig, ChangeMoveSelectorConfig, MoveSelectorConfig,
    NearbyDistributionConfig, NearbySelectionConfig, SelectionCacheType, SelectionConfig,
    SelectionOrder, SwapMoveSelectorConfig, UnionMoveSelectorConfig,
};
pub use termination::{TerminationCompositionStyle, TerminationConfig};

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for SearchForgeError {
    fn from(error: ConfigError) -> Self {
        SearchForgeError::Config(error.to_string())
    }
}

pub(crate) fn invalid<T>(message: String) -> Result<T, ConfigError> {
    Err(ConfigError::Invalid(message))
}

/// Main solver configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SolverConfig {
    /// Environment mode affecting reproducibility and assertions.
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    /// Random seed for reproducible results.
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Number of threads for parallel move evaluation.
    #[serde(default)]
    pub move_thread_count: MoveThreadCount,

    /// Solver-level termination.
    #[serde(default)]
    pub termination: Option<TerminationConfig>,

    /// Phase configurations, run in order.
    #[serde(default)]
    pub phases: Vec<PhaseConfig>,
}

impl SolverConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the termination time limit.
    pub fn with_termination_seconds(mut self, seconds: u64) -> Self {
        self.termination = Some(TerminationConfig {
            seconds_spent_limit: Some(seconds),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Sets the step count limit.
    pub fn with_termination_steps(mut self, steps: u64) -> Self {
        self.termination = Some(TerminationConfig {
            step_count_limit: Some(steps),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    pub fn with_environment_mode(mut self, environment_mode: EnvironmentMode) -> Self {
        self.environment_mode = environment_mode;
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_move_thread_count(mut self, move_thread_count: MoveThreadCount) -> Self {
        self.move_thread_count = move_thread_count;
        self
    }

    /// Adds a phase configuration.
    pub fn with_phase(mut self, phase: PhaseConfig) -> Self {
        self.phases.push(phase);
        self
    }

    /// Returns the termination time limit, if configured.
    ///
    /// Convenience method that delegates to `termination.time_limit()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use searchforge_config::SolverConfig;
    /// use std::time::Duration;
    ///
    /// let config = SolverConfig::from_toml_str(r#"
    ///     [termination]
    ///     seconds_spent_limit = 30
    /// "#).unwrap();
    ///
    /// assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
    /// ```
    pub fn time_limit(&self) -> Option<Duration> {
        self.termination.as_ref().and_then(|t| t.time_limit())
    }

    /// Checks the whole configuration for errors that would otherwise only
    /// surface while building the solver.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let MoveThreadCount::Count(0) = self.move_thread_count {
            return invalid(
                "move_thread_count must be positive; use \"none\" to disable move threads".into(),
            );
        }
        if let Some(termination) = &self.termination {
            termination.validate()?;
        }
        for (phase_index, phase) in self.phases.iter().enumerate() {
            phase.validate().map_err(|error| {
                ConfigError::Invalid(format!("phase {}: {}", phase_index, error))
            })?;
        }
        Ok(())
    }
}

/// Environment mode affecting solver behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// Seeds the random source from the operating system.
    NonReproducible,

    /// Same seed, same result.
    #[default]
    Reproducible,

    /// Asserts the step score from scratch after every step.
    FastAssert,

    /// Also asserts every undo and the shadow variables after every step.
    FullAssert,
}

impl EnvironmentMode {
    pub fn is_reproducible(self) -> bool {
        self != EnvironmentMode::NonReproducible
    }

    pub fn is_asserted(self) -> bool {
        matches!(self, EnvironmentMode::FastAssert | EnvironmentMode::FullAssert)
    }

    pub fn is_fully_asserted(self) -> bool {
        self == EnvironmentMode::FullAssert
    }
}

/// Move thread count configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveThreadCount {
    /// Derive the thread count from the available cores.
    Auto,

    /// No parallel move evaluation.
    #[default]
    None,

    /// Specific number of threads.
    Count(usize),
}

impl MoveThreadCount {
    /// Number of move threads for a machine with `available_processors`
    /// cores, or `None` for single-threaded evaluation.
    ///
    /// `Auto` leaves two cores to the solver thread and the rest of the
    /// process, and never uses more than four move threads.
    ///
    /// ```
    /// use searchforge_config::MoveThreadCount;
    ///
    /// assert_eq!(MoveThreadCount::Auto.resolve(16), Some(4));
    /// assert_eq!(MoveThreadCount::Auto.resolve(2), None);
    /// assert_eq!(MoveThreadCount::Count(3).resolve(2), Some(3));
    /// assert_eq!(MoveThreadCount::None.resolve(16), None);
    /// ```
    pub fn resolve(self, available_processors: usize) -> Option<usize> {
        match self {
            MoveThreadCount::None => None,
            MoveThreadCount::Count(0) => None,
            MoveThreadCount::Count(count) => Some(count),
            MoveThreadCount::Auto => {
                let count = available_processors.saturating_sub(2).min(4);
                (count >= 1).then_some(count)
            }
        }
    }
}

/// Phase configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhaseConfig {
    /// Local search phase.
    LocalSearch(LocalSearchConfig),
}

impl PhaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            PhaseConfig::LocalSearch(config) => config.validate(),
        }
    }

    pub fn termination(&self) -> Option<&TerminationConfig> {
        match self {
            PhaseConfig::LocalSearch(config) => config.termination.as_ref(),
        }
    }
}
