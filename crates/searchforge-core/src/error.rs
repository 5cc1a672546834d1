//! Error types for SearchForge

use thiserror::Error;

/// Main error type for SearchForge operations
#[derive(Debug, Error)]
pub enum SearchForgeError {
    /// Error in solver configuration, surfaced at build time
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error in domain model definition (shadow wiring, chains, cycles)
    #[error("Domain model error: {0}")]
    DomainModel(String),

    /// The incrementally tracked score disagrees with a from-scratch calculation
    #[error(
        "Score corruption ({context}): working score ({working_score}) is not the uncorrupted score ({uncorrupted_score})"
    )]
    ScoreCorruption {
        context: String,
        working_score: String,
        uncorrupted_score: String,
    },

    /// A shadow variable still differs from its recomputed value after notification
    #[error("Stale shadow variable: {0}")]
    ShadowVariableStale(String),

    /// Undoing a move did not restore the score from before the move
    #[error("Undo move corruption: {0}")]
    UndoMoveCorruption(String),

    /// A selector cache was read outside of its lifetime, or wraps an invalid child
    #[error("Selector state error: {0}")]
    SelectorState(String),

    /// An operation was called in the wrong order or without its prerequisite
    #[error("Usage order error: {0}")]
    UsageOrder(String),

    /// Solver was cancelled before completion
    #[error("Solver was cancelled")]
    Cancelled,

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SearchForgeError {
    /// Builds a score corruption error from both scores.
    pub fn score_corruption(
        context: impl Into<String>,
        working_score: impl std::fmt::Display,
        uncorrupted_score: impl std::fmt::Display,
    ) -> Self {
        SearchForgeError::ScoreCorruption {
            context: context.into(),
            working_score: working_score.to_string(),
            uncorrupted_score: uncorrupted_score.to_string(),
        }
    }

    /// Returns true for errors that only assert modes detect.
    pub fn is_consistency_error(&self) -> bool {
        matches!(
            self,
            SearchForgeError::ScoreCorruption { .. }
                | SearchForgeError::ShadowVariableStale(_)
                | SearchForgeError::UndoMoveCorruption(_)
        )
    }
}

/// Result type alias for SearchForge operations
pub type Result<T> = std::result::Result<T, SearchForgeError>;
