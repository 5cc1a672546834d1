//! SimpleScore - Single-level score implementation

use std::fmt;

use super::traits::{ParseableScore, Score, ScoreParseError};
use super::ScoreLevel;

/// A simple score with a single integer value.
///
/// # Examples
///
/// ```
/// use searchforge_core::{SimpleScore, Score};
///
/// let score1 = SimpleScore::of(-5);
/// let score2 = SimpleScore::of(-3);
///
/// assert!(score2 > score1);
/// assert!(score1.is_feasible());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleScore {
    score: i64,
}

impl SimpleScore {
    /// The zero score.
    pub const ZERO: SimpleScore = SimpleScore { score: 0 };

    /// A score of 1.
    pub const ONE: SimpleScore = SimpleScore { score: 1 };

    /// Creates a new SimpleScore with the given value.
    #[inline]
    pub const fn of(score: i64) -> Self {
        SimpleScore { score }
    }

    /// Returns the score value.
    #[inline]
    pub const fn score(&self) -> i64 {
        self.score
    }
}

impl Score for SimpleScore {
    // A single level has nothing above it to violate.
    #[inline]
    fn is_feasible(&self) -> bool {
        true
    }

    #[inline]
    fn zero() -> Self {
        SimpleScore::ZERO
    }

    #[inline]
    fn levels_count() -> usize {
        1
    }

    impl_score_levels!(SimpleScore { score } => of);

    fn level_label(_index: usize) -> ScoreLevel {
        ScoreLevel::Soft
    }
}

impl_score_ops!(SimpleScore { score } => of);

impl fmt::Debug for SimpleScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimpleScore({})", self.score)
    }
}

impl fmt::Display for SimpleScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.score)
    }
}

impl ParseableScore for SimpleScore {
    fn parse(s: &str) -> Result<Self, ScoreParseError> {
        let s = s.trim();
        s.parse::<i64>()
            .map(SimpleScore::of)
            .map_err(|e| ScoreParseError {
                message: format!("Invalid SimpleScore '{}': {}", s, e),
            })
    }

    fn to_string_repr(&self) -> String {
        self.score.to_string()
    }
}

impl From<i64> for SimpleScore {
    fn from(score: i64) -> Self {
        SimpleScore::of(score)
    }
}
