//! Core Score trait definition

use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::ops::{Add, Neg, Sub};

use super::ScoreLevel;

/// Core trait for all score types in SearchForge.
///
/// Scores are ordered tuples of integer levels, compared lexicographically
/// from the highest priority level down. Higher is better.
///
/// All score implementations must be:
/// - Immutable (operations return new instances)
/// - Thread-safe (Send + Sync)
/// - Comparable (total ordering)
pub trait Score:
    Copy
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + PartialEq
    + Eq
    + Hash
    + PartialOrd
    + Ord
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Returns true if this score represents a feasible solution.
    ///
    /// A solution is feasible when every level above the lowest one is >= 0.
    fn is_feasible(&self) -> bool;

    /// Returns the zero score (identity element for addition).
    fn zero() -> Self;

    /// Returns the number of score levels.
    fn levels_count() -> usize;

    /// Returns the score values, highest priority first.
    fn to_level_numbers(&self) -> Vec<i64>;

    /// Creates a score from level numbers, highest priority first.
    ///
    /// Missing trailing levels are treated as zero; extra levels are ignored.
    fn from_level_numbers(levels: &[i64]) -> Self;

    /// Multiplies this score by a scalar, rounding each level.
    fn multiply(&self, multiplicand: f64) -> Self;

    /// Divides this score by a scalar, rounding each level.
    fn divide(&self, divisor: f64) -> Self;

    /// Returns the absolute value of this score.
    fn abs(&self) -> Self;

    /// Returns the semantic label for the score level at the given index.
    fn level_label(index: usize) -> ScoreLevel;

    /// Returns the score levels as floating point numbers.
    fn to_level_doubles(&self) -> Vec<f64> {
        self.to_level_numbers().into_iter().map(|n| n as f64).collect()
    }

    /// Compares two scores, returning the ordering.
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    /// Returns true if this score is better than the other score.
    fn is_better_than(&self, other: &Self) -> bool {
        self > other
    }

    /// Returns true if this score is worse than the other score.
    fn is_worse_than(&self, other: &Self) -> bool {
        self < other
    }
}

/// Scores that can be parsed from their textual form.
pub trait ParseableScore: Score {
    /// Parses a score from a string representation.
    ///
    /// # Format
    /// - SimpleScore: "42"
    /// - HardSoftScore: "0hard/-100soft"
    /// - HardMediumSoftScore: "0hard/0medium/-100soft"
    fn parse(s: &str) -> Result<Self, ScoreParseError>;

    /// Returns the string representation of this score.
    fn to_string_repr(&self) -> String;
}

/// Error when parsing a score from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreParseError {
    pub message: String,
}

impl std::fmt::Display for ScoreParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Score parse error: {}", self.message)
    }
}

impl std::error::Error for ScoreParseError {}
