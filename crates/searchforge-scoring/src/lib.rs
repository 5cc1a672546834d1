//! Score directors and incremental scoring for SearchForge.
//!
//! This crate provides:
//! - The [`ScoreDirector`] trait that mediates every change to the working solution
//! - [`SimpleScoreDirector`] (full recalculation) and [`IncrementalScoreDirector`]
//!   (delta-based scoring over a tuple [`ConstraintSet`])
//! - [`VariableListenerSupport`], which dispatches shadow variable listeners in
//!   topological order
//! - Constraint match tracking for score explanation
//! - Director factories used to build per-worker directors

pub mod analysis;
pub mod constraint;
pub mod director;

pub use analysis::{ConstraintMatch, ConstraintMatchTotal, ScoreExplanation};
pub use constraint::{ConstraintSet, IncrementalConstraint, PairConflictConstraint, UniConstraint};
pub use director::{
    EntityChangeSink, IncrementalScoreDirector, IncrementalScoreDirectorFactory,
    ListenerRegistration, ScoreDirector, ScoreDirectorFactory, SimpleScoreDirector,
    SimpleScoreDirectorFactory, VariableListenerSupport,
};
