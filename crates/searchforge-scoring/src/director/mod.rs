//! Score director implementations.
//!
//! The score director owns the working solution, brackets every change with
//! before/after notifications, keeps shadow variables consistent and
//! produces the score.
//!
//! # Score Director Types
//!
//! - [`SimpleScoreDirector`] - Full recalculation (baseline and verification)
//! - [`IncrementalScoreDirector`] - Delta-based scoring over a [`ConstraintSet`](crate::ConstraintSet)

mod factory;
mod incremental;
mod listener_support;
mod simple;
mod traits;

#[cfg(test)]
mod tests;

pub use factory::{IncrementalScoreDirectorFactory, ScoreDirectorFactory, SimpleScoreDirectorFactory};
pub use incremental::IncrementalScoreDirector;
pub use listener_support::{EntityChangeSink, ListenerRegistration, VariableListenerSupport};
pub use simple::SimpleScoreDirector;
pub use traits::ScoreDirector;
