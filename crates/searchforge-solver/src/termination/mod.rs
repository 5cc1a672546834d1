//! Termination conditions for the solver and its phases.
//!
//! A termination is polled between steps with a [`Progress`] snapshot of
//! the solver or of the current phase. Terminations can also report how far
//! along they are (the time gradient), which drives simulated annealing.

mod best_score;
mod composite;
mod external;
mod step_count;
mod time;
mod unimproved;


use std::fmt::Debug;
use std::time::Duration;

use searchforge_core::domain::PlanningSolution;

pub use best_score::{BestScoreFeasibleTermination, BestScoreTermination};
pub use composite::{AndTermination, OrTermination, TerminationGroup};
pub use external::ExternalTermination;
pub use step_count::StepCountTermination;
pub use time::TimeTermination;
pub use unimproved::{UnimprovedStepCountTermination, UnimprovedTimeTermination};

/// What a termination sees of the solver (or of one phase).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress<Sc> {
    pub elapsed: Duration,
    pub step_count: u64,
    /// Steps since the best score last improved.
    pub unimproved_step_count: u64,
    /// Time since the best score last improved.
    pub unimproved_elapsed: Duration,
    /// Best score when solving (or the phase) started.
    pub starting_score: Option<Sc>,
    pub best_score: Option<Sc>,
    pub score_calculation_count: u64,
}

impl<Sc> Default for Progress<Sc> {
    fn default() -> Self {
        Self {
            elapsed: Duration::ZERO,
            step_count: 0,
            unimproved_step_count: 0,
            unimproved_elapsed: Duration::ZERO,
            starting_score: None,
            best_score: None,
            score_calculation_count: 0,
        }
    }
}

/// Decides when to stop solving.
pub trait Termination<S: PlanningSolution>: Send + Debug {
    /// Returns true if solving should stop at this step boundary.
    fn is_terminated(&self, progress: &Progress<S::Score>) -> bool;

    /// Fraction of the budget already used, in `[0.0, 1.0]`, or `None` if
    /// this termination cannot tell.
    fn time_gradient(&self, _progress: &Progress<S::Score>) -> Option<f64> {
        None
    }
}

impl<S: PlanningSolution, T: Termination<S> + ?Sized> Termination<S> for Box<T> {
    fn is_terminated(&self, progress: &Progress<S::Score>) -> bool {
        (**self).is_terminated(progress)
    }

    fn time_gradient(&self, progress: &Progress<S::Score>) -> Option<f64> {
        (**self).time_gradient(progress)
    }
}

pub(crate) fn ratio(done: f64, limit: f64) -> f64 {
    if limit <= 0.0 {
        1.0
    } else {
        (done / limit).clamp(0.0, 1.0)
    }
}
