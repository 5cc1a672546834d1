//! Real-time planning support.
//!
//! Problem changes can be submitted through a [`SolverHandle`] while the
//! solver runs. They are queued and applied at the next step boundary, so a
//! step never observes a half-applied change.
//!
//! Every mutation a change makes goes through a [`ProblemChangeDirector`],
//! which brackets it with the score director's before/after notifications.
//! Once all queued changes are applied the solver refreshes the shadow
//! variables, re-initializes the score director, takes the changed working
//! solution as the new best solution and restarts the running phase.
//!
//! # Example
//!
//! ```
//! use searchforge_solver::realtime::{ClosureProblemChange, ProblemChangeResult, SolverHandle};
//! use searchforge_test::PairSolution;
//!
//! let (handle, receiver) = SolverHandle::<PairSolution>::new();
//!
//! // Nothing is queued unless a solver is running.
//! let change = ClosureProblemChange::<PairSolution, _>::new("fix first item", |director| {
//!     director.change_variable(0, 0, "value", |s| s.values[0] = Some(3))
//! });
//! assert_eq!(handle.add_problem_change(change), ProblemChangeResult::SolverNotRunning);
//! assert!(!receiver.has_pending());
//! ```

mod director;
mod problem_change;
mod solver_handle;

#[cfg(test)]
mod tests;

pub use director::ProblemChangeDirector;
pub use problem_change::{BoxedProblemChange, ClosureProblemChange, ProblemChange};
pub use solver_handle::{ProblemChangeReceiver, ProblemChangeResult, SolverHandle};
