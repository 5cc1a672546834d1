//! Solver phases.
//!
//! Phases run in sequence on the same working solution. Each phase has its
//! own strategy and termination; the solver-level termination and early
//! termination requests apply to all of them.

pub mod localsearch;

use std::fmt::Debug;

use searchforge_core::domain::PlanningSolution;
use searchforge_core::Result;
use searchforge_scoring::ScoreDirector;

use crate::scope::SolverScope;

/// A phase of the solving process.
///
/// # Type Parameters
/// * `S` - The planning solution type
/// * `D` - The score director type
pub trait Phase<S: PlanningSolution, D: ScoreDirector<S>>: Send + Debug {
    /// Called once before the first phase runs.
    fn solving_started(&mut self, _solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        Ok(())
    }

    /// Runs this phase on the working solution in `solver_scope`, updating
    /// the best solution whenever it improves.
    fn solve(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()>;

    /// Called once after the last phase ran.
    fn solving_ended(&mut self, _solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        Ok(())
    }

    fn phase_type_name(&self) -> &'static str;
}

impl<S, D, P> Phase<S, D> for Box<P>
where
    S: PlanningSolution,
    D: ScoreDirector<S>,
    P: Phase<S, D> + ?Sized,
{
    fn solving_started(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        (**self).solving_started(solver_scope)
    }

    fn solve(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        (**self).solve(solver_scope)
    }

    fn solving_ended(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        (**self).solving_ended(solver_scope)
    }

    fn phase_type_name(&self) -> &'static str {
        (**self).phase_type_name()
    }
}
