//! Score director factories.
//!
//! A factory builds one fresh director per solver run, and one per worker
//! when moves are evaluated on several threads.

use std::sync::Arc;

use searchforge_core::domain::{PlanningSolution, SolutionDescriptor};
use searchforge_core::Result;

use super::incremental::IncrementalScoreDirector;
use super::listener_support::ListenerRegistration;
use super::simple::SimpleScoreDirector;
use super::traits::ScoreDirector;
use crate::constraint::ConstraintSet;

/// Builds score directors for a solution type.
pub trait ScoreDirectorFactory<S: PlanningSolution>: Send + Sync {
    type Director: ScoreDirector<S>;

    /// Builds a director over `solution`, with all shadow variables recomputed.
    fn build_score_director(&self, solution: S) -> Result<Self::Director>;

    fn solution_descriptor(&self) -> &SolutionDescriptor<S>;
}

/// A shared factory, so the solver and its move threads build from one.
impl<S, F> ScoreDirectorFactory<S> for Arc<F>
where
    S: PlanningSolution,
    F: ScoreDirectorFactory<S> + ?Sized,
{
    type Director = F::Director;

    fn build_score_director(&self, solution: S) -> Result<Self::Director> {
        (**self).build_score_director(solution)
    }

    fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        (**self).solution_descriptor()
    }
}

/// Builds [`SimpleScoreDirector`]s that share one calculator.
///
/// The calculator function is stored as a concrete generic type parameter,
/// not as `Arc<dyn Fn>`.
pub struct SimpleScoreDirectorFactory<S: PlanningSolution, C> {
    solution_descriptor: SolutionDescriptor<S>,
    score_calculator: C,
    listeners: Vec<ListenerRegistration<S>>,
}

impl<S, C> SimpleScoreDirectorFactory<S, C>
where
    S: PlanningSolution,
    C: Fn(&S) -> S::Score + Send + Sync + Clone,
{
    pub fn new(solution_descriptor: SolutionDescriptor<S>, score_calculator: C) -> Self {
        Self {
            solution_descriptor,
            score_calculator,
            listeners: Vec::new(),
        }
    }

    pub fn with_listener(mut self, registration: ListenerRegistration<S>) -> Self {
        self.listeners.push(registration);
        self
    }
}

impl<S, C> ScoreDirectorFactory<S> for SimpleScoreDirectorFactory<S, C>
where
    S: PlanningSolution,
    C: Fn(&S) -> S::Score + Send + Sync + Clone,
{
    type Director = SimpleScoreDirector<S, C>;

    fn build_score_director(&self, solution: S) -> Result<Self::Director> {
        SimpleScoreDirector::with_listeners(
            solution,
            self.solution_descriptor.clone(),
            self.score_calculator.clone(),
            &self.listeners,
        )
    }

    fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        &self.solution_descriptor
    }
}

/// Builds [`IncrementalScoreDirector`]s, each with its own copy of the constraints.
pub struct IncrementalScoreDirectorFactory<S: PlanningSolution, C> {
    solution_descriptor: SolutionDescriptor<S>,
    constraints: C,
    listeners: Vec<ListenerRegistration<S>>,
    constraint_match_enabled: bool,
}

impl<S, C> IncrementalScoreDirectorFactory<S, C>
where
    S: PlanningSolution,
    C: ConstraintSet<S, S::Score> + Clone,
{
    pub fn new(solution_descriptor: SolutionDescriptor<S>, constraints: C) -> Self {
        Self {
            solution_descriptor,
            constraints,
            listeners: Vec::new(),
            constraint_match_enabled: false,
        }
    }

    pub fn with_listener(mut self, registration: ListenerRegistration<S>) -> Self {
        self.listeners.push(registration);
        self
    }

    pub fn with_constraint_match_enabled(mut self, enabled: bool) -> Self {
        self.constraint_match_enabled = enabled;
        self
    }
}

impl<S, C> ScoreDirectorFactory<S> for IncrementalScoreDirectorFactory<S, C>
where
    S: PlanningSolution,
    C: ConstraintSet<S, S::Score> + Clone,
{
    type Director = IncrementalScoreDirector<S, C>;

    fn build_score_director(&self, solution: S) -> Result<Self::Director> {
        let director = IncrementalScoreDirector::with_listeners(
            solution,
            self.solution_descriptor.clone(),
            self.constraints.clone(),
            &self.listeners,
        )?;
        Ok(director.with_constraint_match_enabled(self.constraint_match_enabled))
    }

    fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        &self.solution_descriptor
    }
}
