//! Simple score director with full recalculation.

use std::fmt;

use searchforge_core::domain::{
    EntityReference, PlanningSolution, SolutionDescriptor, VariableKey,
};
use searchforge_core::{Result, SearchForgeError};

use super::listener_support::{EntityChangeSink, ListenerRegistration, VariableListenerSupport};
use super::traits::ScoreDirector;
use crate::analysis::ConstraintMatchTotal;

/// A score director that recalculates the full score whenever the solution changed.
///
/// The calculator is stored as a concrete generic type parameter. This is
/// slow but obviously correct: it is the baseline for small problems and the
/// reference used to verify incremental scoring.
pub struct SimpleScoreDirector<S: PlanningSolution, C> {
    working_solution: S,
    solution_descriptor: SolutionDescriptor<S>,
    score_calculator: C,
    listener_support: VariableListenerSupport<S>,
    match_analyzer: Option<fn(&S) -> Vec<ConstraintMatchTotal<S::Score>>>,
    score_dirty: bool,
    cached_score: Option<S::Score>,
    calculation_count: u64,
}

struct DirtyFlag<'a>(&'a mut bool);

impl<S> EntityChangeSink<S> for DirtyFlag<'_> {
    fn before_entity_changed(&mut self, _solution: &S, _entity: EntityReference) {
        *self.0 = true;
    }

    fn after_entity_changed(&mut self, _solution: &S, _entity: EntityReference) {
        *self.0 = true;
    }
}

impl<S, C> SimpleScoreDirector<S, C>
where
    S: PlanningSolution,
    C: Fn(&S) -> S::Score + Send + Sync,
{
    /// Creates a director without shadow variables.
    pub fn new(solution: S, solution_descriptor: SolutionDescriptor<S>, score_calculator: C) -> Self {
        SimpleScoreDirector {
            working_solution: solution,
            solution_descriptor,
            score_calculator,
            listener_support: VariableListenerSupport::default(),
            match_analyzer: None,
            score_dirty: true,
            cached_score: None,
            calculation_count: 0,
        }
    }

    /// Creates a director whose shadow variables are maintained by the given listeners.
    ///
    /// Fails when the shadow wiring is invalid or a shadow variable has no listener.
    pub fn with_listeners(
        solution: S,
        solution_descriptor: SolutionDescriptor<S>,
        score_calculator: C,
        listeners: &[ListenerRegistration<S>],
    ) -> Result<Self> {
        let listener_support = VariableListenerSupport::build(&solution_descriptor, listeners)?;
        let mut director = Self::new(solution, solution_descriptor, score_calculator);
        director.listener_support = listener_support;
        director
            .listener_support
            .reset_working_solution(&mut director.working_solution);
        Ok(director)
    }

    /// Enables constraint match tracking, computed from scratch by `analyzer`.
    pub fn with_constraint_matches(
        mut self,
        analyzer: fn(&S) -> Vec<ConstraintMatchTotal<S::Score>>,
    ) -> Self {
        self.match_analyzer = Some(analyzer);
        self
    }

    fn mark_dirty(&mut self) {
        self.score_dirty = true;
    }
}

impl<S, C> ScoreDirector<S> for SimpleScoreDirector<S, C>
where
    S: PlanningSolution,
    C: Fn(&S) -> S::Score + Send + Sync,
{
    fn working_solution(&self) -> &S {
        &self.working_solution
    }

    fn working_solution_mut(&mut self) -> &mut S {
        self.mark_dirty();
        &mut self.working_solution
    }

    fn calculate_score(&mut self) -> S::Score {
        self.calculation_count += 1;
        if !self.score_dirty {
            if let Some(score) = self.cached_score {
                return score;
            }
        }

        let score = (self.score_calculator)(&self.working_solution);
        self.working_solution.set_score(Some(score));
        self.cached_score = Some(score);
        self.score_dirty = false;
        score
    }

    fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        &self.solution_descriptor
    }

    fn clone_working_solution(&self) -> S {
        self.working_solution.clone()
    }

    fn set_working_solution(&mut self, solution: S) {
        self.working_solution = solution;
        self.reset();
    }

    fn before_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) -> Result<()> {
        let Self {
            working_solution,
            listener_support,
            score_dirty,
            ..
        } = self;
        listener_support.before_variable_changed(
            working_solution,
            &mut DirtyFlag(score_dirty),
            VariableKey::new(descriptor_index, variable_name),
            EntityReference::new(descriptor_index, entity_index),
        )
    }

    fn after_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) -> Result<()> {
        let Self {
            working_solution,
            listener_support,
            score_dirty,
            ..
        } = self;
        listener_support.after_variable_changed(
            working_solution,
            &mut DirtyFlag(score_dirty),
            VariableKey::new(descriptor_index, variable_name),
            EntityReference::new(descriptor_index, entity_index),
        )
    }

    fn trigger_variable_listeners(&mut self) -> Result<()> {
        let Self {
            working_solution,
            listener_support,
            score_dirty,
            ..
        } = self;
        listener_support.trigger(working_solution, &mut DirtyFlag(score_dirty))
    }

    fn reset(&mut self) {
        self.listener_support
            .reset_working_solution(&mut self.working_solution);
        self.mark_dirty();
        self.cached_score = None;
    }

    fn calculation_count(&self) -> u64 {
        self.calculation_count
    }

    fn assert_working_score_from_scratch(
        &mut self,
        working_score: S::Score,
        context: &str,
    ) -> Result<()> {
        let uncorrupted = (self.score_calculator)(&self.working_solution);
        if uncorrupted != working_score {
            return Err(SearchForgeError::score_corruption(
                context,
                working_score,
                uncorrupted,
            ));
        }
        Ok(())
    }

    fn assert_shadow_variables_are_not_stale(&mut self, context: &str) -> Result<()> {
        self.listener_support
            .assert_not_stale(&self.working_solution, context)
    }

    fn is_constraint_match_enabled(&self) -> bool {
        self.match_analyzer.is_some()
    }

    fn constraint_match_totals(&mut self) -> Result<Vec<ConstraintMatchTotal<S::Score>>> {
        let analyzer = self.match_analyzer.ok_or_else(|| {
            SearchForgeError::UsageOrder(
                "constraint match totals requested but constraint match tracking is disabled"
                    .to_string(),
            )
        })?;
        Ok(analyzer(&self.working_solution))
    }
}

impl<S: PlanningSolution, C> fmt::Debug for SimpleScoreDirector<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleScoreDirector")
            .field("descriptor", &self.solution_descriptor)
            .field("listeners", &self.listener_support)
            .field("cached_score", &self.cached_score)
            .finish()
    }
}
