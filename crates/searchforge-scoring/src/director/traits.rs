// Score director trait definition.

use searchforge_core::domain::{PlanningSolution, SolutionDescriptor};
use searchforge_core::{ConstraintRef, Result};

use crate::analysis::ConstraintMatchTotal;

// The score director manages the working solution and its score.
//
// It is responsible for:
// - Maintaining the working solution
// - Calculating scores (incrementally when possible)
// - Receiving before/after notifications for every variable change
// - Running variable listeners so shadow variables stay consistent
// - Verifying its own consistency in assert modes
//
// The trait is object safe: problem changes receive `&mut dyn ScoreDirector<S>`.
pub trait ScoreDirector<S: PlanningSolution>: Send {
    fn working_solution(&self) -> &S;

    // Direct mutable access. Changes made through it must still be bracketed
    // by before/after notifications.
    fn working_solution_mut(&mut self) -> &mut S;

    // Returns the current score, applying any pending incremental deltas.
    fn calculate_score(&mut self) -> S::Score;

    fn solution_descriptor(&self) -> &SolutionDescriptor<S>;

    fn clone_working_solution(&self) -> S;

    // Replaces the working solution and re-initializes all derived state.
    fn set_working_solution(&mut self, solution: S);

    // Must be called before a planning variable is changed.
    fn before_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) -> Result<()>;

    // Must be called after a planning variable is changed.
    fn after_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) -> Result<()>;

    // Runs pending variable listeners until every shadow variable is up to date.
    fn trigger_variable_listeners(&mut self) -> Result<()>;

    // Entity additions and removals shift entity indices, so they re-initialize
    // the director once the change is complete.
    fn before_entity_added(&mut self, _descriptor_index: usize) {}

    fn after_entity_added(&mut self, _descriptor_index: usize, _entity_index: usize) {
        self.reset();
    }

    fn before_entity_removed(&mut self, _descriptor_index: usize, _entity_index: usize) {}

    fn after_entity_removed(&mut self, _descriptor_index: usize) {
        self.reset();
    }

    // Problem facts feed arbitrary constraints, so a change re-initializes the director.
    fn before_problem_fact_changed(&mut self) {}

    fn after_problem_fact_changed(&mut self) {
        self.reset();
    }

    fn entity_count(&self, descriptor_index: usize) -> usize {
        self.solution_descriptor()
            .entity_count(self.working_solution(), descriptor_index)
    }

    fn total_entity_count(&self) -> usize {
        self.solution_descriptor()
            .total_entity_count(self.working_solution())
    }

    // Recomputes every shadow variable and discards incremental state.
    fn reset(&mut self);

    // Number of score calculations since the director was built.
    fn calculation_count(&self) -> u64;

    // Recalculates the score from scratch and fails with score corruption
    // when it differs from `working_score`.
    fn assert_working_score_from_scratch(
        &mut self,
        working_score: S::Score,
        context: &str,
    ) -> Result<()>;

    // Recomputes all shadow variables on a clone and fails when any shadow
    // variable of the working solution differs.
    fn assert_shadow_variables_are_not_stale(&mut self, context: &str) -> Result<()>;

    fn is_constraint_match_enabled(&self) -> bool;

    // Fails with a usage-order error when match tracking is disabled.
    fn constraint_match_totals(&mut self) -> Result<Vec<ConstraintMatchTotal<S::Score>>>;

    // Fails when match tracking is disabled or the constraint is not configured.
    fn constraint_match_total(
        &mut self,
        constraint_ref: &ConstraintRef,
    ) -> Result<ConstraintMatchTotal<S::Score>> {
        let totals = self.constraint_match_totals()?;
        totals
            .into_iter()
            .find(|total| &total.constraint_ref == constraint_ref)
            .ok_or_else(|| {
                searchforge_core::SearchForgeError::UsageOrder(format!(
                    "constraint '{}' is not configured on this score director",
                    constraint_ref
                ))
            })
    }
}
