//! Mutation surface handed to problem changes.

use searchforge_core::domain::PlanningSolution;
use searchforge_core::{Result, SearchForgeError};
use searchforge_scoring::ScoreDirector;

/// Applies problem change mutations through the score director's
/// before/after protocol.
///
/// Each method takes a closure doing the raw mutation and wraps it in the
/// matching notifications. Entity additions and removals and fact changes
/// re-initialize the score director afterwards; variable changes are tracked
/// incrementally.
pub struct ProblemChangeDirector<'a, S: PlanningSolution> {
    score_director: &'a mut dyn ScoreDirector<S>,
}

impl<'a, S: PlanningSolution> ProblemChangeDirector<'a, S> {
    pub fn new(score_director: &'a mut dyn ScoreDirector<S>) -> Self {
        Self { score_director }
    }

    pub fn working_solution(&self) -> &S {
        self.score_director.working_solution()
    }

    pub fn entity_count(&self, descriptor_index: usize) -> usize {
        self.score_director.entity_count(descriptor_index)
    }

    /// Finds the working entity with the given planning id.
    pub fn lookup_working_entity(&self, descriptor_index: usize, planning_id: u64) -> Option<usize> {
        self.score_director.solution_descriptor().lookup_entity(
            self.score_director.working_solution(),
            descriptor_index,
            planning_id,
        )
    }

    /// Adds an entity. `add` mutates the solution and returns the new
    /// entity's index.
    pub fn add_entity(
        &mut self,
        descriptor_index: usize,
        add: impl FnOnce(&mut S) -> usize,
    ) -> Result<usize> {
        self.check_descriptor(descriptor_index)?;
        self.score_director.before_entity_added(descriptor_index);
        let entity_index = add(self.score_director.working_solution_mut());
        if entity_index >= self.score_director.entity_count(descriptor_index) {
            return Err(SearchForgeError::Internal(format!(
                "added entity index {} is out of range for descriptor {}",
                entity_index, descriptor_index
            )));
        }
        self.score_director
            .after_entity_added(descriptor_index, entity_index);
        Ok(entity_index)
    }

    /// Removes the entity at `entity_index`. `remove` does the removal.
    pub fn remove_entity(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        remove: impl FnOnce(&mut S),
    ) -> Result<()> {
        self.check_entity(descriptor_index, entity_index)?;
        self.score_director
            .before_entity_removed(descriptor_index, entity_index);
        remove(self.score_director.working_solution_mut());
        self.score_director.after_entity_removed(descriptor_index);
        Ok(())
    }

    /// Changes one planning variable of one entity.
    pub fn change_variable(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
        change: impl FnOnce(&mut S),
    ) -> Result<()> {
        self.check_entity(descriptor_index, entity_index)?;
        self.score_director
            .before_variable_changed(descriptor_index, entity_index, variable_name)?;
        change(self.score_director.working_solution_mut());
        self.score_director
            .after_variable_changed(descriptor_index, entity_index, variable_name)
    }

    /// Changes a problem fact in place.
    pub fn change_problem_fact(&mut self, change: impl FnOnce(&mut S)) {
        self.score_director.before_problem_fact_changed();
        change(self.score_director.working_solution_mut());
        self.score_director.after_problem_fact_changed();
    }

    pub fn add_problem_fact(&mut self, add: impl FnOnce(&mut S)) {
        self.change_problem_fact(add);
    }

    pub fn remove_problem_fact(&mut self, remove: impl FnOnce(&mut S)) {
        self.change_problem_fact(remove);
    }

    /// Runs pending variable listeners so shadow variables catch up with the
    /// changes made so far.
    pub fn update_shadow_variables(&mut self) -> Result<()> {
        self.score_director.trigger_variable_listeners()
    }

    fn check_descriptor(&self, descriptor_index: usize) -> Result<()> {
        if self
            .score_director
            .solution_descriptor()
            .entity_descriptor(descriptor_index)
            .is_none()
        {
            return Err(SearchForgeError::DomainModel(format!(
                "no entity descriptor at index {}",
                descriptor_index
            )));
        }
        Ok(())
    }

    fn check_entity(&self, descriptor_index: usize, entity_index: usize) -> Result<()> {
        self.check_descriptor(descriptor_index)?;
        let count = self.score_director.entity_count(descriptor_index);
        if entity_index >= count {
            return Err(SearchForgeError::Internal(format!(
                "entity index {} is out of range ({} entities of descriptor {})",
                entity_index, count, descriptor_index
            )));
        }
        Ok(())
    }
}
