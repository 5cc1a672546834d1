//! Step-level scope.

use searchforge_core::domain::PlanningSolution;
use searchforge_scoring::ScoreDirector;

use super::PhaseScope;

/// Scope for a single step within a phase.
pub struct StepScope<'a, 'b, S: PlanningSolution, D: ScoreDirector<S>> {
    phase_scope: &'a mut PhaseScope<'b, S, D>,
    /// Index of this step within the phase (0-based).
    step_index: u64,
    /// Score after this step.
    step_score: Option<S::Score>,
    selected_move_count: u64,
    accepted_move_count: u64,
}

impl<'a, 'b, S: PlanningSolution, D: ScoreDirector<S>> StepScope<'a, 'b, S, D> {
    pub fn new(phase_scope: &'a mut PhaseScope<'b, S, D>) -> Self {
        let step_index = phase_scope.step_count();
        Self {
            phase_scope,
            step_index,
            step_score: None,
            selected_move_count: 0,
            accepted_move_count: 0,
        }
    }

    pub fn step_index(&self) -> u64 {
        self.step_index
    }

    pub fn step_score(&self) -> Option<&S::Score> {
        self.step_score.as_ref()
    }

    pub fn set_step_score(&mut self, score: S::Score) {
        self.step_score = Some(score);
    }

    pub fn selected_move_count(&self) -> u64 {
        self.selected_move_count
    }

    pub fn accepted_move_count(&self) -> u64 {
        self.accepted_move_count
    }

    /// Records how many moves the step selected and accepted.
    pub fn set_move_counts(&mut self, selected: u64, accepted: u64) {
        self.selected_move_count = selected;
        self.accepted_move_count = accepted;
    }

    /// Marks this step as complete: counts it and carries its score over as
    /// the phase's last step score.
    pub fn complete(&mut self) {
        if let Some(score) = self.step_score {
            self.phase_scope.set_last_step_score(score);
        }
        self.phase_scope.increment_step_count();
    }

    pub fn phase_scope(&self) -> &PhaseScope<'b, S, D> {
        self.phase_scope
    }

    pub fn phase_scope_mut(&mut self) -> &mut PhaseScope<'b, S, D> {
        self.phase_scope
    }

    /// Convenience: returns the score director.
    pub fn score_director(&self) -> &D {
        self.phase_scope.score_director()
    }

    /// Convenience: returns a mutable score director.
    pub fn score_director_mut(&mut self) -> &mut D {
        self.phase_scope.score_director_mut()
    }
}
