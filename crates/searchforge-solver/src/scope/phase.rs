//! Phase-level scope.

use std::time::{Duration, Instant};

use searchforge_core::domain::PlanningSolution;
use searchforge_scoring::ScoreDirector;

use super::SolverScope;
use crate::termination::{Progress, Termination};

/// Scope for a single phase of solving.
///
/// # Type Parameters
/// * `'a` - Lifetime of the solver scope reference
/// * `S` - The planning solution type
/// * `D` - The score director type
pub struct PhaseScope<'a, S: PlanningSolution, D: ScoreDirector<S>> {
    /// Reference to the parent solver scope.
    solver_scope: &'a mut SolverScope<S, D>,
    /// Index of this phase (0-based) within the run.
    phase_index: usize,
    /// Best score at the start of this phase.
    starting_score: Option<S::Score>,
    /// Number of steps in this phase.
    step_count: u64,
    /// Phase step count at the last best score improvement.
    best_step_count: u64,
    start_time: Instant,
    best_time: Instant,
    starting_calculation_count: u64,
    last_step_score: Option<S::Score>,
}

impl<'a, S: PlanningSolution, D: ScoreDirector<S>> PhaseScope<'a, S, D> {
    /// Creates a new phase scope and claims the next phase index.
    pub fn new(solver_scope: &'a mut SolverScope<S, D>) -> Self {
        let phase_index = solver_scope.next_phase_index();
        let starting_score = solver_scope.best_score().copied();
        let starting_calculation_count = solver_scope.score_calculation_count();
        let now = Instant::now();
        Self {
            solver_scope,
            phase_index,
            starting_score,
            step_count: 0,
            best_step_count: 0,
            start_time: now,
            best_time: now,
            starting_calculation_count,
            last_step_score: None,
        }
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn starting_score(&self) -> Option<&S::Score> {
        self.starting_score.as_ref()
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Increments both the phase and the solver step counts.
    pub fn increment_step_count(&mut self) -> u64 {
        self.step_count += 1;
        self.solver_scope.increment_step_count();
        self.step_count
    }

    /// Score of the last completed step, or of the phase start.
    pub fn last_step_score(&self) -> Option<&S::Score> {
        self.last_step_score.as_ref()
    }

    pub fn set_last_step_score(&mut self, score: S::Score) {
        self.last_step_score = Some(score);
    }

    pub fn solver_scope(&self) -> &SolverScope<S, D> {
        self.solver_scope
    }

    pub fn solver_scope_mut(&mut self) -> &mut SolverScope<S, D> {
        self.solver_scope
    }

    pub fn score_director(&self) -> &D {
        self.solver_scope.score_director()
    }

    pub fn score_director_mut(&mut self) -> &mut D {
        self.solver_scope.score_director_mut()
    }

    pub fn calculate_score(&mut self) -> S::Score {
        self.solver_scope.calculate_score()
    }

    pub fn best_score(&self) -> Option<&S::Score> {
        self.solver_scope.best_score()
    }

    /// Updates the best solution. Returns true on improvement.
    pub fn update_best_solution(&mut self) -> bool {
        let improved = self.solver_scope.update_best_solution();
        if improved {
            self.best_step_count = self.step_count;
            self.best_time = Instant::now();
        }
        improved
    }

    /// Restarts the phase clocks after the problem changed underneath it.
    pub fn restart(&mut self) {
        let now = Instant::now();
        self.starting_score = self.solver_scope.best_score().copied();
        self.best_step_count = self.step_count;
        self.best_time = now;
        self.last_step_score = self.starting_score;
    }

    /// Snapshot of this phase for phase-level terminations.
    pub fn progress(&self) -> Progress<S::Score> {
        let now = Instant::now();
        Progress {
            elapsed: now - self.start_time,
            step_count: self.step_count,
            unimproved_step_count: self.step_count - self.best_step_count,
            unimproved_elapsed: now - self.best_time,
            starting_score: self.starting_score,
            best_score: self.solver_scope.best_score().copied(),
            score_calculation_count: self
                .solver_scope
                .score_calculation_count()
                .saturating_sub(self.starting_calculation_count),
        }
    }

    /// Returns true if the solver or the given phase termination asks to stop.
    pub fn is_terminated(&self, phase_termination: Option<&dyn Termination<S>>) -> bool {
        self.solver_scope.is_solver_terminated()
            || phase_termination.is_some_and(|t| t.is_terminated(&self.progress()))
    }

    /// Time gradient of the phase: the furthest along of the solver and phase
    /// terminations, or 0 when neither can tell.
    pub fn time_gradient(&self, phase_termination: Option<&dyn Termination<S>>) -> f64 {
        let phase = phase_termination.and_then(|t| t.time_gradient(&self.progress()));
        let solver = self.solver_scope.time_gradient();
        match (phase, solver) {
            (Some(a), Some(b)) => a.max(b),
            (Some(g), None) | (None, Some(g)) => g,
            (None, None) => 0.0,
        }
        .clamp(0.0, 1.0)
    }
}
