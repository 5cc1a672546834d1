//! Solver-level scope.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use searchforge_config::EnvironmentMode;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::Result;
use searchforge_scoring::ScoreDirector;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::realtime::{ProblemChangeDirector, ProblemChangeReceiver};
use crate::termination::{Progress, Termination};

/// Top-level scope for the entire solving process.
///
/// Owns the score director, so the working solution lives here for the whole
/// run. Generic over `D: ScoreDirector<S>` for zero type erasure.
pub struct SolverScope<S: PlanningSolution, D: ScoreDirector<S>> {
    score_director: D,
    environment_mode: EnvironmentMode,
    rng: StdRng,
    best_solution: Option<S>,
    best_score: Option<S::Score>,
    starting_score: Option<S::Score>,
    // Total step count and instant of the last best score improvement.
    best_step_count: u64,
    best_time: Option<Instant>,
    start_time: Option<Instant>,
    total_step_count: u64,
    phase_count: usize,
    termination: Option<Box<dyn Termination<S>>>,
    terminate_early_flag: Option<Arc<AtomicBool>>,
    problem_changes: Option<ProblemChangeReceiver<S>>,
    best_solution_sender: Option<mpsc::UnboundedSender<(S, S::Score)>>,
}

impl<S: PlanningSolution, D: ScoreDirector<S>> SolverScope<S, D> {
    /// Creates a scope whose random source is seeded by the operating system.
    pub fn new(score_director: D) -> Self {
        Self::with_rng(score_director, StdRng::from_os_rng())
    }

    pub fn with_seed(score_director: D, seed: u64) -> Self {
        Self::with_rng(score_director, StdRng::seed_from_u64(seed))
    }

    fn with_rng(score_director: D, rng: StdRng) -> Self {
        Self {
            score_director,
            environment_mode: EnvironmentMode::default(),
            rng,
            best_solution: None,
            best_score: None,
            starting_score: None,
            best_step_count: 0,
            best_time: None,
            start_time: None,
            total_step_count: 0,
            phase_count: 0,
            termination: None,
            terminate_early_flag: None,
            problem_changes: None,
            best_solution_sender: None,
        }
    }

    pub fn with_environment_mode(mut self, environment_mode: EnvironmentMode) -> Self {
        self.environment_mode = environment_mode;
        self
    }

    /// Sets the solver-level termination, checked by every phase.
    pub fn with_termination(mut self, termination: Box<dyn Termination<S>>) -> Self {
        self.termination = Some(termination);
        self
    }

    pub fn with_terminate_early_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.terminate_early_flag = Some(flag);
        self
    }

    pub fn with_problem_changes(mut self, receiver: ProblemChangeReceiver<S>) -> Self {
        self.problem_changes = Some(receiver);
        self
    }

    /// Every new best solution is sent to `sender` with its score.
    pub fn with_best_solution_sender(mut self, sender: mpsc::UnboundedSender<(S, S::Score)>) -> Self {
        self.best_solution_sender = Some(sender);
        self
    }

    /// Starts the clock and records the working solution as the first best
    /// solution.
    pub fn start_solving(&mut self) -> Result<()> {
        let now = Instant::now();
        self.start_time = Some(now);
        self.total_step_count = 0;
        self.phase_count = 0;
        let score = self.score_director.calculate_score();
        if self.environment_mode.is_asserted() {
            self.score_director
                .assert_working_score_from_scratch(score, "solving started")?;
        }
        self.starting_score = Some(score);
        self.record_best(score, now);
        Ok(())
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.start_time.map(|t| t.elapsed())
    }

    pub fn environment_mode(&self) -> EnvironmentMode {
        self.environment_mode
    }

    pub fn score_director(&self) -> &D {
        &self.score_director
    }

    pub fn score_director_mut(&mut self) -> &mut D {
        &mut self.score_director
    }

    /// Splits the borrow so a selector can pull from the random source while
    /// reading the director.
    pub fn director_and_rng(&mut self) -> (&mut D, &mut StdRng) {
        (&mut self.score_director, &mut self.rng)
    }

    pub fn working_solution(&self) -> &S {
        self.score_director.working_solution()
    }

    pub fn calculate_score(&mut self) -> S::Score {
        self.score_director.calculate_score()
    }

    pub fn best_solution(&self) -> Option<&S> {
        self.best_solution.as_ref()
    }

    pub fn best_score(&self) -> Option<&S::Score> {
        self.best_score.as_ref()
    }

    pub fn starting_score(&self) -> Option<&S::Score> {
        self.starting_score.as_ref()
    }

    /// Records the working solution as the best solution if its score beats
    /// the best score. Returns true on improvement.
    pub fn update_best_solution(&mut self) -> bool {
        let current_score = self.score_director.calculate_score();
        let is_better = match &self.best_score {
            None => true,
            Some(best) => current_score > *best,
        };
        if is_better {
            self.record_best(current_score, Instant::now());
        }
        is_better
    }

    fn record_best(&mut self, score: S::Score, now: Instant) {
        let mut solution = self.score_director.clone_working_solution();
        solution.set_score(Some(score));
        if let Some(sender) = &self.best_solution_sender {
            // A dropped receiver only means nobody listens anymore.
            let _ = sender.send((solution.clone(), score));
        }
        self.best_solution = Some(solution);
        self.best_score = Some(score);
        self.best_step_count = self.total_step_count;
        self.best_time = Some(now);
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn increment_step_count(&mut self) -> u64 {
        self.total_step_count += 1;
        self.total_step_count
    }

    pub fn total_step_count(&self) -> u64 {
        self.total_step_count
    }

    /// Returns the index of the next phase and counts it.
    pub(crate) fn next_phase_index(&mut self) -> usize {
        let index = self.phase_count;
        self.phase_count += 1;
        index
    }

    pub fn phase_count(&self) -> usize {
        self.phase_count
    }

    pub fn score_calculation_count(&self) -> u64 {
        self.score_director.calculation_count()
    }

    /// Snapshot of the whole run for solver-level terminations.
    pub fn progress(&self) -> Progress<S::Score> {
        let now = Instant::now();
        Progress {
            elapsed: self.start_time.map_or(Duration::ZERO, |t| now - t),
            step_count: self.total_step_count,
            unimproved_step_count: self.total_step_count - self.best_step_count,
            unimproved_elapsed: self.best_time.map_or(Duration::ZERO, |t| now - t),
            starting_score: self.starting_score,
            best_score: self.best_score,
            score_calculation_count: self.score_calculation_count(),
        }
    }

    pub fn termination(&self) -> Option<&dyn Termination<S>> {
        self.termination.as_deref()
    }

    pub fn take_termination(&mut self) -> Option<Box<dyn Termination<S>>> {
        self.termination.take()
    }

    pub fn is_terminate_early(&self) -> bool {
        self.terminate_early_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Returns true if the run must stop: early termination was requested
    /// or the solver-level termination fired.
    pub fn is_solver_terminated(&self) -> bool {
        if self.is_terminate_early() {
            return true;
        }
        self.termination
            .as_ref()
            .is_some_and(|termination| termination.is_terminated(&self.progress()))
    }

    /// Time gradient of the solver-level termination, if it has one.
    pub fn time_gradient(&self) -> Option<f64> {
        self.termination
            .as_ref()
            .and_then(|termination| termination.time_gradient(&self.progress()))
    }

    pub fn has_pending_problem_changes(&self) -> bool {
        self.problem_changes
            .as_ref()
            .is_some_and(ProblemChangeReceiver::has_pending)
    }

    /// Applies every queued problem change to the working solution.
    ///
    /// Each change goes through the director's before/after notifications.
    /// Afterwards the shadow variables are refreshed, the director is reset
    /// and the changed working solution becomes the new best solution, since
    /// the old best solution no longer describes the problem. Returns the
    /// number of applied changes.
    pub fn apply_problem_changes(&mut self) -> Result<usize> {
        let Some(receiver) = &mut self.problem_changes else {
            return Ok(0);
        };
        let changes = receiver.drain_pending();
        if changes.is_empty() {
            return Ok(0);
        }
        for change in &changes {
            debug!(event = "problem_change", change = ?change);
            let mut change_director = ProblemChangeDirector::new(&mut self.score_director);
            change.apply(&mut change_director)?;
        }
        self.score_director.trigger_variable_listeners()?;
        self.score_director.reset();
        let score = self.score_director.calculate_score();
        if self.environment_mode.is_asserted() {
            self.score_director
                .assert_working_score_from_scratch(score, "problem changes applied")?;
        }
        self.record_best(score, Instant::now());
        info!(
            event = "problem_changes_applied",
            count = changes.len(),
            score = %score,
        );
        Ok(changes.len())
    }

    pub fn take_problem_changes(&mut self) -> Option<ProblemChangeReceiver<S>> {
        self.problem_changes.take()
    }

    pub fn take_best_or_working_solution(self) -> S {
        self.best_solution
            .unwrap_or_else(|| self.score_director.clone_working_solution())
    }
}
