//! Solver implementation.

use std::fmt::{self, Debug};
use std::time::Instant;

use searchforge_config::EnvironmentMode;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::Result;
use searchforge_scoring::ScoreDirector;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::phase::Phase;
use crate::realtime::{ProblemChangeReceiver, SolverHandle};
use crate::scope::SolverScope;
use crate::termination::Termination;

/// Seed used by reproducible and asserted runs that do not set one.
pub const DEFAULT_RANDOM_SEED: u64 = 0;

/// The main solver that optimizes planning solutions.
///
/// Runs its phases in order on one working solution. The solver-level
/// termination and early termination requests from a [`SolverHandle`] are
/// checked between phases and inside every phase.
///
/// # Type Parameters
/// * `S` - Solution type
/// * `D` - Score director type
///
/// # Example
///
/// ```
/// use searchforge_core::SimpleScore;
/// use searchforge_scoring::SimpleScoreDirector;
/// use searchforge_solver::heuristic::selector::ChangeMoveSelector;
/// use searchforge_solver::phase::localsearch::{
///     HillClimbingAcceptor, LocalSearchDecider, LocalSearchForager, LocalSearchPhase,
/// };
/// use searchforge_solver::termination::StepCountTermination;
/// use searchforge_solver::Solver;
/// use searchforge_test::pair::{self, PairSolution};
///
/// let selector = ChangeMoveSelector::from_solution(
///     pair::get_value, pair::set_value, 0, "value", pair::value_range, false,
/// );
/// let decider =
///     LocalSearchDecider::new(selector, HillClimbingAcceptor::new(), LocalSearchForager::new())
///         .unwrap();
///
/// let mut solver = Solver::new()
///     .with_phase(LocalSearchPhase::new(decider))
///     .with_termination(Box::new(StepCountTermination::new(3)))
///     .with_random_seed(1);
///
/// let director = SimpleScoreDirector::new(
///     PairSolution::with_values(&[2, 2]),
///     pair::create_pair_descriptor(),
///     pair::calculate_conflicts as fn(&PairSolution) -> SimpleScore,
/// );
/// let best = solver.solve(director).unwrap();
/// assert_eq!(best.score, Some(SimpleScore::of(0)));
/// ```
pub struct Solver<S: PlanningSolution, D: ScoreDirector<S>> {
    phases: Vec<Box<dyn Phase<S, D>>>,
    termination: Option<Box<dyn Termination<S>>>,
    environment_mode: EnvironmentMode,
    random_seed: Option<u64>,
    handle: SolverHandle<S>,
    problem_changes: Option<ProblemChangeReceiver<S>>,
    best_solution_sender: Option<mpsc::UnboundedSender<(S, S::Score)>>,
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Solver<S, D> {
    /// Creates a solver without phases or termination.
    pub fn new() -> Self {
        let (handle, receiver) = SolverHandle::new();
        Self {
            phases: Vec::new(),
            termination: None,
            environment_mode: EnvironmentMode::default(),
            random_seed: None,
            handle,
            problem_changes: Some(receiver),
            best_solution_sender: None,
        }
    }

    /// Appends a phase. Phases run in the order they were added.
    pub fn with_phase(mut self, phase: impl Phase<S, D> + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    pub fn with_boxed_phase(mut self, phase: Box<dyn Phase<S, D>>) -> Self {
        self.phases.push(phase);
        self
    }

    /// Sets the termination checked by every phase.
    pub fn with_termination(mut self, termination: Box<dyn Termination<S>>) -> Self {
        self.termination = Some(termination);
        self
    }

    pub fn with_environment_mode(mut self, environment_mode: EnvironmentMode) -> Self {
        self.environment_mode = environment_mode;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Every new best solution is sent to `sender` while solving.
    pub fn with_best_solution_sender(mut self, sender: mpsc::UnboundedSender<(S, S::Score)>) -> Self {
        self.best_solution_sender = Some(sender);
        self
    }

    /// Handle for problem changes and early termination from other threads.
    pub fn handle(&self) -> SolverHandle<S> {
        self.handle.clone()
    }

    pub fn is_solving(&self) -> bool {
        self.handle.is_solving()
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn environment_mode(&self) -> EnvironmentMode {
        self.environment_mode
    }

    /// The seed this run uses: the configured one, a fixed one for
    /// reproducible modes, or `None` for an OS-seeded random source.
    pub fn effective_random_seed(&self) -> Option<u64> {
        match self.random_seed {
            Some(seed) => Some(seed),
            None if self.environment_mode.is_reproducible() => Some(DEFAULT_RANDOM_SEED),
            None => None,
        }
    }

    /// Solves the working solution of `score_director` and returns the best
    /// solution found, with its score set.
    ///
    /// The solver can run again afterwards; every run starts from the given
    /// director.
    pub fn solve(&mut self, score_director: D) -> Result<S> {
        let mut solver_scope = match self.effective_random_seed() {
            Some(seed) => SolverScope::with_seed(score_director, seed),
            None => SolverScope::new(score_director),
        }
        .with_environment_mode(self.environment_mode);
        if let Some(termination) = self.termination.take() {
            solver_scope = solver_scope.with_termination(termination);
        }
        if let Some(receiver) = self.problem_changes.take() {
            receiver.set_solving(true);
            solver_scope = solver_scope
                .with_terminate_early_flag(receiver.terminate_early_flag())
                .with_problem_changes(receiver);
        }
        if let Some(sender) = &self.best_solution_sender {
            solver_scope = solver_scope.with_best_solution_sender(sender.clone());
        }

        let outcome = self.run_phases(&mut solver_scope);

        self.termination = solver_scope.take_termination();
        if let Some(receiver) = solver_scope.take_problem_changes() {
            receiver.set_solving(false);
            self.problem_changes = Some(receiver);
        }
        outcome?;
        Ok(solver_scope.take_best_or_working_solution())
    }

    fn run_phases(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        let started = Instant::now();
        solver_scope.start_solving()?;
        info!(
            event = "solving_start",
            environment_mode = ?self.environment_mode,
            random_seed = ?self.effective_random_seed(),
            phases = self.phases.len(),
            score = %solver_scope.starting_score().copied().unwrap_or_default(),
        );

        for phase in &mut self.phases {
            phase.solving_started(solver_scope)?;
        }
        for (phase_index, phase) in self.phases.iter_mut().enumerate() {
            if solver_scope.is_solver_terminated() {
                debug!(
                    event = "phase_skipped",
                    phase_index,
                    phase = phase.phase_type_name(),
                );
                break;
            }
            phase.solve(solver_scope)?;
        }
        for phase in &mut self.phases {
            phase.solving_ended(solver_scope)?;
        }

        info!(
            event = "solving_end",
            duration_ms = started.elapsed().as_millis() as u64,
            steps = solver_scope.total_step_count(),
            score_calculations = solver_scope.score_calculation_count(),
            score = %solver_scope.best_score().copied().unwrap_or_default(),
        );
        Ok(())
    }
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Default for Solver<S, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Debug for Solver<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Solver")
            .field("phases", &self.phases)
            .field("termination", &self.termination)
            .field("environment_mode", &self.environment_mode)
            .field("random_seed", &self.random_seed)
            .finish()
    }
}
