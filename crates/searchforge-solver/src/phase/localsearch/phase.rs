//! Local search phase implementation.

use std::fmt::{self, Debug};

use searchforge_core::domain::PlanningSolution;
use searchforge_core::Result;
use searchforge_scoring::ScoreDirector;
use tracing::{debug, info, warn};

use super::acceptor::{Acceptor, StepContext};
use super::decider::{LocalSearchDecider, StepDecision};
use crate::heuristic::r#move::Move;
use crate::heuristic::selector::Selector;
use crate::phase::Phase;
use crate::scope::{PhaseScope, SolverScope, StepScope};
use crate::termination::Termination;

const PHASE_NAME: &str = "Local Search";

/// Local search phase that improves an initialized solution step by step.
///
/// Each step:
/// 1. Applies queued problem changes, restarting the phase if there were any
/// 2. Lets the decider evaluate moves and pick one
/// 3. Does the picked move and updates the best solution on improvement
///
/// A step where nothing is accepted still counts, but changes nothing. The
/// phase ends when a termination fires or when no doable move is selected.
///
/// # Type Parameters
/// * `S` - The planning solution type
/// * `M` - The move type
/// * `MS` - The move selector type
/// * `A` - The acceptor type
pub struct LocalSearchPhase<S: PlanningSolution, M: Move<S>, MS, A> {
    decider: LocalSearchDecider<S, M, MS, A>,
    termination: Option<Box<dyn Termination<S>>>,
}

impl<S, M, MS, A> LocalSearchPhase<S, M, MS, A>
where
    S: PlanningSolution,
    M: Move<S>,
    MS: Selector<S, Item = M>,
    A: Acceptor<S, M>,
{
    pub fn new(decider: LocalSearchDecider<S, M, MS, A>) -> Self {
        Self {
            decider,
            termination: None,
        }
    }

    /// Sets a termination that ends only this phase.
    pub fn with_termination(mut self, termination: Box<dyn Termination<S>>) -> Self {
        self.termination = Some(termination);
        self
    }

    pub fn decider(&self) -> &LocalSearchDecider<S, M, MS, A> {
        &self.decider
    }

    fn run_steps<D: ScoreDirector<S>>(
        decider: &mut LocalSearchDecider<S, M, MS, A>,
        phase_scope: &mut PhaseScope<'_, S, D>,
        termination: Option<&dyn Termination<S>>,
    ) -> Result<()> {
        loop {
            if phase_scope.solver_scope().has_pending_problem_changes() {
                decider.phase_ended(phase_scope)?;
                phase_scope.solver_scope_mut().apply_problem_changes()?;
                phase_scope.restart();
                decider.phase_started(phase_scope)?;
            }
            if phase_scope.is_terminated(termination) {
                return Ok(());
            }

            let last_step_score = match phase_scope.last_step_score() {
                Some(score) => *score,
                None => phase_scope.calculate_score(),
            };
            let step = StepContext {
                step_index: phase_scope.step_count(),
                last_step_score,
                best_score: phase_scope.best_score().copied().unwrap_or(last_step_score),
                time_gradient: phase_scope.time_gradient(termination),
            };

            let mut step_scope = StepScope::new(phase_scope);
            decider.step_started(&mut step_scope, &step)?;
            match decider.decide_next_step(&mut step_scope, &step, termination)? {
                StepDecision::Picked { step_move, score } => {
                    let step_score = decider.take_step(&mut step_scope, &step, &step_move, score)?;
                    step_scope.set_step_score(step_score);
                    decider.step_ended(&mut step_scope)?;
                    step_scope.complete();
                    let improved = step_scope.phase_scope_mut().update_best_solution();
                    debug!(
                        event = "step",
                        step_index = step.step_index,
                        step_score = %step_score,
                        best_score = %step_scope.phase_scope().best_score().copied().unwrap_or(step_score),
                        new_best = improved,
                        selected_count = step_scope.selected_move_count(),
                        accepted_count = step_scope.accepted_move_count(),
                        step_move = ?step_move,
                    );
                }
                StepDecision::NothingAccepted => {
                    warn!(
                        event = "step_without_move",
                        step_index = step.step_index,
                        selected_count = step_scope.selected_move_count(),
                        score = %last_step_score,
                    );
                    step_scope.set_step_score(last_step_score);
                    decider.step_ended(&mut step_scope)?;
                    step_scope.complete();
                }
                StepDecision::NothingDoable => {
                    info!(
                        event = "no_doable_move",
                        step_index = step.step_index,
                        selected_count = step_scope.selected_move_count(),
                    );
                    decider.step_ended(&mut step_scope)?;
                    return Ok(());
                }
                StepDecision::Terminated => {
                    decider.step_ended(&mut step_scope)?;
                    return Ok(());
                }
            }
        }
    }
}

impl<S, D, M, MS, A> Phase<S, D> for LocalSearchPhase<S, M, MS, A>
where
    S: PlanningSolution,
    D: ScoreDirector<S>,
    M: Move<S>,
    MS: Selector<S, Item = M>,
    A: Acceptor<S, M>,
{
    fn solving_started(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        self.decider.solving_started(solver_scope)
    }

    fn solve(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        let Self {
            decider,
            termination,
        } = self;
        let termination = termination.as_deref();
        if termination.is_none() && solver_scope.termination().is_none() {
            warn!(
                event = "no_termination",
                phase = PHASE_NAME,
                "local search only stops on an early termination request or when no move is doable",
            );
        }

        let mut phase_scope = PhaseScope::new(solver_scope);
        let phase_index = phase_scope.phase_index();
        let starting_score = phase_scope.calculate_score();
        phase_scope.set_last_step_score(starting_score);
        info!(
            event = "phase_start",
            phase = PHASE_NAME,
            phase_index,
            score = %starting_score,
            multithreaded = decider.is_multithreaded(),
        );

        decider.phase_started(&mut phase_scope)?;
        let outcome = Self::run_steps(decider, &mut phase_scope, termination);
        let ended = decider.phase_ended(&mut phase_scope);
        outcome?;
        ended?;

        let duration = phase_scope.elapsed();
        let calculations = phase_scope.progress().score_calculation_count;
        let speed = if duration.as_secs_f64() > 0.0 {
            (calculations as f64 / duration.as_secs_f64()) as u64
        } else {
            0
        };
        info!(
            event = "phase_end",
            phase = PHASE_NAME,
            phase_index,
            duration_ms = duration.as_millis() as u64,
            steps = phase_scope.step_count(),
            speed,
            score = %phase_scope.best_score().copied().unwrap_or(starting_score),
        );
        Ok(())
    }

    fn solving_ended(&mut self, solver_scope: &mut SolverScope<S, D>) -> Result<()> {
        self.decider.solving_ended(solver_scope)
    }

    fn phase_type_name(&self) -> &'static str {
        "LocalSearch"
    }
}

impl<S, M, MS, A> Debug for LocalSearchPhase<S, M, MS, A>
where
    S: PlanningSolution,
    M: Move<S>,
    MS: Debug,
    A: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSearchPhase")
            .field("decider", &self.decider)
            .field("termination", &self.termination)
            .finish()
    }
}
