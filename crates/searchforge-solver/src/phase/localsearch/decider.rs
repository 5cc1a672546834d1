//! Local search decider: picks the move of each step.

use std::fmt::{self, Debug};

use rand::rngs::StdRng;
use searchforge_config::EnvironmentMode;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::{Result, SearchForgeError};
use searchforge_scoring::ScoreDirector;
use tracing::{debug, trace};

use super::acceptor::{Acceptor, Candidate, PhaseContext, StepContext, TakenStep};
use super::forager::LocalSearchForager;
use super::multithreaded::MoveEvaluator;
use crate::heuristic::r#move::Move;
use crate::heuristic::selector::{Selector, SelectorEvent};
use crate::scope::{PhaseScope, SolverScope, StepScope};
use crate::termination::Termination;

/// Outcome of one step's move evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum StepDecision<M, Sc> {
    /// The forager picked `step_move`, which leads to `score`.
    Picked { step_move: M, score: Sc },
    /// Doable moves were evaluated but none was accepted.
    NothingAccepted,
    /// The move selector yielded no doable move at all.
    NothingDoable,
    /// A termination fired before any move was accepted.
    Terminated,
}

/// Runs the per-step evaluation loop of a local search phase.
///
/// For every selected move: skip it if not doable, otherwise do it, score
/// it, undo it and ask the acceptor. Accepted moves go to the forager, which
/// may end the step early. Evaluation also stops when a termination fires.
///
/// With a [`MoveEvaluator`], moves are selected in batches and scored on
/// worker threads; acceptance and foraging still happen here, in selection
/// order.
///
/// A never-ending move selector cannot run out of moves, so a step over one
/// also ends after [`unaccepted_move_limit`](Self::with_unaccepted_move_limit)
/// selected moves in a row were not accepted.
pub struct LocalSearchDecider<S: PlanningSolution, M: Move<S>, MS, A> {
    move_selector: MS,
    acceptor: A,
    forager: LocalSearchForager<S, M>,
    evaluator: Option<Box<dyn MoveEvaluator<S, M>>>,
    unaccepted_move_limit: u64,
}

/// Selected moves in a row without an accepted one after which a step over a
/// never-ending move selector gives up.
pub const DEFAULT_UNACCEPTED_MOVE_LIMIT: u64 = 10_000;

#[derive(Debug, Default)]
struct MoveCounts {
    selected: u64,
    doable: u64,
    unaccepted_in_a_row: u64,
    terminated: bool,
}

impl MoveCounts {
    fn record(&mut self, foraged: Foraged) {
        match foraged {
            Foraged::Rejected => self.unaccepted_in_a_row += 1,
            Foraged::Accepted | Foraged::QuitEarly => self.unaccepted_in_a_row = 0,
        }
    }
}

/// What the acceptor and the forager made of one evaluated move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Foraged {
    Rejected,
    Accepted,
    QuitEarly,
}

impl<S, M, MS, A> LocalSearchDecider<S, M, MS, A>
where
    S: PlanningSolution,
    M: Move<S>,
    MS: Selector<S, Item = M>,
    A: Acceptor<S, M>,
{
    /// Fails if the move selector never ends and the forager neither has an
    /// accepted count limit nor picks early: such a step could only end by
    /// termination.
    pub fn new(move_selector: MS, acceptor: A, forager: LocalSearchForager<S, M>) -> Result<Self> {
        if move_selector.is_never_ending() && !forager.supports_never_ending_move_selector() {
            return Err(SearchForgeError::Config(
                "the move selector is never ending and the forager has no accepted_count_limit \
                 or pick_early_type, so a step would never end"
                    .to_string(),
            ));
        }
        Ok(Self {
            move_selector,
            acceptor,
            forager,
            evaluator: None,
            unaccepted_move_limit: DEFAULT_UNACCEPTED_MOVE_LIMIT,
        })
    }

    /// Bounds a step over a never-ending move selector: after `limit` selected
    /// moves in a row without an accepted one, the step stops selecting.
    pub fn with_unaccepted_move_limit(mut self, limit: u64) -> Self {
        self.unaccepted_move_limit = limit.max(1);
        self
    }

    // True once a never-ending selector has gone on too long without an
    // accepted move.
    fn gives_up(&self, counts: &MoveCounts) -> bool {
        self.move_selector.is_never_ending()
            && counts.unaccepted_in_a_row >= self.unaccepted_move_limit
    }

    /// Scores moves on worker threads.
    pub fn with_move_evaluator(mut self, evaluator: Box<dyn MoveEvaluator<S, M>>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn move_selector(&self) -> &MS {
        &self.move_selector
    }

    pub fn acceptor(&self) -> &A {
        &self.acceptor
    }

    pub fn forager(&self) -> &LocalSearchForager<S, M> {
        &self.forager
    }

    pub fn is_multithreaded(&self) -> bool {
        self.evaluator.is_some()
    }

    pub fn solving_started<D: ScoreDirector<S>>(
        &mut self,
        solver_scope: &mut SolverScope<S, D>,
    ) -> Result<()> {
        let (director, rng) = solver_scope.director_and_rng();
        self.move_selector
            .lifecycle(SelectorEvent::SolvingStarted, &*director, rng)
    }

    pub fn phase_started<D: ScoreDirector<S>>(
        &mut self,
        phase_scope: &mut PhaseScope<'_, S, D>,
    ) -> Result<()> {
        let initial_score = phase_scope.calculate_score();
        let context = PhaseContext {
            initial_score,
            best_score: phase_scope.best_score().copied().unwrap_or(initial_score),
            total_entity_count: phase_scope.score_director().total_entity_count(),
        };
        let (director, rng) = phase_scope.solver_scope_mut().director_and_rng();
        self.move_selector
            .lifecycle(SelectorEvent::PhaseStarted, &*director, rng)?;
        self.acceptor.phase_started(&context);
        Ok(())
    }

    pub fn step_started<D: ScoreDirector<S>>(
        &mut self,
        step_scope: &mut StepScope<'_, '_, S, D>,
        step: &StepContext<S::Score>,
    ) -> Result<()> {
        self.forager.step_started(step);
        self.acceptor.step_started(step);
        let (director, rng) = step_scope
            .phase_scope_mut()
            .solver_scope_mut()
            .director_and_rng();
        self.move_selector
            .lifecycle(SelectorEvent::StepStarted, &*director, rng)?;
        if let Some(evaluator) = &mut self.evaluator {
            evaluator.sync(director.working_solution())?;
        }
        Ok(())
    }

    /// Evaluates the moves of one step and asks the forager for the winner.
    ///
    /// The working solution is left as it was at the start of the step.
    pub fn decide_next_step<D: ScoreDirector<S>>(
        &mut self,
        step_scope: &mut StepScope<'_, '_, S, D>,
        step: &StepContext<S::Score>,
        phase_termination: Option<&dyn Termination<S>>,
    ) -> Result<StepDecision<M, S::Score>> {
        let environment_mode = step_scope.phase_scope().solver_scope().environment_mode();
        {
            let (director, rng) = step_scope
                .phase_scope_mut()
                .solver_scope_mut()
                .director_and_rng();
            self.move_selector.restart(&*director, rng)?;
        }

        let counts = if self.evaluator.is_some() {
            self.evaluate_in_batches(step_scope, step, phase_termination, environment_mode)?
        } else {
            self.evaluate_one_by_one(step_scope, step, phase_termination, environment_mode)?
        };

        step_scope.set_move_counts(counts.selected, self.forager.accepted_move_count() as u64);
        let rng = step_scope.phase_scope_mut().solver_scope_mut().rng();
        Ok(match self.forager.pick_move(rng) {
            Some((step_move, score)) => StepDecision::Picked { step_move, score },
            None if counts.terminated => StepDecision::Terminated,
            None if counts.doable == 0 => StepDecision::NothingDoable,
            None => StepDecision::NothingAccepted,
        })
    }

    fn evaluate_one_by_one<D: ScoreDirector<S>>(
        &mut self,
        step_scope: &mut StepScope<'_, '_, S, D>,
        step: &StepContext<S::Score>,
        phase_termination: Option<&dyn Termination<S>>,
        environment_mode: EnvironmentMode,
    ) -> Result<MoveCounts> {
        let mut counts = MoveCounts::default();
        loop {
            let (director, rng) = step_scope
                .phase_scope_mut()
                .solver_scope_mut()
                .director_and_rng();
            let Some(mv) = self.move_selector.next(&*director, rng)? else {
                break;
            };
            let move_index = counts.selected;
            counts.selected += 1;
            if !mv.is_doable(&*director) {
                trace!(event = "move_not_doable", move_index, mv = ?mv);
                counts.unaccepted_in_a_row += 1;
            } else {
                counts.doable += 1;
                let score = evaluate_move(&mut *director, &mv, step.last_step_score, environment_mode)?;
                let foraged = forage(
                    &mut self.acceptor,
                    &mut self.forager,
                    step,
                    mv,
                    score,
                    &*director,
                    rng,
                    move_index,
                );
                counts.record(foraged);
                if foraged == Foraged::QuitEarly {
                    break;
                }
            }
            if self.gives_up(&counts) {
                debug!(event = "unaccepted_move_limit", selected = counts.selected);
                break;
            }
            if step_scope.phase_scope().is_terminated(phase_termination) {
                counts.terminated = true;
                break;
            }
        }
        Ok(counts)
    }

    fn evaluate_in_batches<D: ScoreDirector<S>>(
        &mut self,
        step_scope: &mut StepScope<'_, '_, S, D>,
        step: &StepContext<S::Score>,
        phase_termination: Option<&dyn Termination<S>>,
        environment_mode: EnvironmentMode,
    ) -> Result<MoveCounts> {
        let Self {
            move_selector,
            acceptor,
            forager,
            evaluator,
            unaccepted_move_limit,
        } = self;
        let Some(evaluator) = evaluator else {
            return Err(SearchForgeError::Internal(
                "batched evaluation without a move evaluator".to_string(),
            ));
        };
        let batch_size = evaluator.batch_size().max(1);
        let never_ending = move_selector.is_never_ending();
        let unaccepted_move_limit = *unaccepted_move_limit;
        let mut counts = MoveCounts::default();
        let mut exhausted = false;
        while !exhausted {
            // The full batch is always selected, so the selection does not
            // depend on how soon the forager quits.
            let mut batch = Vec::with_capacity(batch_size);
            let mut batch_indices = Vec::with_capacity(batch_size);
            {
                let (director, rng) = step_scope
                    .phase_scope_mut()
                    .solver_scope_mut()
                    .director_and_rng();
                while batch.len() < batch_size {
                    let Some(mv) = move_selector.next(&*director, rng)? else {
                        exhausted = true;
                        break;
                    };
                    let move_index = counts.selected;
                    counts.selected += 1;
                    if mv.is_doable(&*director) {
                        batch.push(mv);
                        batch_indices.push(move_index);
                    } else {
                        trace!(event = "move_not_doable", move_index, mv = ?mv);
                        counts.unaccepted_in_a_row += 1;
                    }
                }
            }
            let gives_up = |counts: &MoveCounts| {
                never_ending && counts.unaccepted_in_a_row >= unaccepted_move_limit
            };
            if batch.is_empty() {
                if gives_up(&counts) {
                    debug!(event = "unaccepted_move_limit", selected = counts.selected);
                    break;
                }
                if !exhausted && step_scope.phase_scope().is_terminated(phase_termination) {
                    counts.terminated = true;
                    break;
                }
                continue;
            }

            let scores = evaluator.evaluate(&batch, step.last_step_score, environment_mode)?;
            counts.doable += batch.len() as u64;
            let (director, rng) = step_scope
                .phase_scope_mut()
                .solver_scope_mut()
                .director_and_rng();
            let mut quit_early = false;
            for ((mv, score), move_index) in batch.into_iter().zip(scores).zip(batch_indices) {
                let foraged = forage(acceptor, forager, step, mv, score, &*director, rng, move_index);
                counts.record(foraged);
                if foraged == Foraged::QuitEarly {
                    quit_early = true;
                    break;
                }
            }
            if quit_early {
                break;
            }
            if gives_up(&counts) {
                debug!(event = "unaccepted_move_limit", selected = counts.selected);
                break;
            }
            if step_scope.phase_scope().is_terminated(phase_termination) {
                counts.terminated = true;
                break;
            }
        }
        Ok(counts)
    }

    /// Does the picked move for real and returns the resulting step score.
    ///
    /// In assert modes the step score is recalculated from scratch and must
    /// equal the score the move had during evaluation.
    pub fn take_step<D: ScoreDirector<S>>(
        &mut self,
        step_scope: &mut StepScope<'_, '_, S, D>,
        step: &StepContext<S::Score>,
        step_move: &M,
        evaluated_score: S::Score,
    ) -> Result<S::Score> {
        let environment_mode = step_scope.phase_scope().solver_scope().environment_mode();
        let director = step_scope.score_director_mut();
        let undo_move = step_move.do_move(&mut *director)?;
        let step_score = director.calculate_score();
        if environment_mode.is_asserted() {
            let context = format!("step {} with move {:?}", step.step_index, step_move);
            director.assert_working_score_from_scratch(step_score, &context)?;
            if step_score != evaluated_score {
                return Err(SearchForgeError::score_corruption(
                    format!("{} scored differently when it was evaluated", context),
                    evaluated_score,
                    step_score,
                ));
            }
        }
        if environment_mode.is_fully_asserted() {
            director.assert_shadow_variables_are_not_stale(&format!(
                "step {} with move {:?}",
                step.step_index, step_move
            ))?;
        }
        let taken = TakenStep {
            step_move,
            undo_move: &undo_move,
            step_score,
            score_director: &*director,
        };
        self.acceptor.step_ended(step, &taken);
        Ok(step_score)
    }

    pub fn step_ended<D: ScoreDirector<S>>(
        &mut self,
        step_scope: &mut StepScope<'_, '_, S, D>,
    ) -> Result<()> {
        let (director, rng) = step_scope
            .phase_scope_mut()
            .solver_scope_mut()
            .director_and_rng();
        self.move_selector
            .lifecycle(SelectorEvent::StepEnded, &*director, rng)
    }

    pub fn phase_ended<D: ScoreDirector<S>>(
        &mut self,
        phase_scope: &mut PhaseScope<'_, S, D>,
    ) -> Result<()> {
        self.forager.phase_ended();
        self.acceptor.phase_ended();
        let (director, rng) = phase_scope.solver_scope_mut().director_and_rng();
        self.move_selector
            .lifecycle(SelectorEvent::PhaseEnded, &*director, rng)
    }

    pub fn solving_ended<D: ScoreDirector<S>>(
        &mut self,
        solver_scope: &mut SolverScope<S, D>,
    ) -> Result<()> {
        let (director, rng) = solver_scope.director_and_rng();
        self.move_selector
            .lifecycle(SelectorEvent::SolvingEnded, &*director, rng)
    }
}

// Asks the acceptor about one evaluated move and feeds the forager.
#[allow(clippy::too_many_arguments)]
fn forage<S, M, A>(
    acceptor: &mut A,
    forager: &mut LocalSearchForager<S, M>,
    step: &StepContext<S::Score>,
    mv: M,
    score: S::Score,
    score_director: &dyn ScoreDirector<S>,
    rng: &mut StdRng,
    move_index: u64,
) -> Foraged
where
    S: PlanningSolution,
    M: Move<S>,
    A: Acceptor<S, M>,
{
    let candidate = Candidate {
        mv: &mv,
        score,
        score_director,
    };
    let accepted = acceptor.is_accepted(step, &candidate, rng);
    trace!(event = "move", move_index, score = %score, accepted, mv = ?mv);
    if !accepted {
        return Foraged::Rejected;
    }
    forager.add_move(mv, score);
    if forager.is_quit_early() {
        Foraged::QuitEarly
    } else {
        Foraged::Accepted
    }
}

/// Does, scores and undoes `mv`, leaving the solution as it was.
///
/// Under full assert the score is checked from scratch and the undo must
/// restore `last_step_score`.
pub(crate) fn evaluate_move<S, M>(
    score_director: &mut dyn ScoreDirector<S>,
    mv: &M,
    last_step_score: S::Score,
    environment_mode: EnvironmentMode,
) -> Result<S::Score>
where
    S: PlanningSolution,
    M: Move<S>,
{
    let undo_move = mv.do_move(score_director)?;
    let score = score_director.calculate_score();
    if environment_mode.is_fully_asserted() {
        score_director.assert_working_score_from_scratch(score, &format!("after doing {:?}", mv))?;
    }
    undo_move.do_move(score_director)?;
    if environment_mode.is_fully_asserted() {
        let undo_score = score_director.calculate_score();
        if undo_score != last_step_score {
            return Err(SearchForgeError::UndoMoveCorruption(format!(
                "undoing {:?} with {:?} gave score {} instead of the last step score {}",
                mv, undo_move, undo_score, last_step_score
            )));
        }
    }
    Ok(score)
}

impl<S, M, MS, A> Debug for LocalSearchDecider<S, M, MS, A>
where
    S: PlanningSolution,
    M: Move<S>,
    MS: Debug,
    A: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSearchDecider")
            .field("move_selector", &self.move_selector)
            .field("acceptor", &self.acceptor)
            .field("forager", &self.forager)
            .field("evaluator", &self.evaluator)
            .field("unaccepted_move_limit", &self.unaccepted_move_limit)
            .finish()
    }
}
