//! Acceptors for local search move acceptance.
//!
//! Acceptors decide whether an evaluated move may become a candidate for the
//! step. They are stateful: tabu lists, annealing temperatures, late acceptance
//! histories and deluge water levels all evolve with the steps taken.
//!
//! Every acceptor follows the same state machine per phase:
//! `phase_started`, then for each step `step_started`, any number of
//! `is_accepted` calls and `step_ended`, and finally `phase_ended`.

mod composite;
mod great_deluge;
mod hill_climbing;
mod late_acceptance;
mod simulated_annealing;
mod tabu;

#[cfg(test)]
mod tests;

use std::fmt::Debug;

use rand::rngs::StdRng;
use searchforge_core::domain::PlanningSolution;
use searchforge_scoring::ScoreDirector;

use crate::heuristic::r#move::Move;

pub use composite::CompositeAcceptor;
pub use great_deluge::{GreatDelugeAcceptor, WaterLevelIncrement};
pub use hill_climbing::HillClimbingAcceptor;
pub use late_acceptance::LateAcceptanceAcceptor;
pub use simulated_annealing::SimulatedAnnealingAcceptor;
pub use tabu::{TabuAcceptor, TabuKind, TabuSize};

/// What an acceptor sees when a phase starts (or restarts after a problem change).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseContext<Sc> {
    pub initial_score: Sc,
    pub best_score: Sc,
    pub total_entity_count: usize,
}

/// Per-step state shared with acceptors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepContext<Sc> {
    /// Index of the step within its phase.
    pub step_index: u64,
    /// Score after the previous step, or the phase's initial score.
    pub last_step_score: Sc,
    pub best_score: Sc,
    /// Fraction of the phase's budget already spent, in `[0.0, 1.0]`.
    pub time_gradient: f64,
}

/// An evaluated move asking for acceptance.
///
/// The move has already been done, scored and undone, so `score_director`
/// shows the solution as it is at the start of the step.
pub struct Candidate<'a, S: PlanningSolution, M> {
    pub mv: &'a M,
    pub score: S::Score,
    pub score_director: &'a dyn ScoreDirector<S>,
}

/// The move a step ended up taking.
///
/// `score_director` shows the solution after the step move.
pub struct TakenStep<'a, S: PlanningSolution, M> {
    pub step_move: &'a M,
    pub undo_move: &'a M,
    pub step_score: S::Score,
    pub score_director: &'a dyn ScoreDirector<S>,
}

/// Decides whether an evaluated move is acceptable.
///
/// Acceptance is not selection: several moves may be accepted during a step
/// and the forager picks the winner among them.
pub trait Acceptor<S: PlanningSolution, M: Move<S>>: Send + Debug {
    fn phase_started(&mut self, _phase: &PhaseContext<S::Score>) {}

    fn step_started(&mut self, _step: &StepContext<S::Score>) {}

    /// Returns true if the candidate may be taken as the step.
    ///
    /// Randomized acceptors draw from `rng`, the solver's seeded source.
    fn is_accepted(
        &mut self,
        step: &StepContext<S::Score>,
        candidate: &Candidate<'_, S, M>,
        rng: &mut StdRng,
    ) -> bool;

    fn step_ended(&mut self, _step: &StepContext<S::Score>, _taken: &TakenStep<'_, S, M>) {}

    fn phase_ended(&mut self) {}
}

impl<S, M, A> Acceptor<S, M> for Box<A>
where
    S: PlanningSolution,
    M: Move<S>,
    A: Acceptor<S, M> + ?Sized,
{
    fn phase_started(&mut self, phase: &PhaseContext<S::Score>) {
        (**self).phase_started(phase)
    }

    fn step_started(&mut self, step: &StepContext<S::Score>) {
        (**self).step_started(step)
    }

    fn is_accepted(
        &mut self,
        step: &StepContext<S::Score>,
        candidate: &Candidate<'_, S, M>,
        rng: &mut StdRng,
    ) -> bool {
        (**self).is_accepted(step, candidate, rng)
    }

    fn step_ended(&mut self, step: &StepContext<S::Score>, taken: &TakenStep<'_, S, M>) {
        (**self).step_ended(step, taken)
    }

    fn phase_ended(&mut self) {
        (**self).phase_ended()
    }
}
