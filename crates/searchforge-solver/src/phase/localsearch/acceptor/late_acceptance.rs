//! Late acceptance acceptor.

use std::fmt::Debug;

use rand::rngs::StdRng;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::{Result, Score, SearchForgeError};

use super::{Acceptor, Candidate, PhaseContext, StepContext, TakenStep};
use crate::heuristic::r#move::Move;

/// Late acceptance acceptor - compares moves against the step score of N steps ago.
///
/// Keeps a circular history of step scores, seeded with the phase's initial
/// score. A move is accepted when it is at least as good as the late score or
/// at least as good as the last step score.
///
/// # Example
///
/// ```
/// use searchforge_core::SimpleScore;
/// use searchforge_solver::phase::localsearch::LateAcceptanceAcceptor;
///
/// let acceptor = LateAcceptanceAcceptor::<SimpleScore>::new(400).unwrap();
/// assert_eq!(acceptor.late_acceptance_size(), 400);
/// assert!(LateAcceptanceAcceptor::<SimpleScore>::new(0).is_err());
/// ```
#[derive(Clone)]
pub struct LateAcceptanceAcceptor<Sc: Score> {
    late_acceptance_size: usize,
    score_history: Vec<Sc>,
    current_index: usize,
}

impl<Sc: Score> Debug for LateAcceptanceAcceptor<Sc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LateAcceptanceAcceptor")
            .field("late_acceptance_size", &self.late_acceptance_size)
            .field("current_index", &self.current_index)
            .finish()
    }
}

impl<Sc: Score> LateAcceptanceAcceptor<Sc> {
    pub const DEFAULT_SIZE: usize = 400;

    pub fn new(late_acceptance_size: usize) -> Result<Self> {
        if late_acceptance_size == 0 {
            return Err(SearchForgeError::Config(
                "the late acceptance size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            late_acceptance_size,
            score_history: Vec::new(),
            current_index: 0,
        })
    }

    pub fn late_acceptance_size(&self) -> usize {
        self.late_acceptance_size
    }
}

impl<S, M> Acceptor<S, M> for LateAcceptanceAcceptor<S::Score>
where
    S: PlanningSolution,
    M: Move<S>,
{
    fn phase_started(&mut self, phase: &PhaseContext<S::Score>) {
        self.score_history = vec![phase.initial_score; self.late_acceptance_size];
        self.current_index = 0;
    }

    fn is_accepted(
        &mut self,
        step: &StepContext<S::Score>,
        candidate: &Candidate<'_, S, M>,
        _rng: &mut StdRng,
    ) -> bool {
        let late_score = self
            .score_history
            .get(self.current_index)
            .copied()
            .unwrap_or(step.last_step_score);
        candidate.score >= late_score || candidate.score >= step.last_step_score
    }

    fn step_ended(&mut self, _step: &StepContext<S::Score>, taken: &TakenStep<'_, S, M>) {
        if let Some(slot) = self.score_history.get_mut(self.current_index) {
            *slot = taken.step_score;
        }
        self.current_index = (self.current_index + 1) % self.late_acceptance_size;
    }

    fn phase_ended(&mut self) {
        self.score_history.clear();
        self.current_index = 0;
    }
}
