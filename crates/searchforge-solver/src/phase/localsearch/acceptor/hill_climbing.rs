//! Hill climbing acceptor.

use rand::rngs::StdRng;
use searchforge_core::domain::PlanningSolution;

use super::{Acceptor, Candidate, StepContext};
use crate::heuristic::r#move::Move;

/// Accepts moves that do not worsen the last step score.
///
/// Equal scores are accepted so the search can walk across plateaus.
///
/// # Example
///
/// ```
/// use searchforge_solver::phase::localsearch::HillClimbingAcceptor;
///
/// let acceptor = HillClimbingAcceptor::new();
/// assert_eq!(format!("{:?}", acceptor), "HillClimbingAcceptor");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HillClimbingAcceptor;

impl HillClimbingAcceptor {
    pub fn new() -> Self {
        Self
    }
}

impl<S, M> Acceptor<S, M> for HillClimbingAcceptor
where
    S: PlanningSolution,
    M: Move<S>,
{
    fn is_accepted(
        &mut self,
        step: &StepContext<S::Score>,
        candidate: &Candidate<'_, S, M>,
        _rng: &mut StdRng,
    ) -> bool {
        candidate.score >= step.last_step_score
    }
}
