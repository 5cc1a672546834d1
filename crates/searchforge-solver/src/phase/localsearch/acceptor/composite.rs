//! Composite acceptor.

use std::fmt::Debug;

use rand::rngs::StdRng;
use searchforge_core::domain::PlanningSolution;

use super::{Acceptor, Candidate, PhaseContext, StepContext, TakenStep};
use crate::heuristic::r#move::Move;

/// Accepts a move only when every inner acceptor accepts it.
///
/// Lifecycle events reach every inner acceptor, in insertion order.
pub struct CompositeAcceptor<S: PlanningSolution, M: Move<S>> {
    acceptors: Vec<Box<dyn Acceptor<S, M>>>,
}

impl<S: PlanningSolution, M: Move<S>> CompositeAcceptor<S, M> {
    pub fn new(acceptors: Vec<Box<dyn Acceptor<S, M>>>) -> Self {
        Self { acceptors }
    }

    pub fn with(mut self, acceptor: impl Acceptor<S, M> + 'static) -> Self {
        self.acceptors.push(Box::new(acceptor));
        self
    }

    pub fn len(&self) -> usize {
        self.acceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acceptors.is_empty()
    }
}

impl<S: PlanningSolution, M: Move<S>> Debug for CompositeAcceptor<S, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.acceptors.iter()).finish()
    }
}

impl<S: PlanningSolution, M: Move<S>> Acceptor<S, M> for CompositeAcceptor<S, M> {
    fn phase_started(&mut self, phase: &PhaseContext<S::Score>) {
        for acceptor in &mut self.acceptors {
            acceptor.phase_started(phase);
        }
    }

    fn step_started(&mut self, step: &StepContext<S::Score>) {
        for acceptor in &mut self.acceptors {
            acceptor.step_started(step);
        }
    }

    fn is_accepted(
        &mut self,
        step: &StepContext<S::Score>,
        candidate: &Candidate<'_, S, M>,
        rng: &mut StdRng,
    ) -> bool {
        self.acceptors
            .iter_mut()
            .all(|acceptor| acceptor.is_accepted(step, candidate, rng))
    }

    fn step_ended(&mut self, step: &StepContext<S::Score>, taken: &TakenStep<'_, S, M>) {
        for acceptor in &mut self.acceptors {
            acceptor.step_ended(step, taken);
        }
    }

    fn phase_ended(&mut self) {
        for acceptor in &mut self.acceptors {
            acceptor.phase_ended();
        }
    }
}
