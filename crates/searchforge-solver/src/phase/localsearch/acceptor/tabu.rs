//! Tabu acceptor over entities, values, moves or undo moves.

use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;

use rand::rngs::StdRng;
use rand::Rng;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::{Result, SearchForgeError};
use smallvec::SmallVec;
use tracing::trace;

use super::{Acceptor, Candidate, PhaseContext, StepContext, TakenStep};
use crate::heuristic::r#move::{signature_of, Move};

/// What a tabu acceptor remembers about each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabuKind {
    /// The entities the step move touched.
    Entity,
    /// The planning values the step move assigned.
    Value,
    /// The step move itself.
    Move,
    /// The undo move of the step move, so the step is not reverted right away.
    UndoMove,
}

/// How many steps a tabu stays active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TabuSize {
    Fixed(usize),
    /// A fraction of the total entity count, strictly between 0 and 1.
    EntityRatio(f64),
}

impl TabuSize {
    fn validate(&self, what: &str) -> Result<()> {
        if let TabuSize::EntityRatio(ratio) = *self {
            if ratio.is_nan() || ratio <= 0.0 || ratio >= 1.0 {
                return Err(SearchForgeError::Config(format!(
                    "the {} ratio ({}) must be between 0.0 and 1.0 exclusive",
                    what, ratio
                )));
            }
        }
        Ok(())
    }

    /// Number of steps for the given total entity count.
    pub fn resolve(&self, total_entity_count: usize) -> usize {
        match *self {
            TabuSize::Fixed(size) => size,
            TabuSize::EntityRatio(ratio) => {
                let size = (total_entity_count as f64 * ratio).round() as usize;
                size.max(1).min(total_entity_count.saturating_sub(1))
            }
        }
    }
}

/// Rejects moves that touch something a recent step touched.
///
/// A tabu stays strictly active for `tabu_size` steps. With a fading tail,
/// it then stays partially active for `fading_tabu_size` more steps, during
/// which a move is accepted with a chance growing linearly towards 1.
/// Aspiration accepts a tabu move anyway when its score beats the best score.
///
/// # Example
///
/// ```
/// use searchforge_solver::phase::localsearch::{TabuAcceptor, TabuKind, TabuSize};
///
/// let acceptor = TabuAcceptor::new(TabuKind::Entity, TabuSize::Fixed(7))
///     .unwrap()
///     .with_fading_tabu_size(TabuSize::Fixed(3))
///     .unwrap();
/// assert_eq!(acceptor.kind(), TabuKind::Entity);
///
/// assert!(TabuAcceptor::new(TabuKind::Value, TabuSize::EntityRatio(1.5)).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct TabuAcceptor {
    kind: TabuKind,
    tabu_size: TabuSize,
    fading_tabu_size: Option<TabuSize>,
    aspiration_enabled: bool,
    working_tabu_size: usize,
    working_fading_tabu_size: usize,
    // Step index at which each tabu was last recorded.
    tabu_to_step_index: HashMap<u64, u64>,
    // Tabus in recording order, oldest first.
    tabu_sequence: VecDeque<u64>,
}

impl TabuAcceptor {
    pub fn new(kind: TabuKind, tabu_size: TabuSize) -> Result<Self> {
        tabu_size.validate("tabu")?;
        Ok(Self {
            kind,
            tabu_size,
            fading_tabu_size: None,
            aspiration_enabled: true,
            working_tabu_size: 0,
            working_fading_tabu_size: 0,
            tabu_to_step_index: HashMap::new(),
            tabu_sequence: VecDeque::new(),
        })
    }

    pub fn with_fading_tabu_size(mut self, fading_tabu_size: TabuSize) -> Result<Self> {
        fading_tabu_size.validate("fading tabu")?;
        self.fading_tabu_size = Some(fading_tabu_size);
        Ok(self)
    }

    pub fn with_aspiration(mut self, enabled: bool) -> Self {
        self.aspiration_enabled = enabled;
        self
    }

    pub fn kind(&self) -> TabuKind {
        self.kind
    }

    fn candidate_tabus<S, M>(&self, candidate: &Candidate<'_, S, M>) -> SmallVec<[u64; 2]>
    where
        S: PlanningSolution,
        M: Move<S>,
    {
        match self.kind {
            TabuKind::Entity => candidate
                .mv
                .tabu_entities()
                .iter()
                .map(signature_of)
                .collect(),
            TabuKind::Value => candidate.mv.tabu_values(candidate.score_director),
            TabuKind::Move | TabuKind::UndoMove => SmallVec::from_elem(candidate.mv.tabu_key(), 1),
        }
    }

    fn step_tabus<S, M>(&self, taken: &TakenStep<'_, S, M>) -> SmallVec<[u64; 2]>
    where
        S: PlanningSolution,
        M: Move<S>,
    {
        match self.kind {
            TabuKind::Entity => taken
                .step_move
                .tabu_entities()
                .iter()
                .map(signature_of)
                .collect(),
            TabuKind::Value => taken.step_move.tabu_values(taken.score_director),
            TabuKind::Move => SmallVec::from_elem(taken.step_move.tabu_key(), 1),
            TabuKind::UndoMove => SmallVec::from_elem(taken.undo_move.tabu_key(), 1),
        }
    }

    fn fading_accept_chance(&self, fading_step_count: u64) -> f64 {
        fading_step_count as f64 / (self.working_fading_tabu_size as f64 + 1.0)
    }
}

impl<S, M> Acceptor<S, M> for TabuAcceptor
where
    S: PlanningSolution,
    M: Move<S>,
{
    fn phase_started(&mut self, phase: &PhaseContext<S::Score>) {
        self.working_tabu_size = self.tabu_size.resolve(phase.total_entity_count);
        self.working_fading_tabu_size = self
            .fading_tabu_size
            .map_or(0, |size| size.resolve(phase.total_entity_count));
        self.tabu_to_step_index.clear();
        self.tabu_sequence.clear();
    }

    fn is_accepted(
        &mut self,
        step: &StepContext<S::Score>,
        candidate: &Candidate<'_, S, M>,
        rng: &mut StdRng,
    ) -> bool {
        let maximum_tabu_step_index = self
            .candidate_tabus(candidate)
            .iter()
            .filter_map(|tabu| self.tabu_to_step_index.get(tabu).copied())
            .max();
        let Some(maximum_tabu_step_index) = maximum_tabu_step_index else {
            return true;
        };
        if self.aspiration_enabled && candidate.score > step.best_score {
            trace!(
                event = "tabu_aspiration",
                step_index = step.step_index,
                score = %candidate.score,
            );
            return true;
        }
        let tabu_step_count = step.step_index.saturating_sub(maximum_tabu_step_index);
        let working_tabu_size = self.working_tabu_size as u64;
        if tabu_step_count <= working_tabu_size {
            return false;
        }
        let accept_chance = self.fading_accept_chance(tabu_step_count - working_tabu_size);
        rng.random::<f64>() < accept_chance
    }

    fn step_ended(&mut self, step: &StepContext<S::Score>, taken: &TakenStep<'_, S, M>) {
        let total_tabu_list_size = (self.working_tabu_size + self.working_fading_tabu_size) as u64;
        while let Some(&oldest) = self.tabu_sequence.front() {
            let old_step_index = self.tabu_to_step_index.get(&oldest).copied().unwrap_or(0);
            if step.step_index.saturating_sub(old_step_index) < total_tabu_list_size {
                break;
            }
            self.tabu_sequence.pop_front();
            self.tabu_to_step_index.remove(&oldest);
        }
        for tabu in self.step_tabus(taken) {
            if self.tabu_to_step_index.insert(tabu, step.step_index).is_some() {
                self.tabu_sequence.retain(|&t| t != tabu);
            }
            self.tabu_sequence.push_back(tabu);
        }
    }

    fn phase_ended(&mut self) {
        self.tabu_to_step_index.clear();
        self.tabu_sequence.clear();
    }
}
