//! CompositeMove - applies several moves in sequence.

use std::fmt::Debug;
use std::marker::PhantomData;

use searchforge_core::domain::PlanningSolution;
use searchforge_core::Result;
use searchforge_scoring::ScoreDirector;
use smallvec::SmallVec;

use super::{signature_of, Move};

/// A move made of sub-moves executed in order.
///
/// The composite is doable when at least one sub-move is doable. When it
/// runs, each sub-move is checked again against the solution as the earlier
/// sub-moves left it, and only doable sub-moves execute. The undo move holds
/// the undo moves of the executed sub-moves in reverse order.
pub struct CompositeMove<S, M> {
    moves: Vec<M>,
    entity_indices: Vec<usize>,
    _phantom: PhantomData<fn() -> S>,
}

impl<S, M> CompositeMove<S, M>
where
    S: PlanningSolution,
    M: Move<S>,
{
    pub fn new(moves: Vec<M>) -> Self {
        let entity_indices = moves
            .iter()
            .flat_map(|m| m.entity_indices().iter().copied())
            .collect();
        Self {
            moves,
            entity_indices,
            _phantom: PhantomData,
        }
    }

    pub fn moves(&self) -> &[M] {
        &self.moves
    }
}

impl<S, M: Clone> Clone for CompositeMove<S, M> {
    fn clone(&self) -> Self {
        Self {
            moves: self.moves.clone(),
            entity_indices: self.entity_indices.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<S, M: Debug> Debug for CompositeMove<S, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeMove")
            .field("moves", &self.moves)
            .finish()
    }
}

impl<S, M> Move<S> for CompositeMove<S, M>
where
    S: PlanningSolution,
    M: Move<S>,
{
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool {
        self.moves.iter().any(|m| m.is_doable(score_director))
    }

    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) -> Result<Self> {
        let mut undo_moves = Vec::with_capacity(self.moves.len());
        for m in &self.moves {
            if !m.is_doable(score_director) {
                continue;
            }
            undo_moves.push(m.do_move(score_director)?);
        }
        undo_moves.reverse();
        Ok(Self::new(undo_moves))
    }

    fn descriptor_index(&self) -> usize {
        self.moves.first().map_or(0, |m| m.descriptor_index())
    }

    fn entity_indices(&self) -> &[usize] {
        &self.entity_indices
    }

    fn variable_name(&self) -> &str {
        self.moves.first().map_or("", |m| m.variable_name())
    }

    fn tabu_entities(&self) -> SmallVec<[searchforge_core::EntityReference; 2]> {
        self.moves.iter().flat_map(|m| m.tabu_entities()).collect()
    }

    fn tabu_values(&self, score_director: &dyn ScoreDirector<S>) -> SmallVec<[u64; 2]> {
        self.moves
            .iter()
            .flat_map(|m| m.tabu_values(score_director))
            .collect()
    }

    fn tabu_key(&self) -> u64 {
        let keys: Vec<u64> = self.moves.iter().map(|m| m.tabu_key()).collect();
        signature_of(&("composite", keys))
    }
}
