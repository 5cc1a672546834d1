//! EitherMove - a change or a swap.
//!
//! Union move selectors over change and swap selectors yield this type, so
//! local search can mix both without trait objects.

use std::fmt::Debug;
use std::hash::Hash;

use searchforge_core::domain::PlanningSolution;
use searchforge_core::Result;
use searchforge_scoring::ScoreDirector;
use smallvec::SmallVec;

use super::{ChangeMove, Move, SwapMove};

pub enum EitherMove<S, V> {
    Change(ChangeMove<S, V>),
    Swap(SwapMove<S, V>),
}

impl<S: Clone, V: Clone> Clone for EitherMove<S, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Change(m) => Self::Change(m.clone()),
            Self::Swap(m) => Self::Swap(m.clone()),
        }
    }
}

impl<S, V: Debug> Debug for EitherMove<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Change(m) => m.fmt(f),
            Self::Swap(m) => m.fmt(f),
        }
    }
}

impl<S, V> From<ChangeMove<S, V>> for EitherMove<S, V> {
    fn from(m: ChangeMove<S, V>) -> Self {
        Self::Change(m)
    }
}

impl<S, V> From<SwapMove<S, V>> for EitherMove<S, V> {
    fn from(m: SwapMove<S, V>) -> Self {
        Self::Swap(m)
    }
}

impl<S, V> Move<S> for EitherMove<S, V>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
{
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool {
        match self {
            Self::Change(m) => m.is_doable(score_director),
            Self::Swap(m) => m.is_doable(score_director),
        }
    }

    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) -> Result<Self> {
        Ok(match self {
            Self::Change(m) => Self::Change(m.do_move(score_director)?),
            Self::Swap(m) => Self::Swap(m.do_move(score_director)?),
        })
    }

    fn descriptor_index(&self) -> usize {
        match self {
            Self::Change(m) => m.descriptor_index(),
            Self::Swap(m) => m.descriptor_index(),
        }
    }

    fn entity_indices(&self) -> &[usize] {
        match self {
            Self::Change(m) => m.entity_indices(),
            Self::Swap(m) => m.entity_indices(),
        }
    }

    fn variable_name(&self) -> &str {
        match self {
            Self::Change(m) => m.variable_name(),
            Self::Swap(m) => m.variable_name(),
        }
    }

    fn tabu_values(&self, score_director: &dyn ScoreDirector<S>) -> SmallVec<[u64; 2]> {
        match self {
            Self::Change(m) => m.tabu_values(score_director),
            Self::Swap(m) => m.tabu_values(score_director),
        }
    }

    fn tabu_key(&self) -> u64 {
        match self {
            Self::Change(m) => m.tabu_key(),
            Self::Swap(m) => m.tabu_key(),
        }
    }
}
