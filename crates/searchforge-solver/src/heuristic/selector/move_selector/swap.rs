//! Swap move selector.

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use rand::rngs::StdRng;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::Result;
use searchforge_scoring::ScoreDirector;

use crate::heuristic::r#move::SwapMove;
use crate::heuristic::selector::{FromSolutionEntitySelector, Selector, SelectorEvent};

/// Pairs entities from a left and a right selector into swap moves.
///
/// The right selector restarts for every left entity, so a right selector
/// that replays the left one (for example a nearby selector around a mimic
/// replayer) sees the current left entity. When the right selector never
/// ends, each move takes a fresh left entity.
///
/// [`all_pairs`](Self::all_pairs) yields every unordered pair of distinct
/// entities once.
pub struct SwapMoveSelector<S, V, L, R> {
    left: L,
    right: R,
    getter: fn(&S, usize) -> Option<V>,
    setter: fn(&mut S, usize, Option<V>),
    descriptor_index: usize,
    variable_name: &'static str,
    triangular: bool,
    current_left: Option<usize>,
    _phantom: PhantomData<fn() -> S>,
}

impl<S, V, L: Debug, R: Debug> Debug for SwapMoveSelector<S, V, L, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwapMoveSelector")
            .field("left", &self.left)
            .field("right", &self.right)
            .field("descriptor_index", &self.descriptor_index)
            .field("variable_name", &self.variable_name)
            .field("triangular", &self.triangular)
            .finish()
    }
}

impl<S, V, L, R> SwapMoveSelector<S, V, L, R>
where
    S: PlanningSolution,
    L: Selector<S, Item = usize>,
    R: Selector<S, Item = usize>,
{
    pub fn new(
        left: L,
        right: R,
        getter: fn(&S, usize) -> Option<V>,
        setter: fn(&mut S, usize, Option<V>),
        descriptor_index: usize,
        variable_name: &'static str,
    ) -> Self {
        Self {
            left,
            right,
            getter,
            setter,
            descriptor_index,
            variable_name,
            triangular: false,
            current_left: None,
            _phantom: PhantomData,
        }
    }
}

impl<S: PlanningSolution, V>
    SwapMoveSelector<S, V, FromSolutionEntitySelector, FromSolutionEntitySelector>
{
    /// Every unordered pair of distinct entities of one descriptor, once per pass.
    pub fn all_pairs(
        getter: fn(&S, usize) -> Option<V>,
        setter: fn(&mut S, usize, Option<V>),
        descriptor_index: usize,
        variable_name: &'static str,
    ) -> Self {
        Self {
            triangular: true,
            ..Self::new(
                FromSolutionEntitySelector::new(descriptor_index),
                FromSolutionEntitySelector::new(descriptor_index),
                getter,
                setter,
                descriptor_index,
                variable_name,
            )
        }
    }

    /// A random pair of entities per move, never ending.
    pub fn random(
        getter: fn(&S, usize) -> Option<V>,
        setter: fn(&mut S, usize, Option<V>),
        descriptor_index: usize,
        variable_name: &'static str,
    ) -> Self {
        Self::new(
            FromSolutionEntitySelector::random(descriptor_index),
            FromSolutionEntitySelector::random(descriptor_index),
            getter,
            setter,
            descriptor_index,
            variable_name,
        )
    }
}

impl<S, V, L, R> Selector<S> for SwapMoveSelector<S, V, L, R>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
    L: Selector<S, Item = usize>,
    R: Selector<S, Item = usize>,
{
    type Item = SwapMove<S, V>;

    fn lifecycle(
        &mut self,
        event: SelectorEvent,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<()> {
        self.left.lifecycle(event, score_director, rng)?;
        self.right.lifecycle(event, score_director, rng)
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> Option<u64> {
        let left = self.left.size(score_director)?;
        if self.triangular {
            return Some(left * left.saturating_sub(1) / 2);
        }
        Some(left * self.right.size(score_director)?)
    }

    fn is_never_ending(&self) -> bool {
        self.left.is_never_ending() || self.right.is_never_ending()
    }

    fn restart(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut StdRng) -> Result<()> {
        self.current_left = None;
        self.left.restart(score_director, rng)
    }

    fn next(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<Option<SwapMove<S, V>>> {
        let mut empty_lefts = 0u64;
        let empty_limit = self.left.size(score_director).unwrap_or(0).max(1);
        loop {
            let left = match self.current_left {
                Some(left) => left,
                None => {
                    let Some(left) = self.left.next(score_director, rng)? else {
                        return Ok(None);
                    };
                    self.right.restart(score_director, rng)?;
                    self.current_left = Some(left);
                    left
                }
            };
            let Some(right) = self.right.next(score_director, rng)? else {
                self.current_left = None;
                if self.left.is_never_ending() {
                    empty_lefts += 1;
                    if empty_lefts > empty_limit {
                        return Ok(None);
                    }
                }
                continue;
            };
            if self.triangular && right <= left {
                continue;
            }
            if self.right.is_never_ending() {
                self.current_left = None;
            }
            return Ok(Some(SwapMove::new(
                left,
                right,
                self.getter,
                self.setter,
                self.variable_name,
                self.descriptor_index,
            )));
        }
    }
}
