//! Selected count limit decorator.

use std::fmt::Debug;
use std::marker::PhantomData;

use rand::rngs::StdRng;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::Result;
use searchforge_scoring::ScoreDirector;

use crate::heuristic::selector::{Selector, SelectorEvent};

/// Ends every pass after `limit` items.
///
/// This turns a never-ending selector into a finite one.
pub struct SelectedCountLimitSelector<S, C> {
    child: C,
    limit: u64,
    selected: u64,
    _phantom: PhantomData<fn() -> S>,
}

impl<S, C> SelectedCountLimitSelector<S, C> {
    pub fn new(child: C, limit: u64) -> Self {
        Self {
            child,
            limit,
            selected: 0,
            _phantom: PhantomData,
        }
    }
}

impl<S, C: Debug> Debug for SelectedCountLimitSelector<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedCountLimitSelector")
            .field("child", &self.child)
            .field("limit", &self.limit)
            .finish()
    }
}

impl<S, C> Selector<S> for SelectedCountLimitSelector<S, C>
where
    S: PlanningSolution,
    C: Selector<S>,
{
    type Item = C::Item;

    fn lifecycle(
        &mut self,
        event: SelectorEvent,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<()> {
        self.child.lifecycle(event, score_director, rng)
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> Option<u64> {
        match self.child.size(score_director) {
            Some(size) if !self.child.is_never_ending() => Some(size.min(self.limit)),
            _ => Some(self.limit),
        }
    }

    fn is_never_ending(&self) -> bool {
        false
    }

    fn restart(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut StdRng) -> Result<()> {
        self.selected = 0;
        self.child.restart(score_director, rng)
    }

    fn next(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<Option<C::Item>> {
        if self.selected >= self.limit {
            return Ok(None);
        }
        let item = self.child.next(score_director, rng)?;
        if item.is_some() {
            self.selected += 1;
        }
        Ok(item)
    }
}
