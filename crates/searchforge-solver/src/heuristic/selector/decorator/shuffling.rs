//! Shuffling selector decorator.

use std::fmt::Debug;
use std::marker::PhantomData;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::{Result, SearchForgeError};
use searchforge_scoring::ScoreDirector;

use crate::heuristic::selector::cache::SelectionCache;
use crate::heuristic::selector::traits::collect_pass;
use crate::heuristic::selector::{SelectionCacheType, Selector, SelectorEvent};

/// Materializes the child's items and shuffles them once per cache scope.
///
/// Every pass returns each item exactly once, in the shuffled order.
pub struct ShufflingSelector<S, C>
where
    S: PlanningSolution,
    C: Selector<S>,
{
    child: C,
    cache: SelectionCache<C::Item>,
    cursor: usize,
    _phantom: PhantomData<fn() -> S>,
}

impl<S, C> ShufflingSelector<S, C>
where
    S: PlanningSolution,
    C: Selector<S>,
{
    pub fn new(child: C, cache_type: SelectionCacheType) -> Result<Self> {
        if !cache_type.is_cached() {
            return Err(SearchForgeError::Config(
                "a shuffling selector needs a cached cache type, not JustInTime".to_string(),
            ));
        }
        if child.is_never_ending() {
            return Err(SearchForgeError::SelectorState(format!(
                "a shuffling selector cannot wrap the never-ending selector {:?}",
                child
            )));
        }
        Ok(Self {
            child,
            cache: SelectionCache::new(cache_type),
            cursor: 0,
            _phantom: PhantomData,
        })
    }
}

impl<S, C> Debug for ShufflingSelector<S, C>
where
    S: PlanningSolution,
    C: Selector<S>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShufflingSelector")
            .field("child", &self.child)
            .field("cache_type", &self.cache.cache_type())
            .finish()
    }
}

impl<S, C> Selector<S> for ShufflingSelector<S, C>
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
        self.child.lifecycle(event, score_director, rng)?;
        if self.cache.is_started_by(event) {
            let mut items = collect_pass(&mut self.child, score_director, rng)?;
            items.shuffle(rng);
            self.cache.fill(items);
        }
        self.cache.dispose_on(event);
        Ok(())
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> Option<u64> {
        match self.cache.items("ShufflingSelector") {
            Ok(items) => Some(items.len() as u64),
            Err(_) => self.child.size(score_director),
        }
    }

    fn is_never_ending(&self) -> bool {
        false
    }

    fn restart(&mut self, _score_director: &dyn ScoreDirector<S>, _rng: &mut StdRng) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn next(
        &mut self,
        _score_director: &dyn ScoreDirector<S>,
        _rng: &mut StdRng,
    ) -> Result<Option<C::Item>> {
        let item = self.cache.items("ShufflingSelector")?.get(self.cursor).cloned();
        if item.is_some() {
            self.cursor += 1;
        }
        Ok(item)
    }
}
