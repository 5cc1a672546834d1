//! Filtering selector decorator.

use std::fmt::Debug;
use std::marker::PhantomData;

use rand::rngs::StdRng;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::Result;
use searchforge_scoring::ScoreDirector;

use crate::heuristic::selector::cache::SelectionCache;
use crate::heuristic::selector::traits::collect_pass;
use crate::heuristic::selector::{SelectionCacheType, Selector, SelectorEvent};

/// Drops the child's items that the filter rejects.
///
/// With a cached cache type the accepted items are materialized at the start
/// of every cache scope, which makes [`size`](Selector::size) exact for
/// downstream sorting and probability decorators. Just in time, items are
/// tested as they are pulled, and a never-ending child stays never ending.
pub struct FilteringSelector<S, C, F>
where
    S: PlanningSolution,
    C: Selector<S>,
{
    child: C,
    filter: F,
    cache: SelectionCache<C::Item>,
    cursor: usize,
    _phantom: PhantomData<fn() -> S>,
}

impl<S, C, F> FilteringSelector<S, C, F>
where
    S: PlanningSolution,
    C: Selector<S>,
    F: Fn(&S, &C::Item) -> bool + Send,
{
    /// Filters lazily.
    pub fn new(child: C, filter: F) -> Self {
        Self {
            child,
            filter,
            cache: SelectionCache::new(SelectionCacheType::JustInTime),
            cursor: 0,
            _phantom: PhantomData,
        }
    }

    /// Filters once per cache scope. Fails for a never-ending child.
    pub fn cached(child: C, filter: F, cache_type: SelectionCacheType) -> Result<Self> {
        if cache_type.is_cached() && child.is_never_ending() {
            return Err(searchforge_core::SearchForgeError::SelectorState(format!(
                "a cached filtering selector cannot wrap the never-ending selector {:?}",
                child
            )));
        }
        Ok(Self {
            cache: SelectionCache::new(cache_type),
            ..Self::new(child, filter)
        })
    }

    fn is_cached(&self) -> bool {
        self.cache.cache_type().is_cached()
    }
}

impl<S, C, F> Debug for FilteringSelector<S, C, F>
where
    S: PlanningSolution,
    C: Selector<S>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilteringSelector")
            .field("child", &self.child)
            .field("cache_type", &self.cache.cache_type())
            .finish()
    }
}

impl<S, C, F> Selector<S> for FilteringSelector<S, C, F>
where
    S: PlanningSolution,
    C: Selector<S>,
    F: Fn(&S, &C::Item) -> bool + Send,
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
            let solution = score_director.working_solution();
            let mut items = collect_pass(&mut self.child, score_director, rng)?;
            items.retain(|item| (self.filter)(solution, item));
            self.cache.fill(items);
        }
        self.cache.dispose_on(event);
        Ok(())
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> Option<u64> {
        match self.cache.items("FilteringSelector") {
            Ok(items) => Some(items.len() as u64),
            Err(_) => self.child.size(score_director),
        }
    }

    fn is_never_ending(&self) -> bool {
        !self.is_cached() && self.child.is_never_ending()
    }

    fn restart(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut StdRng) -> Result<()> {
        self.cursor = 0;
        if self.is_cached() {
            Ok(())
        } else {
            self.child.restart(score_director, rng)
        }
    }

    fn next(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<Option<C::Item>> {
        if self.is_cached() {
            let item = self.cache.items("FilteringSelector")?.get(self.cursor).cloned();
            if item.is_some() {
                self.cursor += 1;
            }
            return Ok(item);
        }
        while let Some(item) = self.child.next(score_director, rng)? {
            if (self.filter)(score_director.working_solution(), &item) {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }
}
