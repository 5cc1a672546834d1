//! Sorting selector decorator.

use std::cmp::Ordering;
use std::fmt::Debug;
use std::marker::PhantomData;

use rand::rngs::StdRng;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::{Result, SearchForgeError};
use searchforge_scoring::ScoreDirector;

use crate::heuristic::selector::cache::SelectionCache;
use crate::heuristic::selector::traits::collect_pass;
use crate::heuristic::selector::{SelectionCacheType, Selector, SelectorEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Builds a comparator from a weight (difficulty or strength) function.
pub fn weight_comparator<S, T, W: Ord>(
    weight: fn(&S, &T) -> W,
) -> impl Fn(&S, &T, &T) -> Ordering + Send {
    move |solution: &S, a: &T, b: &T| weight(solution, a).cmp(&weight(solution, b))
}

/// Materializes and sorts the child's items at the start of every cache scope.
///
/// The sort is stable, so equal items keep the child's order in both
/// directions.
pub struct SortingSelector<S, C, F>
where
    S: PlanningSolution,
    C: Selector<S>,
{
    child: C,
    comparator: F,
    direction: SortDirection,
    cache: SelectionCache<C::Item>,
    cursor: usize,
    _phantom: PhantomData<fn() -> S>,
}

impl<S, C, F> SortingSelector<S, C, F>
where
    S: PlanningSolution,
    C: Selector<S>,
    F: Fn(&S, &C::Item, &C::Item) -> Ordering + Send,
{
    pub fn new(
        child: C,
        comparator: F,
        direction: SortDirection,
        cache_type: SelectionCacheType,
    ) -> Result<Self> {
        if !cache_type.is_cached() {
            return Err(SearchForgeError::Config(
                "a sorting selector needs a cached cache type, not JustInTime".to_string(),
            ));
        }
        if child.is_never_ending() {
            return Err(SearchForgeError::SelectorState(format!(
                "a sorting selector cannot wrap the never-ending selector {:?}",
                child
            )));
        }
        Ok(Self {
            child,
            comparator,
            direction,
            cache: SelectionCache::new(cache_type),
            cursor: 0,
            _phantom: PhantomData,
        })
    }
}

impl<S, C, F> Debug for SortingSelector<S, C, F>
where
    S: PlanningSolution,
    C: Selector<S>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortingSelector")
            .field("child", &self.child)
            .field("direction", &self.direction)
            .field("cache_type", &self.cache.cache_type())
            .finish()
    }
}

impl<S, C, F> Selector<S> for SortingSelector<S, C, F>
where
    S: PlanningSolution,
    C: Selector<S>,
    F: Fn(&S, &C::Item, &C::Item) -> Ordering + Send,
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
            match self.direction {
                SortDirection::Ascending => {
                    items.sort_by(|a, b| (self.comparator)(solution, a, b));
                }
                SortDirection::Descending => {
                    items.sort_by(|a, b| (self.comparator)(solution, b, a));
                }
            }
            self.cache.fill(items);
        }
        self.cache.dispose_on(event);
        Ok(())
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> Option<u64> {
        match self.cache.items("SortingSelector") {
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
        let item = self.cache.items("SortingSelector")?.get(self.cursor).cloned();
        if item.is_some() {
            self.cursor += 1;
        }
        Ok(item)
    }
}
