//! Caching selector decorator.

use std::fmt::Debug;
use std::marker::PhantomData;

use rand::rngs::StdRng;
use rand::Rng;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::{Result, SearchForgeError};
use searchforge_scoring::ScoreDirector;

use crate::heuristic::selector::cache::SelectionCache;
use crate::heuristic::selector::traits::collect_pass;
use crate::heuristic::selector::{SelectionCacheType, Selector, SelectorEvent};

/// Materializes the child's items at the start of every cache scope.
///
/// In original order a pass returns the cached items in order; in random
/// order every call draws a cached item, so the selector never ends.
///
/// # Example
///
/// ```
/// use searchforge_solver::heuristic::selector::decorator::CachingSelector;
/// use searchforge_solver::heuristic::selector::{
///     FromSolutionEntitySelector, SelectionCacheType, Selector,
/// };
/// use searchforge_test::pair::PairSolution;
///
/// let caching = CachingSelector::<PairSolution, _>::new(
///     FromSolutionEntitySelector::new(0),
///     SelectionCacheType::Phase,
///     false,
/// )
/// .unwrap();
/// assert!(!Selector::<PairSolution>::is_never_ending(&caching));
///
/// // A never-ending child cannot be cached.
/// let err = CachingSelector::<PairSolution, _>::new(
///     FromSolutionEntitySelector::random(0),
///     SelectionCacheType::Phase,
///     false,
/// );
/// assert!(err.is_err());
/// ```
pub struct CachingSelector<S, C>
where
    S: PlanningSolution,
    C: Selector<S>,
{
    child: C,
    cache: SelectionCache<C::Item>,
    random: bool,
    cursor: usize,
    _phantom: PhantomData<fn() -> S>,
}

impl<S, C> CachingSelector<S, C>
where
    S: PlanningSolution,
    C: Selector<S>,
{
    pub fn new(child: C, cache_type: SelectionCacheType, random: bool) -> Result<Self> {
        if child.is_never_ending() {
            return Err(SearchForgeError::SelectorState(format!(
                "a caching selector cannot wrap the never-ending selector {:?}",
                child
            )));
        }
        if !cache_type.is_cached() {
            return Err(SearchForgeError::Config(format!(
                "a caching selector needs a cached cache type, not {:?}",
                cache_type
            )));
        }
        Ok(Self {
            child,
            cache: SelectionCache::new(cache_type),
            random,
            cursor: 0,
            _phantom: PhantomData,
        })
    }

    pub fn cache_type(&self) -> SelectionCacheType {
        self.cache.cache_type()
    }
}

impl<S, C> Debug for CachingSelector<S, C>
where
    S: PlanningSolution,
    C: Selector<S>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingSelector")
            .field("child", &self.child)
            .field("cache_type", &self.cache.cache_type())
            .field("random", &self.random)
            .finish()
    }
}

impl<S, C> Selector<S> for CachingSelector<S, C>
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
            let items = collect_pass(&mut self.child, score_director, rng)?;
            self.cache.fill(items);
        }
        self.cache.dispose_on(event);
        Ok(())
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> Option<u64> {
        match self.cache.items("CachingSelector") {
            Ok(items) => Some(items.len() as u64),
            Err(_) => self.child.size(score_director),
        }
    }

    fn is_never_ending(&self) -> bool {
        self.random
    }

    fn restart(&mut self, _score_director: &dyn ScoreDirector<S>, _rng: &mut StdRng) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn next(
        &mut self,
        _score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<Option<C::Item>> {
        let items = self.cache.items("CachingSelector")?;
        if self.random {
            if items.is_empty() {
                return Ok(None);
            }
            return Ok(Some(items[rng.random_range(0..items.len())].clone()));
        }
        let item = items.get(self.cursor).cloned();
        if item.is_some() {
            self.cursor += 1;
        }
        Ok(item)
    }
}
