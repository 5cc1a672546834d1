//! Probability selector decorator.

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

/// Draws the child's items with replacement, proportionally to their weight.
///
/// At the start of every cache scope the items are laid out on a cumulative
/// weight line: each item owns `[offset, offset + weight)`. A draw picks a
/// uniform point in `[0, total)` and returns the item owning it. Items with a
/// zero weight own nothing and are never drawn.
///
/// # Example
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use searchforge_scoring::SimpleScoreDirector;
/// use searchforge_solver::heuristic::selector::decorator::ProbabilitySelector;
/// use searchforge_solver::heuristic::selector::{
///     SelectionCacheType, Selector, SelectorEvent, StaticValueSelector,
/// };
/// use searchforge_test::pair::{self, PairSolution};
///
/// let director = SimpleScoreDirector::new(
///     PairSolution::with_values(&[1, 1]),
///     pair::create_pair_descriptor(),
///     pair::calculate_conflicts,
/// );
/// let mut rng = StdRng::seed_from_u64(7);
/// let weights = |_: &PairSolution, v: &char| match v {
///     'C' => 5.0,
///     _ => 0.0,
/// };
/// let mut selector = ProbabilitySelector::new(
///     StaticValueSelector::new(vec!['A', 'B', 'C']),
///     weights,
///     SelectionCacheType::Step,
/// )
/// .unwrap();
/// selector.lifecycle(SelectorEvent::StepStarted, &director, &mut rng).unwrap();
/// selector.restart(&director, &mut rng).unwrap();
/// for _ in 0..100 {
///     assert_eq!(selector.next(&director, &mut rng).unwrap(), Some('C'));
/// }
/// ```
pub struct ProbabilitySelector<S, C, W>
where
    S: PlanningSolution,
    C: Selector<S>,
{
    child: C,
    weight: W,
    cache: SelectionCache<(f64, C::Item)>,
    total_weight: f64,
    _phantom: PhantomData<fn() -> S>,
}

impl<S, C, W> ProbabilitySelector<S, C, W>
where
    S: PlanningSolution,
    C: Selector<S>,
    W: Fn(&S, &C::Item) -> f64 + Send,
{
    pub fn new(child: C, weight: W, cache_type: SelectionCacheType) -> Result<Self> {
        if !cache_type.is_cached() {
            return Err(SearchForgeError::Config(
                "a probability selector needs a cached cache type, not JustInTime".to_string(),
            ));
        }
        if child.is_never_ending() {
            return Err(SearchForgeError::SelectorState(format!(
                "a probability selector cannot wrap the never-ending selector {:?}",
                child
            )));
        }
        Ok(Self {
            child,
            weight,
            cache: SelectionCache::new(cache_type),
            total_weight: 0.0,
            _phantom: PhantomData,
        })
    }

    fn build(&self, solution: &S, items: Vec<C::Item>) -> Result<(Vec<(f64, C::Item)>, f64)> {
        let mut offset = 0.0;
        let mut line = Vec::with_capacity(items.len());
        for item in items {
            let weight = (self.weight)(solution, &item);
            if weight < 0.0 || weight.is_nan() {
                return Err(SearchForgeError::Config(format!(
                    "the probability weight ({}) of {:?} must be a non-negative number",
                    weight, item
                )));
            }
            if weight > 0.0 {
                line.push((offset, item));
                offset += weight;
            }
        }
        Ok((line, offset))
    }
}

impl<S, C, W> Debug for ProbabilitySelector<S, C, W>
where
    S: PlanningSolution,
    C: Selector<S>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbabilitySelector")
            .field("child", &self.child)
            .field("cache_type", &self.cache.cache_type())
            .field("total_weight", &self.total_weight)
            .finish()
    }
}

impl<S, C, W> Selector<S> for ProbabilitySelector<S, C, W>
where
    S: PlanningSolution,
    C: Selector<S>,
    W: Fn(&S, &C::Item) -> f64 + Send,
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
            let (line, total) = self.build(score_director.working_solution(), items)?;
            self.cache.fill(line);
            self.total_weight = total;
        }
        self.cache.dispose_on(event);
        Ok(())
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> Option<u64> {
        match self.cache.items("ProbabilitySelector") {
            Ok(line) => Some(line.len() as u64),
            Err(_) => self.child.size(score_director),
        }
    }

    fn is_never_ending(&self) -> bool {
        true
    }

    fn restart(&mut self, _score_director: &dyn ScoreDirector<S>, _rng: &mut StdRng) -> Result<()> {
        Ok(())
    }

    fn next(
        &mut self,
        _score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<Option<C::Item>> {
        let line = self.cache.items("ProbabilitySelector")?;
        if line.is_empty() {
            return Ok(None);
        }
        let point = rng.random::<f64>() * self.total_weight;
        // The floor entry: the last item whose offset is at or below the point.
        let index = line.partition_point(|(offset, _)| *offset <= point);
        Ok(Some(line[index.saturating_sub(1)].1.clone()))
    }
}
