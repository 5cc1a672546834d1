//! Value selectors.
//!
//! Values are either independent of the entity being changed (a value range
//! on the solution, or a static list) or depend on it (a value range per
//! entity, or nearby selection around the entity). Entity-independent value
//! selectors are plain [`Selector`]s, so every decorator applies to them;
//! [`ValueSelector`] is what change move selectors consume.

use std::fmt::Debug;

use rand::rngs::StdRng;
use rand::Rng;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::Result;
use searchforge_scoring::ScoreDirector;

use super::{SelectionOrder, Selector, SelectorEvent};

/// Selects values for one entity at a time.
pub trait ValueSelector<S: PlanningSolution>: Send + Debug {
    type Value: Clone + Send + Debug;

    fn lifecycle(
        &mut self,
        _event: SelectorEvent,
        _score_director: &dyn ScoreDirector<S>,
        _rng: &mut StdRng,
    ) -> Result<()> {
        Ok(())
    }

    /// Upper bound of the number of values per entity, when countable.
    fn size(&self, score_director: &dyn ScoreDirector<S>) -> Option<u64>;

    fn is_never_ending(&self) -> bool;

    /// Starts a pass over the values for `entity_index`.
    fn restart(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
        entity_index: usize,
    ) -> Result<()>;

    fn next(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<Option<Self::Value>>;
}

// A pass over a materialized list, in original or random order.
#[derive(Debug, Clone)]
struct ValueCursor<V> {
    values: Vec<V>,
    random: bool,
    cursor: usize,
}

impl<V: Clone> ValueCursor<V> {
    fn new(values: Vec<V>, random: bool) -> Self {
        Self {
            values,
            random,
            cursor: 0,
        }
    }

    fn reset(&mut self, values: Vec<V>) {
        self.values = values;
        self.cursor = 0;
    }

    fn next(&mut self, rng: &mut StdRng) -> Option<V> {
        if self.random {
            if self.values.is_empty() {
                return None;
            }
            let index = rng.random_range(0..self.values.len());
            return Some(self.values[index].clone());
        }
        let value = self.values.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(value)
    }
}

/// Selects from a value range extracted from the working solution.
pub struct FromSolutionValueSelector<S, V> {
    extractor: fn(&S) -> Vec<V>,
    cursor: ValueCursor<V>,
}

impl<S, V: Clone> FromSolutionValueSelector<S, V> {
    pub fn new(extractor: fn(&S) -> Vec<V>) -> Self {
        Self {
            extractor,
            cursor: ValueCursor::new(Vec::new(), false),
        }
    }

    pub fn random(extractor: fn(&S) -> Vec<V>) -> Self {
        Self {
            extractor,
            cursor: ValueCursor::new(Vec::new(), true),
        }
    }

    pub fn with_order(extractor: fn(&S) -> Vec<V>, order: SelectionOrder) -> Result<Self> {
        Ok(Self {
            extractor,
            cursor: ValueCursor::new(Vec::new(), order.to_random_selection()?),
        })
    }
}

impl<S, V: Debug> Debug for FromSolutionValueSelector<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FromSolutionValueSelector")
            .field("random", &self.cursor.random)
            .field("values", &self.cursor.values.len())
            .finish()
    }
}

impl<S, V> Selector<S> for FromSolutionValueSelector<S, V>
where
    S: PlanningSolution,
    V: Clone + Send + Debug + 'static,
{
    type Item = V;

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> Option<u64> {
        Some((self.extractor)(score_director.working_solution()).len() as u64)
    }

    fn is_never_ending(&self) -> bool {
        self.cursor.random
    }

    fn restart(&mut self, score_director: &dyn ScoreDirector<S>, _rng: &mut StdRng) -> Result<()> {
        self.cursor
            .reset((self.extractor)(score_director.working_solution()));
        Ok(())
    }

    fn next(&mut self, _score_director: &dyn ScoreDirector<S>, rng: &mut StdRng) -> Result<Option<V>> {
        Ok(self.cursor.next(rng))
    }
}

/// Selects from a fixed list of values.
#[derive(Debug, Clone)]
pub struct StaticValueSelector<V> {
    cursor: ValueCursor<V>,
}

impl<V: Clone> StaticValueSelector<V> {
    pub fn new(values: Vec<V>) -> Self {
        Self {
            cursor: ValueCursor::new(values, false),
        }
    }

    pub fn random(values: Vec<V>) -> Self {
        Self {
            cursor: ValueCursor::new(values, true),
        }
    }
}

impl<S, V> Selector<S> for StaticValueSelector<V>
where
    S: PlanningSolution,
    V: Clone + Send + Debug,
{
    type Item = V;

    fn size(&self, _score_director: &dyn ScoreDirector<S>) -> Option<u64> {
        Some(self.cursor.values.len() as u64)
    }

    fn is_never_ending(&self) -> bool {
        self.cursor.random
    }

    fn restart(&mut self, _score_director: &dyn ScoreDirector<S>, _rng: &mut StdRng) -> Result<()> {
        self.cursor.cursor = 0;
        Ok(())
    }

    fn next(&mut self, _score_director: &dyn ScoreDirector<S>, rng: &mut StdRng) -> Result<Option<V>> {
        Ok(self.cursor.next(rng))
    }
}

/// Uses any entity-independent selector as a value selector.
///
/// The entity is ignored; every restart restarts the child.
#[derive(Debug, Clone)]
pub struct EntityIndependentValueSelector<C> {
    child: C,
}

impl<C> EntityIndependentValueSelector<C> {
    pub fn new(child: C) -> Self {
        Self { child }
    }

    pub fn child(&self) -> &C {
        &self.child
    }
}

impl<S, C> ValueSelector<S> for EntityIndependentValueSelector<C>
where
    S: PlanningSolution,
    C: Selector<S>,
{
    type Value = C::Item;

    fn lifecycle(
        &mut self,
        event: SelectorEvent,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<()> {
        self.child.lifecycle(event, score_director, rng)
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> Option<u64> {
        self.child.size(score_director)
    }

    fn is_never_ending(&self) -> bool {
        self.child.is_never_ending()
    }

    fn restart(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
        _entity_index: usize,
    ) -> Result<()> {
        self.child.restart(score_director, rng)
    }

    fn next(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<Option<C::Item>> {
        self.child.next(score_director, rng)
    }
}

/// Selects from a value range that depends on the entity.
pub struct EntityValueRangeSelector<S, V> {
    range: fn(&S, usize) -> Vec<V>,
    cursor: ValueCursor<V>,
}

impl<S, V: Clone> EntityValueRangeSelector<S, V> {
    pub fn new(range: fn(&S, usize) -> Vec<V>) -> Self {
        Self {
            range,
            cursor: ValueCursor::new(Vec::new(), false),
        }
    }

    pub fn random(range: fn(&S, usize) -> Vec<V>) -> Self {
        Self {
            range,
            cursor: ValueCursor::new(Vec::new(), true),
        }
    }
}

impl<S, V: Debug> Debug for EntityValueRangeSelector<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityValueRangeSelector")
            .field("random", &self.cursor.random)
            .finish()
    }
}

impl<S, V> ValueSelector<S> for EntityValueRangeSelector<S, V>
where
    S: PlanningSolution,
    V: Clone + Send + Debug + 'static,
{
    type Value = V;

    fn size(&self, _score_director: &dyn ScoreDirector<S>) -> Option<u64> {
        None
    }

    fn is_never_ending(&self) -> bool {
        self.cursor.random
    }

    fn restart(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        _rng: &mut StdRng,
        entity_index: usize,
    ) -> Result<()> {
        self.cursor
            .reset((self.range)(score_director.working_solution(), entity_index));
        Ok(())
    }

    fn next(&mut self, _score_director: &dyn ScoreDirector<S>, rng: &mut StdRng) -> Result<Option<V>> {
        Ok(self.cursor.next(rng))
    }
}
