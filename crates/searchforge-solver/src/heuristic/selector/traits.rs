//! Selector trait and lifecycle events.

use std::fmt::Debug;

use rand::rngs::StdRng;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::Result;
use searchforge_scoring::ScoreDirector;

/// Solver events forwarded to every selector.
///
/// Caching selectors build their cache on the started event of their cache
/// scope and dispose it on the matching ended event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorEvent {
    SolvingStarted,
    PhaseStarted,
    StepStarted,
    StepEnded,
    PhaseEnded,
    SolvingEnded,
}

/// A restartable cursor over entities, values or moves.
///
/// Selectors are cursors, not iterators: a parent selector calls
/// [`restart`](Selector::restart) and then pulls items with
/// [`next`](Selector::next) until it returns `None`. A never-ending selector
/// never returns `None` on its own; the caller decides when to stop.
///
/// Every method receives the score director and the solver's seeded random
/// source, so selection is reproducible for a given seed. The trait is object
/// safe: `Box<dyn Selector<S, Item = M>>` is itself a selector.
pub trait Selector<S: PlanningSolution>: Send + Debug {
    type Item: Clone + Send + Debug;

    /// Receives a solver event. Decorators forward it to their children first.
    fn lifecycle(
        &mut self,
        _event: SelectorEvent,
        _score_director: &dyn ScoreDirector<S>,
        _rng: &mut StdRng,
    ) -> Result<()> {
        Ok(())
    }

    /// Number of items a full pass yields, when countable.
    fn size(&self, score_director: &dyn ScoreDirector<S>) -> Option<u64>;

    /// Returns true if `next` never runs out on its own.
    fn is_never_ending(&self) -> bool;

    /// Starts a new pass.
    fn restart(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut StdRng) -> Result<()>;

    /// Returns the next item of the current pass.
    fn next(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<Option<Self::Item>>;
}

impl<S, T> Selector<S> for Box<T>
where
    S: PlanningSolution,
    T: Selector<S> + ?Sized,
{
    type Item = T::Item;

    fn lifecycle(
        &mut self,
        event: SelectorEvent,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<()> {
        (**self).lifecycle(event, score_director, rng)
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> Option<u64> {
        (**self).size(score_director)
    }

    fn is_never_ending(&self) -> bool {
        (**self).is_never_ending()
    }

    fn restart(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut StdRng) -> Result<()> {
        (**self).restart(score_director, rng)
    }

    fn next(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<Option<Self::Item>> {
        (**self).next(score_director, rng)
    }
}

/// Runs a full pass of a finite selector and collects its items.
pub(crate) fn collect_pass<S, C>(
    child: &mut C,
    score_director: &dyn ScoreDirector<S>,
    rng: &mut StdRng,
) -> Result<Vec<C::Item>>
where
    S: PlanningSolution,
    C: Selector<S> + ?Sized,
{
    let mut items = Vec::new();
    child.restart(score_director, rng)?;
    while let Some(item) = child.next(score_director, rng)? {
        items.push(item);
    }
    Ok(items)
}
