//! Union move selector.

use std::fmt::Debug;
use std::marker::PhantomData;

use rand::rngs::StdRng;
use rand::Rng;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::Result;
use searchforge_scoring::ScoreDirector;

use crate::heuristic::selector::{Selector, SelectorEvent};

/// Yields the moves of several child selectors.
///
/// In original order the children are exhausted one after another. In random
/// order every call picks a child with a probability proportional to its
/// size (an uncountable child weighs 1) and takes one move from it; the union
/// then never ends.
pub struct UnionMoveSelector<S: PlanningSolution, M> {
    children: Vec<Box<dyn Selector<S, Item = M>>>,
    random: bool,
    current: usize,
    exhausted: Vec<bool>,
}

impl<S: PlanningSolution, M> Debug for UnionMoveSelector<S, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnionMoveSelector")
            .field("children", &self.children)
            .field("random", &self.random)
            .finish()
    }
}

impl<S, M> UnionMoveSelector<S, M>
where
    S: PlanningSolution,
    M: Clone + Send + Debug + 'static,
{
    pub fn new(random: bool) -> Self {
        Self {
            children: Vec::new(),
            random,
            current: 0,
            exhausted: Vec::new(),
        }
    }

    /// Adds a child whose moves convert into the union's move type.
    pub fn with<C>(mut self, child: C) -> Self
    where
        C: Selector<S> + 'static,
        C::Item: Into<M>,
    {
        self.children
            .push(Box::new(IntoMoveSelector::<S, C, M>::new(child)));
        self
    }

    /// Adds a child that already yields the union's move type.
    pub fn push(&mut self, child: Box<dyn Selector<S, Item = M>>) {
        self.children.push(child);
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    fn weight(&self, index: usize, score_director: &dyn ScoreDirector<S>) -> f64 {
        if self.exhausted[index] {
            return 0.0;
        }
        self.children[index]
            .size(score_director)
            .map_or(1.0, |size| size as f64)
    }

    fn next_random(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<Option<M>> {
        loop {
            let weights: Vec<f64> = (0..self.children.len())
                .map(|i| self.weight(i, score_director))
                .collect();
            let total: f64 = weights.iter().sum();
            if total <= 0.0 {
                return Ok(None);
            }
            let mut point = rng.random::<f64>() * total;
            let mut chosen = weights.len() - 1;
            for (i, weight) in weights.iter().enumerate() {
                if point < *weight {
                    chosen = i;
                    break;
                }
                point -= weight;
            }
            let child = &mut self.children[chosen];
            if let Some(m) = child.next(score_director, rng)? {
                return Ok(Some(m));
            }
            // A finite child ran dry; start it over once before giving up on it.
            child.restart(score_director, rng)?;
            match child.next(score_director, rng)? {
                Some(m) => return Ok(Some(m)),
                None => self.exhausted[chosen] = true,
            }
        }
    }
}

impl<S, M> Selector<S> for UnionMoveSelector<S, M>
where
    S: PlanningSolution,
    M: Clone + Send + Debug + 'static,
{
    type Item = M;

    fn lifecycle(
        &mut self,
        event: SelectorEvent,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<()> {
        for child in &mut self.children {
            child.lifecycle(event, score_director, rng)?;
        }
        Ok(())
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> Option<u64> {
        self.children
            .iter()
            .map(|child| child.size(score_director))
            .sum()
    }

    fn is_never_ending(&self) -> bool {
        self.random || self.children.iter().any(|child| child.is_never_ending())
    }

    fn restart(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut StdRng) -> Result<()> {
        self.current = 0;
        self.exhausted = vec![false; self.children.len()];
        if self.random {
            for child in &mut self.children {
                child.restart(score_director, rng)?;
            }
        } else if let Some(first) = self.children.first_mut() {
            first.restart(score_director, rng)?;
        }
        Ok(())
    }

    fn next(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut StdRng) -> Result<Option<M>> {
        if self.random {
            return self.next_random(score_director, rng);
        }
        while self.current < self.children.len() {
            if let Some(m) = self.children[self.current].next(score_director, rng)? {
                return Ok(Some(m));
            }
            self.current += 1;
            if let Some(child) = self.children.get_mut(self.current) {
                child.restart(score_director, rng)?;
            }
        }
        Ok(None)
    }
}

/// Adapts a selector to yield another move type through `Into`.
///
/// Lets a union mix change and swap selectors as
/// [`EitherMove`](crate::heuristic::r#move::EitherMove)s.
pub struct IntoMoveSelector<S, C, M> {
    child: C,
    _phantom: PhantomData<fn() -> (S, M)>,
}

impl<S, C, M> IntoMoveSelector<S, C, M> {
    pub fn new(child: C) -> Self {
        Self {
            child,
            _phantom: PhantomData,
        }
    }
}

impl<S, C: Debug, M> Debug for IntoMoveSelector<S, C, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.child.fmt(f)
    }
}

impl<S, C, M> Selector<S> for IntoMoveSelector<S, C, M>
where
    S: PlanningSolution,
    C: Selector<S>,
    C::Item: Into<M>,
    M: Clone + Send + Debug,
{
    type Item = M;

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

    fn restart(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut StdRng) -> Result<()> {
        self.child.restart(score_director, rng)
    }

    fn next(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut StdRng) -> Result<Option<M>> {
        Ok(self.child.next(score_director, rng)?.map(Into::into))
    }
}
