//! Cartesian product move selector.

use std::fmt::Debug;

use rand::rngs::StdRng;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::Result;
use searchforge_scoring::ScoreDirector;

use crate::heuristic::r#move::{CompositeMove, Move};
use crate::heuristic::selector::{Selector, SelectorEvent};

/// Combines one move of every child into a [`CompositeMove`].
///
/// In original order the combinations are enumerated like an odometer: the
/// last child advances fastest, and every child restarts whenever a child
/// before it advances, so a child replaying an earlier one sees its current
/// item. When any child never ends, every call restarts each child in turn
/// and takes one move from it.
pub struct CartesianProductMoveSelector<S: PlanningSolution, M> {
    children: Vec<Box<dyn Selector<S, Item = M>>>,
    current: Vec<M>,
    started: bool,
    exhausted: bool,
}

impl<S: PlanningSolution, M: Debug> Debug for CartesianProductMoveSelector<S, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartesianProductMoveSelector")
            .field("children", &self.children)
            .finish()
    }
}

impl<S, M> CartesianProductMoveSelector<S, M>
where
    S: PlanningSolution,
    M: Move<S> + 'static,
{
    pub fn new(children: Vec<Box<dyn Selector<S, Item = M>>>) -> Self {
        Self {
            children,
            current: Vec::new(),
            started: false,
            exhausted: false,
        }
    }

    // Refills children from `from` onwards. Returns false when one of them is empty.
    fn fill_from(
        &mut self,
        from: usize,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<bool> {
        self.current.truncate(from);
        for child in &mut self.children[from..] {
            child.restart(score_director, rng)?;
            match child.next(score_director, rng)? {
                Some(m) => self.current.push(m),
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    fn composite(&self) -> CompositeMove<S, M> {
        CompositeMove::new(self.current.clone())
    }
}

impl<S, M> Selector<S> for CartesianProductMoveSelector<S, M>
where
    S: PlanningSolution,
    M: Move<S> + 'static,
{
    type Item = CompositeMove<S, M>;

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
            .product()
    }

    fn is_never_ending(&self) -> bool {
        self.children.iter().any(|child| child.is_never_ending())
    }

    fn restart(&mut self, _score_director: &dyn ScoreDirector<S>, _rng: &mut StdRng) -> Result<()> {
        self.current.clear();
        self.started = false;
        self.exhausted = false;
        Ok(())
    }

    fn next(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<Option<CompositeMove<S, M>>> {
        if self.children.is_empty() || self.exhausted {
            return Ok(None);
        }
        if self.is_never_ending() {
            if self.fill_from(0, score_director, rng)? {
                return Ok(Some(self.composite()));
            }
            return Ok(None);
        }
        let mut index = self.children.len();
        if !self.started {
            self.started = true;
            if self.fill_from(0, score_director, rng)? {
                return Ok(Some(self.composite()));
            }
            index = self.current.len();
        }
        // Advance the rightmost child that still has moves.
        while index > 0 {
            index -= 1;
            if let Some(m) = self.children[index].next(score_director, rng)? {
                self.current.truncate(index);
                self.current.push(m);
                if self.fill_from(index + 1, score_director, rng)? {
                    return Ok(Some(self.composite()));
                }
                // A later child is empty for this prefix; keep advancing.
                index = self.current.len();
            }
        }
        self.exhausted = true;
        Ok(None)
    }
}
