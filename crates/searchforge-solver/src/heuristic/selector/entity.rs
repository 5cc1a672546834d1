//! Entity selectors for iterating over planning entities.
//!
//! Entity selectors yield entity indices within one entity descriptor.

use std::fmt::Debug;

use rand::rngs::StdRng;
use rand::Rng;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::Result;
use searchforge_scoring::ScoreDirector;

use super::{SelectionOrder, Selector};

/// Selects the entities of one descriptor straight from the working solution.
///
/// In original order every entity is returned once per pass. In random order
/// every call draws an entity uniformly, so the selector never ends.
#[derive(Debug, Clone)]
pub struct FromSolutionEntitySelector {
    descriptor_index: usize,
    random: bool,
    cursor: usize,
}

impl FromSolutionEntitySelector {
    /// Creates a selector that returns the entities in their original order.
    pub fn new(descriptor_index: usize) -> Self {
        Self {
            descriptor_index,
            random: false,
            cursor: 0,
        }
    }

    /// Creates a selector that draws entities at random.
    pub fn random(descriptor_index: usize) -> Self {
        Self {
            random: true,
            ..Self::new(descriptor_index)
        }
    }

    /// Creates a selector for a resolved `Original` or `Random` order.
    pub fn with_order(descriptor_index: usize, order: SelectionOrder) -> Result<Self> {
        Ok(Self {
            random: order.to_random_selection()?,
            ..Self::new(descriptor_index)
        })
    }

    pub fn descriptor_index(&self) -> usize {
        self.descriptor_index
    }
}

impl<S: PlanningSolution> Selector<S> for FromSolutionEntitySelector {
    type Item = usize;

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> Option<u64> {
        Some(score_director.entity_count(self.descriptor_index) as u64)
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
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<Option<usize>> {
        let count = score_director.entity_count(self.descriptor_index);
        if self.random {
            if count == 0 {
                return Ok(None);
            }
            return Ok(Some(rng.random_range(0..count)));
        }
        if self.cursor >= count {
            return Ok(None);
        }
        self.cursor += 1;
        Ok(Some(self.cursor - 1))
    }
}
