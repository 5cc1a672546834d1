//! Nearby entity selection.

use std::fmt::Debug;
use std::marker::PhantomData;

use rand::rngs::StdRng;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::{Result, SearchForgeError};
use searchforge_scoring::ScoreDirector;
use tracing::trace;

use super::{NearbyDistanceMatrix, NearbyDistanceMeter, NearbyDistribution};
use crate::heuristic::selector::{SelectionOrder, Selector, SelectorEvent};

/// Selects entities near the entity its origin selector yields.
///
/// The origin itself is never selected. In original order a pass takes one
/// origin and returns every other entity from nearest to farthest. In random
/// order every call draws a rank from the distribution, so the selector
/// never ends. The ranking of each origin is cached until the phase ends.
pub struct NearbyEntitySelector<S, O, M> {
    origin: O,
    descriptor_index: usize,
    meter: M,
    distribution: NearbyDistribution,
    random: bool,
    matrix: NearbyDistanceMatrix<usize, usize>,
    current_origin: Option<usize>,
    cursor: usize,
    _phantom: PhantomData<fn() -> S>,
}

impl<S, O, M> NearbyEntitySelector<S, O, M>
where
    S: PlanningSolution,
    O: Selector<S, Item = usize>,
    M: NearbyDistanceMeter<S, usize, usize>,
{
    pub fn new(
        origin: O,
        descriptor_index: usize,
        meter: M,
        distribution: NearbyDistribution,
        order: SelectionOrder,
    ) -> Result<Self> {
        distribution.validate()?;
        let random = match order {
            SelectionOrder::Original | SelectionOrder::Random => order.is_random(),
            other => {
                return Err(SearchForgeError::Config(format!(
                    "nearby selection supports Original or Random order, not {:?}",
                    other
                )))
            }
        };
        Ok(Self {
            origin,
            descriptor_index,
            meter,
            distribution,
            random,
            matrix: NearbyDistanceMatrix::default(),
            current_origin: None,
            cursor: 0,
            _phantom: PhantomData,
        })
    }

    fn sorted_destinations<'a>(
        matrix: &'a mut NearbyDistanceMatrix<usize, usize>,
        meter: &M,
        descriptor_index: usize,
        score_director: &dyn ScoreDirector<S>,
        origin: usize,
    ) -> &'a [usize] {
        matrix.row(origin, || {
            let solution = score_director.working_solution();
            (0..score_director.entity_count(descriptor_index))
                .filter(|&destination| destination != origin)
                .map(|destination| (meter.distance(solution, &origin, &destination), destination))
                .collect()
        })
    }
}

impl<S, O: Debug, M> Debug for NearbyEntitySelector<S, O, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NearbyEntitySelector")
            .field("origin", &self.origin)
            .field("descriptor_index", &self.descriptor_index)
            .field("distribution", &self.distribution)
            .field("random", &self.random)
            .finish()
    }
}

impl<S, O, M> Selector<S> for NearbyEntitySelector<S, O, M>
where
    S: PlanningSolution,
    O: Selector<S, Item = usize>,
    M: NearbyDistanceMeter<S, usize, usize>,
{
    type Item = usize;

    fn lifecycle(
        &mut self,
        event: SelectorEvent,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<()> {
        self.origin.lifecycle(event, score_director, rng)?;
        if matches!(event, SelectorEvent::PhaseStarted | SelectorEvent::PhaseEnded) {
            self.matrix.clear();
        }
        Ok(())
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> Option<u64> {
        let count = score_director.entity_count(self.descriptor_index) as u64;
        Some(count.saturating_sub(1))
    }

    fn is_never_ending(&self) -> bool {
        self.random
    }

    fn restart(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut StdRng) -> Result<()> {
        self.current_origin = None;
        self.cursor = 0;
        self.origin.restart(score_director, rng)
    }

    fn next(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<Option<usize>> {
        let origin = match self.current_origin {
            Some(origin) => origin,
            None => match self.origin.next(score_director, rng)? {
                Some(origin) => {
                    self.current_origin = Some(origin);
                    origin
                }
                None => return Ok(None),
            },
        };
        let destinations = Self::sorted_destinations(
            &mut self.matrix,
            &self.meter,
            self.descriptor_index,
            score_director,
            origin,
        );
        if destinations.is_empty() {
            return Ok(None);
        }
        let rank = if self.random {
            self.distribution.next_index(rng, destinations.len())
        } else if self.cursor < destinations.len() {
            self.cursor += 1;
            self.cursor - 1
        } else {
            return Ok(None);
        };
        trace!(origin, rank, destination = destinations[rank], "nearby entity");
        Ok(Some(destinations[rank]))
    }
}
