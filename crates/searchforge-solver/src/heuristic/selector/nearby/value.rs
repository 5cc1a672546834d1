//! Nearby value selection.

use std::fmt::Debug;

use rand::rngs::StdRng;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::{Result, SearchForgeError};
use searchforge_scoring::ScoreDirector;

use super::{NearbyDistanceMatrix, NearbyDistanceMeter, NearbyDistribution};
use crate::heuristic::selector::{SelectionOrder, SelectorEvent, ValueSelector};

/// Selects values near the entity being changed.
///
/// The entity passed to [`restart`](ValueSelector::restart) is the origin;
/// the value range is ranked by the distance from that entity. A change move
/// selector therefore proposes, for every entity, the values closest to it.
pub struct NearbyValueSelector<S, V, M> {
    values: fn(&S) -> Vec<V>,
    meter: M,
    distribution: NearbyDistribution,
    random: bool,
    matrix: NearbyDistanceMatrix<usize, V>,
    origin: Option<usize>,
    cursor: usize,
}

impl<S, V, M> NearbyValueSelector<S, V, M>
where
    S: PlanningSolution,
    V: Clone + Send + Debug + 'static,
    M: NearbyDistanceMeter<S, usize, V>,
{
    pub fn new(
        values: fn(&S) -> Vec<V>,
        meter: M,
        distribution: NearbyDistribution,
        order: SelectionOrder,
    ) -> Result<Self> {
        distribution.validate()?;
        let random = match order {
            SelectionOrder::Original => false,
            SelectionOrder::Random => true,
            other => {
                return Err(SearchForgeError::Config(format!(
                    "nearby selection supports Original or Random order, not {:?}",
                    other
                )))
            }
        };
        Ok(Self {
            values,
            meter,
            distribution,
            random,
            matrix: NearbyDistanceMatrix::default(),
            origin: None,
            cursor: 0,
        })
    }
}

impl<S, V, M> Debug for NearbyValueSelector<S, V, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NearbyValueSelector")
            .field("distribution", &self.distribution)
            .field("random", &self.random)
            .field("origin", &self.origin)
            .finish()
    }
}

impl<S, V, M> ValueSelector<S> for NearbyValueSelector<S, V, M>
where
    S: PlanningSolution,
    V: Clone + Send + Debug + 'static,
    M: NearbyDistanceMeter<S, usize, V>,
{
    type Value = V;

    fn lifecycle(
        &mut self,
        event: SelectorEvent,
        _score_director: &dyn ScoreDirector<S>,
        _rng: &mut StdRng,
    ) -> Result<()> {
        if matches!(event, SelectorEvent::PhaseStarted | SelectorEvent::PhaseEnded) {
            self.matrix.clear();
        }
        Ok(())
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> Option<u64> {
        Some((self.values)(score_director.working_solution()).len() as u64)
    }

    fn is_never_ending(&self) -> bool {
        self.random
    }

    fn restart(
        &mut self,
        _score_director: &dyn ScoreDirector<S>,
        _rng: &mut StdRng,
        entity_index: usize,
    ) -> Result<()> {
        self.origin = Some(entity_index);
        self.cursor = 0;
        Ok(())
    }

    fn next(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<Option<V>> {
        let origin = self.origin.ok_or_else(|| {
            SearchForgeError::UsageOrder(
                "NearbyValueSelector::next called before restart".to_string(),
            )
        })?;
        let (values, meter) = (self.values, &self.meter);
        let sorted = self.matrix.row(origin, || {
            let solution = score_director.working_solution();
            values(solution)
                .into_iter()
                .map(|value| (meter.distance(solution, &origin, &value), value))
                .collect()
        });
        if sorted.is_empty() {
            return Ok(None);
        }
        if self.random {
            let rank = self.distribution.next_index(rng, sorted.len());
            return Ok(Some(sorted[rank].clone()));
        }
        let value = sorted.get(self.cursor).cloned();
        if value.is_some() {
            self.cursor += 1;
        }
        Ok(value)
    }
}
