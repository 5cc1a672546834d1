//! Nearby selection.
//!
//! Nearby selection picks destinations close to an origin first. Candidates
//! are ranked by a user supplied [`NearbyDistanceMeter`]; a
//! [`NearbyDistribution`] decides how strongly random selection favors the
//! nearest ranks. The origin usually comes from a
//! [`MimicReplayingSelector`](super::MimicReplayingSelector), so a swap or
//! change move combines an entity with something near it.

mod distribution;
mod entity;
mod meter;
mod value;


pub use distribution::NearbyDistribution;
pub use entity::NearbyEntitySelector;
pub use meter::NearbyDistanceMeter;
pub use value::NearbyValueSelector;

use std::collections::HashMap;

// Destinations per origin, sorted by distance. Rebuilt once per phase.
#[derive(Debug)]
pub(crate) struct NearbyDistanceMatrix<O, D> {
    rows: HashMap<O, Vec<D>>,
}

impl<O, D> Default for NearbyDistanceMatrix<O, D> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }
}

impl<O: std::hash::Hash + Eq + Copy, D> NearbyDistanceMatrix<O, D> {
    pub(crate) fn clear(&mut self) {
        self.rows.clear();
    }

    /// Returns the sorted destinations of `origin`, computing them on first use.
    pub(crate) fn row(
        &mut self,
        origin: O,
        build: impl FnOnce() -> Vec<(f64, D)>,
    ) -> &[D] {
        self.rows.entry(origin).or_insert_with(|| {
            let mut scored = build();
            scored.sort_by(|a, b| a.0.total_cmp(&b.0));
            scored.into_iter().map(|(_, d)| d).collect()
        })
    }
}
