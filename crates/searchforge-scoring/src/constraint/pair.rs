//! Pairwise conflict constraint.

use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;

use searchforge_core::domain::EntityReference;
use searchforge_core::score::Score;
use searchforge_core::{ConstraintRef, ImpactType};

use super::IncrementalConstraint;
use crate::analysis::ConstraintMatch;

/// Penalizes (or rewards) every pair of entities that share a key.
///
/// Entities whose key is `None` (typically unassigned) never match. The
/// constraint keeps a count per key, so inserting or retracting one entity
/// costs O(1).
pub struct PairConflictConstraint<S, Sc, K, E, F>
where
    Sc: Score,
{
    constraint_ref: ConstraintRef,
    impact_type: ImpactType,
    unit_weight: Sc,
    descriptor_index: usize,
    entity_count: E,
    key: F,
    stored_keys: Vec<Option<K>>,
    key_counts: HashMap<K, i64>,
    _phantom: PhantomData<fn(&S)>,
}

impl<S, Sc, K, E, F> PairConflictConstraint<S, Sc, K, E, F>
where
    Sc: Score,
    K: Hash + Eq + Clone + Send + Sync,
    E: Fn(&S) -> usize + Send + Sync,
    F: Fn(&S, usize) -> Option<K> + Send + Sync,
{
    pub fn new(
        constraint_ref: ConstraintRef,
        impact_type: ImpactType,
        unit_weight: Sc,
        descriptor_index: usize,
        entity_count: E,
        key: F,
    ) -> Self {
        Self {
            constraint_ref,
            impact_type,
            unit_weight,
            descriptor_index,
            entity_count,
            key,
            stored_keys: Vec::new(),
            key_counts: HashMap::new(),
            _phantom: PhantomData,
        }
    }

    fn signed_weight(&self) -> Sc {
        self.impact_type.apply(self.unit_weight)
    }

    fn count_keys(&self, solution: &S) -> HashMap<K, i64> {
        let mut counts = HashMap::new();
        for i in 0..(self.entity_count)(solution) {
            if let Some(key) = (self.key)(solution, i) {
                *counts.entry(key).or_insert(0) += 1;
            }
        }
        counts
    }
}

impl<S, Sc, K, E, F> IncrementalConstraint<S, Sc> for PairConflictConstraint<S, Sc, K, E, F>
where
    Sc: Score,
    K: Hash + Eq + Clone + Send + Sync,
    E: Fn(&S) -> usize + Send + Sync,
    F: Fn(&S, usize) -> Option<K> + Send + Sync,
{
    fn constraint_ref(&self) -> &ConstraintRef {
        &self.constraint_ref
    }

    fn weight(&self) -> Sc {
        self.signed_weight()
    }

    fn evaluate(&self, solution: &S) -> Sc {
        let pairs: i64 = self
            .count_keys(solution)
            .values()
            .map(|&c| c * (c - 1) / 2)
            .sum();
        self.signed_weight().multiply(pairs as f64)
    }

    fn match_count(&self, solution: &S) -> usize {
        self.count_keys(solution)
            .values()
            .map(|&c| (c * (c - 1) / 2) as usize)
            .sum()
    }

    fn initialize(&mut self, solution: &S) -> Sc {
        self.reset();
        let count = (self.entity_count)(solution);
        self.stored_keys = vec![None; count];
        let descriptor_index = self.descriptor_index;
        let mut total = Sc::zero();
        for i in 0..count {
            total = total + self.on_insert(solution, i, descriptor_index);
        }
        total
    }

    fn on_insert(&mut self, solution: &S, entity_index: usize, descriptor_index: usize) -> Sc {
        if descriptor_index != self.descriptor_index {
            return Sc::zero();
        }
        let Some(key) = (self.key)(solution, entity_index) else {
            return Sc::zero();
        };
        if entity_index >= self.stored_keys.len() {
            self.stored_keys.resize(entity_index + 1, None);
        }
        let count = self.key_counts.entry(key.clone()).or_insert(0);
        let existing = *count;
        *count += 1;
        self.stored_keys[entity_index] = Some(key);
        self.signed_weight().multiply(existing as f64)
    }

    fn on_retract(&mut self, _solution: &S, entity_index: usize, descriptor_index: usize) -> Sc {
        if descriptor_index != self.descriptor_index {
            return Sc::zero();
        }
        let Some(key) = self.stored_keys.get_mut(entity_index).and_then(Option::take) else {
            return Sc::zero();
        };
        let Some(count) = self.key_counts.get_mut(&key) else {
            return Sc::zero();
        };
        *count -= 1;
        let remaining = *count;
        if remaining == 0 {
            self.key_counts.remove(&key);
        }
        -self.signed_weight().multiply(remaining as f64)
    }

    fn reset(&mut self) {
        self.stored_keys.clear();
        self.key_counts.clear();
    }

    fn get_matches(&self, solution: &S) -> Vec<ConstraintMatch<Sc>> {
        let count = (self.entity_count)(solution);
        let keys: Vec<Option<K>> = (0..count).map(|i| (self.key)(solution, i)).collect();
        let mut matches = Vec::new();
        for a in 0..count {
            let Some(key_a) = &keys[a] else { continue };
            for (b, key_b) in keys.iter().enumerate().skip(a + 1) {
                if key_b.as_ref() == Some(key_a) {
                    matches.push(ConstraintMatch::new(
                        self.constraint_ref.clone(),
                        self.signed_weight(),
                        vec![
                            EntityReference::new(self.descriptor_index, a),
                            EntityReference::new(self.descriptor_index, b),
                        ],
                    ));
                }
            }
        }
        matches
    }
}

impl<S, Sc: Score, K, E: Clone, F: Clone> Clone for PairConflictConstraint<S, Sc, K, E, F> {
    fn clone(&self) -> Self {
        Self {
            constraint_ref: self.constraint_ref.clone(),
            impact_type: self.impact_type,
            unit_weight: self.unit_weight,
            descriptor_index: self.descriptor_index,
            entity_count: self.entity_count.clone(),
            key: self.key.clone(),
            stored_keys: Vec::new(),
            key_counts: HashMap::new(),
            _phantom: PhantomData,
        }
    }
}
