//! Per-entity constraint.

use std::marker::PhantomData;

use searchforge_core::domain::EntityReference;
use searchforge_core::score::Score;
use searchforge_core::{ConstraintRef, ImpactType};

use super::IncrementalConstraint;
use crate::analysis::ConstraintMatch;

/// Scores every entity of one descriptor on its own.
///
/// `match_weight` returns how many units the entity matches (zero for no
/// match); the unit weight and impact type turn that into a score.
///
/// # Example
///
/// ```
/// use searchforge_core::{ConstraintRef, ImpactType, SimpleScore};
/// use searchforge_scoring::{IncrementalConstraint, UniConstraint};
///
/// struct Plan { values: Vec<Option<i64>> }
///
/// let mut unassigned = UniConstraint::new(
///     ConstraintRef::new("", "Unassigned"),
///     ImpactType::Penalty,
///     SimpleScore::of(1),
///     0,
///     |p: &Plan| p.values.len(),
///     |p: &Plan, i: usize| if p.values[i].is_none() { 1 } else { 0 },
/// );
///
/// let plan = Plan { values: vec![Some(1), None, None] };
/// assert_eq!(unassigned.initialize(&plan), SimpleScore::of(-2));
/// ```
pub struct UniConstraint<S, Sc, E, W>
where
    Sc: Score,
{
    constraint_ref: ConstraintRef,
    impact_type: ImpactType,
    unit_weight: Sc,
    descriptor_index: usize,
    entity_count: E,
    match_weight: W,
    contributions: Vec<Sc>,
    _phantom: PhantomData<fn(&S)>,
}

impl<S, Sc, E, W> UniConstraint<S, Sc, E, W>
where
    Sc: Score,
    E: Fn(&S) -> usize + Send + Sync,
    W: Fn(&S, usize) -> i64 + Send + Sync,
{
    pub fn new(
        constraint_ref: ConstraintRef,
        impact_type: ImpactType,
        unit_weight: Sc,
        descriptor_index: usize,
        entity_count: E,
        match_weight: W,
    ) -> Self {
        Self {
            constraint_ref,
            impact_type,
            unit_weight,
            descriptor_index,
            entity_count,
            match_weight,
            contributions: Vec::new(),
            _phantom: PhantomData,
        }
    }

    #[inline]
    fn score_of(&self, solution: &S, entity_index: usize) -> Sc {
        let units = (self.match_weight)(solution, entity_index);
        self.impact_type
            .apply(self.unit_weight)
            .multiply(units as f64)
    }
}

impl<S, Sc, E, W> IncrementalConstraint<S, Sc> for UniConstraint<S, Sc, E, W>
where
    Sc: Score,
    E: Fn(&S) -> usize + Send + Sync,
    W: Fn(&S, usize) -> i64 + Send + Sync,
{
    fn constraint_ref(&self) -> &ConstraintRef {
        &self.constraint_ref
    }

    fn weight(&self) -> Sc {
        self.impact_type.apply(self.unit_weight)
    }

    fn evaluate(&self, solution: &S) -> Sc {
        (0..(self.entity_count)(solution))
            .map(|i| self.score_of(solution, i))
            .fold(Sc::zero(), |acc, s| acc + s)
    }

    fn match_count(&self, solution: &S) -> usize {
        (0..(self.entity_count)(solution))
            .filter(|&i| (self.match_weight)(solution, i) != 0)
            .count()
    }

    fn initialize(&mut self, solution: &S) -> Sc {
        let count = (self.entity_count)(solution);
        self.contributions = (0..count).map(|i| self.score_of(solution, i)).collect();
        self.contributions
            .iter()
            .fold(Sc::zero(), |acc, s| acc + *s)
    }

    fn on_insert(&mut self, solution: &S, entity_index: usize, descriptor_index: usize) -> Sc {
        if descriptor_index != self.descriptor_index {
            return Sc::zero();
        }
        if entity_index >= self.contributions.len() {
            self.contributions.resize(entity_index + 1, Sc::zero());
        }
        let score = self.score_of(solution, entity_index);
        self.contributions[entity_index] = score;
        score
    }

    fn on_retract(&mut self, _solution: &S, entity_index: usize, descriptor_index: usize) -> Sc {
        if descriptor_index != self.descriptor_index {
            return Sc::zero();
        }
        match self.contributions.get_mut(entity_index) {
            Some(stored) => -std::mem::take(stored),
            None => Sc::zero(),
        }
    }

    fn reset(&mut self) {
        self.contributions.clear();
    }

    fn get_matches(&self, solution: &S) -> Vec<ConstraintMatch<Sc>> {
        (0..(self.entity_count)(solution))
            .filter(|&i| (self.match_weight)(solution, i) != 0)
            .map(|i| {
                ConstraintMatch::new(
                    self.constraint_ref.clone(),
                    self.score_of(solution, i),
                    vec![EntityReference::new(self.descriptor_index, i)],
                )
            })
            .collect()
    }
}

impl<S, Sc: Score, E: Clone, W: Clone> Clone for UniConstraint<S, Sc, E, W> {
    fn clone(&self) -> Self {
        Self {
            constraint_ref: self.constraint_ref.clone(),
            impact_type: self.impact_type,
            unit_weight: self.unit_weight,
            descriptor_index: self.descriptor_index,
            entity_count: self.entity_count.clone(),
            match_weight: self.match_weight.clone(),
            contributions: Vec::new(),
            _phantom: PhantomData,
        }
    }
}
