//! Change move selector.

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use rand::rngs::StdRng;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::Result;
use searchforge_scoring::ScoreDirector;

use crate::heuristic::r#move::ChangeMove;
use crate::heuristic::selector::{
    EntityIndependentValueSelector, FromSolutionEntitySelector, FromSolutionValueSelector,
    Selector, SelectorEvent, ValueSelector,
};

/// Combines every selected entity with the values selected for it.
///
/// With a finite value selector a pass yields, for each entity, every value.
/// With a never-ending value selector every move pairs a freshly selected
/// entity with one value, so random entity and value selection interleave.
pub struct ChangeMoveSelector<S, V, ES, VS> {
    entity_selector: ES,
    value_selector: VS,
    getter: fn(&S, usize) -> Option<V>,
    setter: fn(&mut S, usize, Option<V>),
    descriptor_index: usize,
    variable_name: &'static str,
    current_entity: Option<usize>,
    _phantom: PhantomData<fn() -> S>,
}

impl<S, V, ES: Debug, VS: Debug> Debug for ChangeMoveSelector<S, V, ES, VS> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeMoveSelector")
            .field("entity_selector", &self.entity_selector)
            .field("value_selector", &self.value_selector)
            .field("descriptor_index", &self.descriptor_index)
            .field("variable_name", &self.variable_name)
            .finish()
    }
}

impl<S, V, ES, VS> ChangeMoveSelector<S, V, ES, VS>
where
    S: PlanningSolution,
    ES: Selector<S, Item = usize>,
    VS: ValueSelector<S, Value = V>,
{
    pub fn new(
        entity_selector: ES,
        value_selector: VS,
        getter: fn(&S, usize) -> Option<V>,
        setter: fn(&mut S, usize, Option<V>),
        descriptor_index: usize,
        variable_name: &'static str,
    ) -> Self {
        Self {
            entity_selector,
            value_selector,
            getter,
            setter,
            descriptor_index,
            variable_name,
            current_entity: None,
            _phantom: PhantomData,
        }
    }
}

impl<S, V>
    ChangeMoveSelector<
        S,
        V,
        FromSolutionEntitySelector,
        EntityIndependentValueSelector<FromSolutionValueSelector<S, V>>,
    >
where
    S: PlanningSolution,
    V: Clone + Send + Debug + 'static,
{
    /// Selects entities and values straight from the working solution.
    pub fn from_solution(
        getter: fn(&S, usize) -> Option<V>,
        setter: fn(&mut S, usize, Option<V>),
        descriptor_index: usize,
        variable_name: &'static str,
        values: fn(&S) -> Vec<V>,
        random: bool,
    ) -> Self {
        let (entities, value_range) = if random {
            (
                FromSolutionEntitySelector::random(descriptor_index),
                FromSolutionValueSelector::random(values),
            )
        } else {
            (
                FromSolutionEntitySelector::new(descriptor_index),
                FromSolutionValueSelector::new(values),
            )
        };
        Self::new(
            entities,
            EntityIndependentValueSelector::new(value_range),
            getter,
            setter,
            descriptor_index,
            variable_name,
        )
    }
}

impl<S, V, ES, VS> Selector<S> for ChangeMoveSelector<S, V, ES, VS>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
    ES: Selector<S, Item = usize>,
    VS: ValueSelector<S, Value = V>,
{
    type Item = ChangeMove<S, V>;

    fn lifecycle(
        &mut self,
        event: SelectorEvent,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<()> {
        self.entity_selector.lifecycle(event, score_director, rng)?;
        self.value_selector.lifecycle(event, score_director, rng)
    }

    fn size(&self, score_director: &dyn ScoreDirector<S>) -> Option<u64> {
        let entities = self.entity_selector.size(score_director)?;
        let values = self.value_selector.size(score_director)?;
        Some(entities * values)
    }

    fn is_never_ending(&self) -> bool {
        self.entity_selector.is_never_ending() || self.value_selector.is_never_ending()
    }

    fn restart(&mut self, score_director: &dyn ScoreDirector<S>, rng: &mut StdRng) -> Result<()> {
        self.current_entity = None;
        self.entity_selector.restart(score_director, rng)
    }

    fn next(
        &mut self,
        score_director: &dyn ScoreDirector<S>,
        rng: &mut StdRng,
    ) -> Result<Option<ChangeMove<S, V>>> {
        // Entities with an empty value range are skipped, but a never-ending
        // entity selector must not spin forever on them.
        let mut empty_entities = 0u64;
        let empty_limit = self.entity_selector.size(score_director).unwrap_or(0).max(1);
        loop {
            let entity = match self.current_entity {
                Some(entity) => entity,
                None => {
                    let Some(entity) = self.entity_selector.next(score_director, rng)? else {
                        return Ok(None);
                    };
                    self.value_selector.restart(score_director, rng, entity)?;
                    self.current_entity = Some(entity);
                    entity
                }
            };
            match self.value_selector.next(score_director, rng)? {
                Some(value) => {
                    if self.value_selector.is_never_ending() {
                        self.current_entity = None;
                    }
                    return Ok(Some(ChangeMove::new(
                        entity,
                        Some(value),
                        self.getter,
                        self.setter,
                        self.variable_name,
                        self.descriptor_index,
                    )));
                }
                None => {
                    self.current_entity = None;
                    if self.entity_selector.is_never_ending() {
                        empty_entities += 1;
                        if empty_entities > empty_limit {
                            return Ok(None);
                        }
                    }
                }
            }
        }
    }
}
