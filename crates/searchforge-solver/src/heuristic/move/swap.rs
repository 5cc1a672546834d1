//! SwapMove - exchanges values between two entities.

use std::fmt::Debug;
use std::hash::Hash;

use searchforge_core::domain::PlanningSolution;
use searchforge_core::Result;
use searchforge_scoring::ScoreDirector;
use smallvec::{smallvec, SmallVec};

use super::{signature_of, Move};

/// A move that swaps the values of one variable between two entities.
///
/// A swap is its own undo move.
#[derive(Clone, Copy)]
pub struct SwapMove<S, V> {
    indices: [usize; 2],
    getter: fn(&S, usize) -> Option<V>,
    setter: fn(&mut S, usize, Option<V>),
    variable_name: &'static str,
    descriptor_index: usize,
}

impl<S, V> Debug for SwapMove<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwapMove")
            .field("left_entity_index", &self.indices[0])
            .field("right_entity_index", &self.indices[1])
            .field("descriptor_index", &self.descriptor_index)
            .field("variable_name", &self.variable_name)
            .finish()
    }
}

impl<S, V> SwapMove<S, V> {
    pub fn new(
        left_entity_index: usize,
        right_entity_index: usize,
        getter: fn(&S, usize) -> Option<V>,
        setter: fn(&mut S, usize, Option<V>),
        variable_name: &'static str,
        descriptor_index: usize,
    ) -> Self {
        Self {
            indices: [left_entity_index, right_entity_index],
            getter,
            setter,
            variable_name,
            descriptor_index,
        }
    }

    pub fn left_entity_index(&self) -> usize {
        self.indices[0]
    }

    pub fn right_entity_index(&self) -> usize {
        self.indices[1]
    }
}

impl<S, V> Move<S> for SwapMove<S, V>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
{
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool {
        let [left, right] = self.indices;
        if left == right {
            return false;
        }
        let solution = score_director.working_solution();
        (self.getter)(solution, left) != (self.getter)(solution, right)
    }

    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) -> Result<Self> {
        let [left, right] = self.indices;
        let left_value = (self.getter)(score_director.working_solution(), left);
        let right_value = (self.getter)(score_director.working_solution(), right);

        score_director.before_variable_changed(self.descriptor_index, left, self.variable_name)?;
        score_director.before_variable_changed(self.descriptor_index, right, self.variable_name)?;
        let solution = score_director.working_solution_mut();
        (self.setter)(solution, left, right_value);
        (self.setter)(solution, right, left_value);
        score_director.after_variable_changed(self.descriptor_index, left, self.variable_name)?;
        score_director.after_variable_changed(self.descriptor_index, right, self.variable_name)?;
        score_director.trigger_variable_listeners()?;

        Ok(self.clone())
    }

    fn descriptor_index(&self) -> usize {
        self.descriptor_index
    }

    fn entity_indices(&self) -> &[usize] {
        &self.indices
    }

    fn variable_name(&self) -> &str {
        self.variable_name
    }

    fn tabu_values(&self, score_director: &dyn ScoreDirector<S>) -> SmallVec<[u64; 2]> {
        let solution = score_director.working_solution();
        smallvec![
            signature_of(&(self.getter)(solution, self.indices[0])),
            signature_of(&(self.getter)(solution, self.indices[1])),
        ]
    }

    fn tabu_key(&self) -> u64 {
        signature_of(&(
            "swap",
            self.descriptor_index,
            self.variable_name,
            self.indices,
        ))
    }
}
