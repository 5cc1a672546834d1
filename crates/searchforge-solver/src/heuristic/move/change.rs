//! ChangeMove - assigns a value to a planning variable.
//!
//! This move stores typed function pointers that operate directly on the
//! solution. No `Arc<dyn>`, no `Box<dyn Any>`, no `downcast_ref`.

use std::fmt::Debug;
use std::hash::Hash;

use searchforge_core::domain::PlanningSolution;
use searchforge_core::Result;
use searchforge_scoring::ScoreDirector;
use smallvec::{smallvec, SmallVec};

use super::{signature_of, Move};

/// A move that assigns a value to an entity's variable.
///
/// # Type Parameters
/// * `S` - The planning solution type
/// * `V` - The variable value type
///
/// # Example
/// ```
/// use searchforge_solver::heuristic::r#move::{ChangeMove, Move};
/// use searchforge_scoring::{ScoreDirector, SimpleScoreDirector};
/// use searchforge_test::pair::{self, PairSolution};
/// use searchforge_core::SimpleScore;
///
/// let mut director = SimpleScoreDirector::new(
///     PairSolution::with_values(&[1, 1]),
///     pair::create_pair_descriptor(),
///     pair::calculate_conflicts,
/// );
/// let m = ChangeMove::new(1, Some(2), pair::get_value, pair::set_value, "value", 0);
/// assert!(m.is_doable(&director));
///
/// let undo = m.do_move(&mut director).unwrap();
/// assert_eq!(director.calculate_score(), SimpleScore::of(0));
/// undo.do_move(&mut director).unwrap();
/// assert_eq!(director.calculate_score(), SimpleScore::of(-1));
/// ```
#[derive(Clone, Copy)]
pub struct ChangeMove<S, V> {
    entity_index: usize,
    to_value: Option<V>,
    getter: fn(&S, usize) -> Option<V>,
    setter: fn(&mut S, usize, Option<V>),
    variable_name: &'static str,
    descriptor_index: usize,
}

impl<S, V: Debug> Debug for ChangeMove<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeMove")
            .field("entity_index", &self.entity_index)
            .field("descriptor_index", &self.descriptor_index)
            .field("variable_name", &self.variable_name)
            .field("to_value", &self.to_value)
            .finish()
    }
}

impl<S, V> ChangeMove<S, V> {
    /// Creates a new change move.
    ///
    /// # Arguments
    /// * `entity_index` - Index of the entity in its collection
    /// * `to_value` - The value to assign (None to unassign)
    /// * `getter` - Reads the current value from the solution
    /// * `setter` - Writes a value into the solution
    /// * `variable_name` - Name of the variable, as declared on the descriptor
    /// * `descriptor_index` - Index of the entity descriptor
    pub fn new(
        entity_index: usize,
        to_value: Option<V>,
        getter: fn(&S, usize) -> Option<V>,
        setter: fn(&mut S, usize, Option<V>),
        variable_name: &'static str,
        descriptor_index: usize,
    ) -> Self {
        Self {
            entity_index,
            to_value,
            getter,
            setter,
            variable_name,
            descriptor_index,
        }
    }

    pub fn entity_index(&self) -> usize {
        self.entity_index
    }

    pub fn to_value(&self) -> Option<&V> {
        self.to_value.as_ref()
    }
}

impl<S, V> Move<S> for ChangeMove<S, V>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
{
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool {
        let current = (self.getter)(score_director.working_solution(), self.entity_index);
        current != self.to_value
    }

    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) -> Result<Self> {
        let old_value = (self.getter)(score_director.working_solution(), self.entity_index);

        score_director.before_variable_changed(
            self.descriptor_index,
            self.entity_index,
            self.variable_name,
        )?;
        (self.setter)(
            score_director.working_solution_mut(),
            self.entity_index,
            self.to_value.clone(),
        );
        score_director.after_variable_changed(
            self.descriptor_index,
            self.entity_index,
            self.variable_name,
        )?;
        score_director.trigger_variable_listeners()?;

        Ok(Self {
            to_value: old_value,
            ..self.clone()
        })
    }

    fn descriptor_index(&self) -> usize {
        self.descriptor_index
    }

    fn entity_indices(&self) -> &[usize] {
        std::slice::from_ref(&self.entity_index)
    }

    fn variable_name(&self) -> &str {
        self.variable_name
    }

    fn tabu_values(&self, _score_director: &dyn ScoreDirector<S>) -> SmallVec<[u64; 2]> {
        smallvec![signature_of(&self.to_value)]
    }

    fn tabu_key(&self) -> u64 {
        signature_of(&(
            "change",
            self.descriptor_index,
            self.variable_name,
            self.entity_index,
            &self.to_value,
        ))
    }
}
