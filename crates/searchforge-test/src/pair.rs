//! The smallest interesting problem.
//!
//! Two entities, each with one `value` variable ranging over `{1, 2, 3}`.
//! Every pair of entities sharing a value costs one point.
//!
//! ```
//! use searchforge_test::pair::{calculate_conflicts, PairSolution};
//! use searchforge_core::SimpleScore;
//!
//! let solution = PairSolution::with_values(&[1, 1]);
//! assert_eq!(calculate_conflicts(&solution), SimpleScore::of(-1));
//! ```

use searchforge_core::domain::{
    EntityDescriptor, PlanningSolution, SolutionDescriptor, VariableDescriptor,
};
use searchforge_core::score::SimpleScore;

/// The value range of every entity.
pub const VALUE_RANGE: [i64; 3] = [1, 2, 3];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairSolution {
    pub values: Vec<Option<i64>>,
    pub score: Option<SimpleScore>,
}

impl PairSolution {
    pub fn with_values(values: &[i64]) -> Self {
        Self {
            values: values.iter().copied().map(Some).collect(),
            score: None,
        }
    }

    pub fn unassigned(n: usize) -> Self {
        Self {
            values: vec![None; n],
            score: None,
        }
    }
}

impl PlanningSolution for PairSolution {
    type Score = SimpleScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }

    fn is_initialized(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }
}

pub fn entity_count(s: &PairSolution) -> usize {
    s.values.len()
}

pub fn get_value(s: &PairSolution, idx: usize) -> Option<i64> {
    s.values.get(idx).copied().flatten()
}

pub fn set_value(s: &mut PairSolution, idx: usize, v: Option<i64>) {
    if let Some(slot) = s.values.get_mut(idx) {
        *slot = v;
    }
}

pub fn value_range(_s: &PairSolution) -> Vec<i64> {
    VALUE_RANGE.to_vec()
}

/// Counts pairs of entities sharing a value, as a negative score.
pub fn calculate_conflicts(solution: &PairSolution) -> SimpleScore {
    let values = &solution.values;
    let mut conflicts = 0;
    for i in 0..values.len() {
        for j in (i + 1)..values.len() {
            if values[i].is_some() && values[i] == values[j] {
                conflicts += 1;
            }
        }
    }
    SimpleScore::of(-conflicts)
}

pub fn create_pair_descriptor() -> SolutionDescriptor<PairSolution> {
    SolutionDescriptor::new("PairSolution").with_entity(
        EntityDescriptor::new("Item", entity_count)
            .with_variable(VariableDescriptor::genuine("value"))
            .with_planning_id(|_, i| i as u64),
    )
}
