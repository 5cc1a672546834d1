// Incremental constraints and tuple constraint sets.
//
// The incremental protocol:
//
// 1. `initialize` once to populate internal state from the whole solution
// 2. Before an entity changes: `on_retract` removes its stored contribution
// 3. After the change: `on_insert` computes and stores its new contribution
//
// Each call returns the score delta, so the director never re-evaluates the
// whole solution during solving.

mod pair;
mod uni;

#[cfg(test)]
mod tests;

pub use pair::PairConflictConstraint;
pub use uni::UniConstraint;

use searchforge_core::score::Score;
use searchforge_core::ConstraintRef;

use crate::analysis::{ConstraintMatch, ConstraintMatchTotal};

// A single constraint with incremental scoring capability.
pub trait IncrementalConstraint<S, Sc: Score>: Send + Sync {
    fn constraint_ref(&self) -> &ConstraintRef;

    // Score impact of one unit match, with the penalty/reward sign applied.
    fn weight(&self) -> Sc;

    // Full evaluation from scratch, ignoring incremental state.
    fn evaluate(&self, solution: &S) -> Sc;

    fn match_count(&self, solution: &S) -> usize;

    // Populates internal state by inserting all entities; returns the total.
    fn initialize(&mut self, solution: &S) -> Sc;

    // Called after an entity changed; returns the score delta.
    fn on_insert(&mut self, solution: &S, entity_index: usize, descriptor_index: usize) -> Sc;

    // Called before an entity changes; returns the score delta.
    fn on_retract(&mut self, solution: &S, entity_index: usize, descriptor_index: usize) -> Sc;

    fn reset(&mut self);

    // Every match with the entities that justify it.
    fn get_matches(&self, solution: &S) -> Vec<ConstraintMatch<Sc>>;
}

// A set of constraints evaluated together.
//
// Implemented for tuples of `IncrementalConstraint`, so the whole set is
// monomorphized with no virtual dispatch.
pub trait ConstraintSet<S, Sc: Score>: Send + Sync {
    fn evaluate_all(&self, solution: &S) -> Sc;

    fn constraint_count(&self) -> usize;

    fn initialize_all(&mut self, solution: &S) -> Sc;

    fn on_insert_all(&mut self, solution: &S, entity_index: usize, descriptor_index: usize) -> Sc;

    fn on_retract_all(&mut self, solution: &S, entity_index: usize, descriptor_index: usize) -> Sc;

    fn reset_all(&mut self);

    fn constraint_refs(&self) -> Vec<ConstraintRef>;

    fn match_totals(&self, solution: &S) -> Vec<ConstraintMatchTotal<Sc>>;
}

impl<S: Send + Sync, Sc: Score> ConstraintSet<S, Sc> for () {
    fn evaluate_all(&self, _solution: &S) -> Sc {
        Sc::zero()
    }

    fn constraint_count(&self) -> usize {
        0
    }

    fn initialize_all(&mut self, _solution: &S) -> Sc {
        Sc::zero()
    }

    fn on_insert_all(&mut self, _solution: &S, _entity_index: usize, _descriptor_index: usize) -> Sc {
        Sc::zero()
    }

    fn on_retract_all(&mut self, _solution: &S, _entity_index: usize, _descriptor_index: usize) -> Sc {
        Sc::zero()
    }

    fn reset_all(&mut self) {}

    fn constraint_refs(&self) -> Vec<ConstraintRef> {
        Vec::new()
    }

    fn match_totals(&self, _solution: &S) -> Vec<ConstraintMatchTotal<Sc>> {
        Vec::new()
    }
}

macro_rules! impl_constraint_set_for_tuple {
    ($($idx:tt: $T:ident),+) => {
        impl<S, Sc, $($T),+> ConstraintSet<S, Sc> for ($($T,)+)
        where
            S: Send + Sync,
            Sc: Score,
            $($T: IncrementalConstraint<S, Sc>,)+
        {
            #[inline]
            fn evaluate_all(&self, solution: &S) -> Sc {
                let mut total = Sc::zero();
                $(total = total + self.$idx.evaluate(solution);)+
                total
            }

            #[inline]
            fn constraint_count(&self) -> usize {
                let mut count = 0;
                $(let _ = &self.$idx; count += 1;)+
                count
            }

            #[inline]
            fn initialize_all(&mut self, solution: &S) -> Sc {
                let mut total = Sc::zero();
                $(total = total + self.$idx.initialize(solution);)+
                total
            }

            #[inline]
            fn on_insert_all(&mut self, solution: &S, entity_index: usize, descriptor_index: usize) -> Sc {
                let mut total = Sc::zero();
                $(total = total + self.$idx.on_insert(solution, entity_index, descriptor_index);)+
                total
            }

            #[inline]
            fn on_retract_all(&mut self, solution: &S, entity_index: usize, descriptor_index: usize) -> Sc {
                let mut total = Sc::zero();
                $(total = total + self.$idx.on_retract(solution, entity_index, descriptor_index);)+
                total
            }

            #[inline]
            fn reset_all(&mut self) {
                $(self.$idx.reset();)+
            }

            fn constraint_refs(&self) -> Vec<ConstraintRef> {
                vec![$(self.$idx.constraint_ref().clone()),+]
            }

            fn match_totals(&self, solution: &S) -> Vec<ConstraintMatchTotal<Sc>> {
                vec![$(ConstraintMatchTotal::new(
                    self.$idx.constraint_ref().clone(),
                    self.$idx.weight(),
                    self.$idx.get_matches(solution),
                )),+]
            }
        }
    };
}

impl_constraint_set_for_tuple!(0: C0);
impl_constraint_set_for_tuple!(0: C0, 1: C1);
impl_constraint_set_for_tuple!(0: C0, 1: C1, 2: C2);
impl_constraint_set_for_tuple!(0: C0, 1: C1, 2: C2, 3: C3);
impl_constraint_set_for_tuple!(0: C0, 1: C1, 2: C2, 3: C3, 4: C4);
impl_constraint_set_for_tuple!(0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5);
impl_constraint_set_for_tuple!(0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6);
impl_constraint_set_for_tuple!(0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6, 7: C7);
