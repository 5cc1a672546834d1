//! Move trait definition.

use std::fmt::Debug;

use searchforge_core::domain::{EntityReference, PlanningSolution};
use searchforge_core::Result;
use searchforge_scoring::ScoreDirector;
use smallvec::SmallVec;

/// A reversible edit of one or more planning variables.
///
/// Moves are cheap descriptions: building one never touches the solution.
/// All mutation happens in [`do_move`](Move::do_move), which brackets every
/// change with before/after notifications, runs the variable listeners and
/// returns the undo move.
///
/// # Implementation Notes
/// - `do_move` followed by `do_move` of the returned undo move must restore
///   every genuine variable, every shadow variable and the score
/// - A move that would change nothing is not doable
/// - The tabu methods give tabu acceptors something to remember
pub trait Move<S: PlanningSolution>: Send + Sync + Debug + Clone {
    /// Returns true if executing this move would change the working solution.
    fn is_doable(&self, score_director: &dyn ScoreDirector<S>) -> bool;

    /// Executes this move and returns the move that undoes it.
    fn do_move(&self, score_director: &mut dyn ScoreDirector<S>) -> Result<Self>;

    /// Returns the descriptor index of the entity type this move affects.
    fn descriptor_index(&self) -> usize;

    /// Returns the entity indices involved in this move.
    fn entity_indices(&self) -> &[usize];

    /// Returns the variable name this move affects.
    fn variable_name(&self) -> &str;

    /// Entities an entity tabu acceptor marks when this move is taken.
    fn tabu_entities(&self) -> SmallVec<[EntityReference; 2]> {
        self.entity_indices()
            .iter()
            .map(|&entity_index| EntityReference::new(self.descriptor_index(), entity_index))
            .collect()
    }

    /// Hashed planning values a value tabu acceptor marks when this move is taken.
    fn tabu_values(&self, score_director: &dyn ScoreDirector<S>) -> SmallVec<[u64; 2]>;

    /// Identity of this move: equal moves have equal keys.
    fn tabu_key(&self) -> u64;
}
