//! Problem change trait for real-time planning.

use std::fmt::{self, Debug};
use std::marker::PhantomData;

use searchforge_core::domain::PlanningSolution;
use searchforge_core::Result;

use super::ProblemChangeDirector;

/// A change to the problem that can be applied during solving.
///
/// The change must route every mutation through the director it receives:
/// entity additions and removals, variable changes and fact changes all
/// notify the score director. Entity indices are unstable across changes,
/// so a change locates its entities by planning id with
/// [`ProblemChangeDirector::lookup_working_entity`].
///
/// ```
/// use searchforge_core::Result;
/// use searchforge_solver::realtime::{ProblemChange, ProblemChangeDirector};
/// use searchforge_test::PairSolution;
///
/// /// Appends an unassigned item.
/// #[derive(Debug)]
/// struct AddItem;
///
/// impl ProblemChange<PairSolution> for AddItem {
///     fn apply(&self, director: &mut ProblemChangeDirector<'_, PairSolution>) -> Result<()> {
///         director.add_entity(0, |solution| {
///             solution.values.push(None);
///             solution.values.len() - 1
///         })?;
///         Ok(())
///     }
/// }
/// ```
pub trait ProblemChange<S: PlanningSolution>: Send + Debug {
    /// Applies this change to the working solution at a step boundary.
    fn apply(&self, director: &mut ProblemChangeDirector<'_, S>) -> Result<()>;
}

/// A boxed problem change for type-erased storage.
pub type BoxedProblemChange<S> = Box<dyn ProblemChange<S>>;

/// A problem change implemented as a closure.
pub struct ClosureProblemChange<S, F> {
    name: &'static str,
    change_fn: F,
    _phantom: PhantomData<fn() -> S>,
}

impl<S, F> ClosureProblemChange<S, F>
where
    S: PlanningSolution,
    F: for<'a> Fn(&mut ProblemChangeDirector<'a, S>) -> Result<()> + Send,
{
    /// `name` only shows up in logs.
    pub fn new(name: &'static str, change_fn: F) -> Self {
        Self {
            name,
            change_fn,
            _phantom: PhantomData,
        }
    }
}

impl<S, F> Debug for ClosureProblemChange<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureProblemChange")
            .field("name", &self.name)
            .finish()
    }
}

impl<S, F> ProblemChange<S> for ClosureProblemChange<S, F>
where
    S: PlanningSolution,
    F: for<'a> Fn(&mut ProblemChangeDirector<'a, S>) -> Result<()> + Send,
{
    fn apply(&self, director: &mut ProblemChangeDirector<'_, S>) -> Result<()> {
        (self.change_fn)(director)
    }
}
