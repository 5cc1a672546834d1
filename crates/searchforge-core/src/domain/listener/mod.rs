//! Variable listener infrastructure for shadow variable updates.
//!
//! A [`VariableListener`] is registered for one shadow variable and is
//! notified whenever one of that variable's source variables changes. It
//! writes the shadow variable through a [`ShadowContext`], which brackets the
//! write with before/after notifications so downstream listeners and the
//! score observe one consistent chain of changes.
//!
//! Built-in listeners:
//! - [`InverseRelationListener`]: maintains the `next` pointer of a chained `previous`
//! - [`AnchorListener`]: maintains the anchor at the root of a chain

mod anchor;
mod inverse;

#[cfg(test)]
mod tests;

pub use anchor::AnchorListener;
pub use inverse::InverseRelationListener;

use super::entity_ref::EntityReference;
use crate::error::Result;

/// Mediates shadow variable writes made by a listener.
///
/// Every write must be bracketed:
///
/// ```text
/// ctx.before_variable_changed(entity, "arrival_time")?;
/// ctx.working_solution_mut()...;
/// ctx.after_variable_changed(entity, "arrival_time")?;
/// ```
///
/// Writing a variable that the listener did not declare as its target is an
/// error.
pub trait ShadowContext<S> {
    fn working_solution(&self) -> &S;

    fn working_solution_mut(&mut self) -> &mut S;

    fn before_variable_changed(
        &mut self,
        entity: EntityReference,
        variable_name: &'static str,
    ) -> Result<()>;

    fn after_variable_changed(
        &mut self,
        entity: EntityReference,
        variable_name: &'static str,
    ) -> Result<()>;
}

/// A listener that keeps one shadow variable consistent with its sources.
///
/// # Implementation Notes
///
/// - Only modify the shadow variable this listener is registered for
/// - Never modify genuine variables or problem facts
/// - A single notification may update the shadow variable on many entities
///   (changing a chain link shifts the arrival time of every later visit)
/// - `reset_working_solution` must be a pure recomputation from the sources
pub trait VariableListener<S>: Send + Sync {
    /// Called before a source variable changes on `entity`.
    fn before_variable_changed(
        &mut self,
        _ctx: &mut dyn ShadowContext<S>,
        _entity: EntityReference,
    ) -> Result<()> {
        Ok(())
    }

    /// Called after a source variable changed on `entity`.
    fn after_variable_changed(
        &mut self,
        ctx: &mut dyn ShadowContext<S>,
        entity: EntityReference,
    ) -> Result<()>;

    /// Recomputes the shadow variable on every entity, without notifications.
    fn reset_working_solution(&mut self, solution: &mut S);

    /// Describes the first entity whose shadow value in `working` differs
    /// from the freshly recomputed `expected` solution.
    fn find_stale(&self, _working: &S, _expected: &S) -> Option<String> {
        None
    }
}
