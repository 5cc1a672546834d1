//! Inverse relation listener for chained variables.

use std::fmt;

use crate::domain::chain::ChainLink;
use crate::domain::entity_ref::EntityReference;
use crate::error::Result;

use super::{ShadowContext, VariableListener};

/// Maintains `next` on the entity a chained `previous` variable points at.
///
/// Only entity-to-entity links have an inverse; anchors are facts and are
/// not tracked.
pub struct InverseRelationListener<S> {
    descriptor_index: usize,
    variable_name: &'static str,
    entity_count: fn(&S) -> usize,
    previous: fn(&S, usize) -> Option<ChainLink>,
    next: fn(&S, usize) -> Option<usize>,
    set_next: fn(&mut S, usize, Option<usize>),
}

impl<S> InverseRelationListener<S> {
    /// Creates a listener writing `variable_name` on entities of `descriptor_index`.
    pub fn new(
        descriptor_index: usize,
        variable_name: &'static str,
        entity_count: fn(&S) -> usize,
        previous: fn(&S, usize) -> Option<ChainLink>,
        next: fn(&S, usize) -> Option<usize>,
        set_next: fn(&mut S, usize, Option<usize>),
    ) -> Self {
        Self {
            descriptor_index,
            variable_name,
            entity_count,
            previous,
            next,
            set_next,
        }
    }

    fn write_next(
        &self,
        ctx: &mut dyn ShadowContext<S>,
        owner: usize,
        value: Option<usize>,
    ) -> Result<()> {
        let owner_ref = EntityReference::new(self.descriptor_index, owner);
        ctx.before_variable_changed(owner_ref, self.variable_name)?;
        (self.set_next)(ctx.working_solution_mut(), owner, value);
        ctx.after_variable_changed(owner_ref, self.variable_name)
    }
}

impl<S: Send + Sync> VariableListener<S> for InverseRelationListener<S> {
    fn before_variable_changed(
        &mut self,
        ctx: &mut dyn ShadowContext<S>,
        entity: EntityReference,
    ) -> Result<()> {
        let solution = ctx.working_solution();
        let Some(previous) = (self.previous)(solution, entity.entity_index).and_then(ChainLink::entity)
        else {
            return Ok(());
        };
        if (self.next)(solution, previous) == Some(entity.entity_index) {
            self.write_next(ctx, previous, None)?;
        }
        Ok(())
    }

    fn after_variable_changed(
        &mut self,
        ctx: &mut dyn ShadowContext<S>,
        entity: EntityReference,
    ) -> Result<()> {
        let solution = ctx.working_solution();
        let Some(previous) = (self.previous)(solution, entity.entity_index).and_then(ChainLink::entity)
        else {
            return Ok(());
        };
        if (self.next)(solution, previous) != Some(entity.entity_index) {
            self.write_next(ctx, previous, Some(entity.entity_index))?;
        }
        Ok(())
    }

    fn reset_working_solution(&mut self, solution: &mut S) {
        let count = (self.entity_count)(solution);
        for i in 0..count {
            (self.set_next)(solution, i, None);
        }
        for i in 0..count {
            if let Some(previous) = (self.previous)(solution, i).and_then(ChainLink::entity) {
                (self.set_next)(solution, previous, Some(i));
            }
        }
    }

    fn find_stale(&self, working: &S, expected: &S) -> Option<String> {
        (0..(self.entity_count)(expected)).find_map(|i| {
            let actual = (self.next)(working, i);
            let wanted = (self.next)(expected, i);
            (actual != wanted).then(|| {
                format!(
                    "{} of {} is {:?} but should be {:?}",
                    self.variable_name,
                    EntityReference::new(self.descriptor_index, i),
                    actual,
                    wanted
                )
            })
        })
    }
}

impl<S> fmt::Debug for InverseRelationListener<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InverseRelationListener")
            .field("descriptor_index", &self.descriptor_index)
            .field("variable_name", &self.variable_name)
            .finish()
    }
}
