//! Anchor listener for chained variables.

use std::fmt;

use crate::domain::chain::ChainLink;
use crate::domain::entity_ref::EntityReference;
use crate::error::{Result, SearchForgeError};

use super::{ShadowContext, VariableListener};

/// Maintains the anchor of every entity in a chain.
///
/// When a link changes, the new anchor is written on the changed entity and
/// then on every later entity of its chain until one already carries it.
pub struct AnchorListener<S> {
    descriptor_index: usize,
    variable_name: &'static str,
    entity_count: fn(&S) -> usize,
    previous: fn(&S, usize) -> Option<ChainLink>,
    anchor: fn(&S, usize) -> Option<usize>,
    set_anchor: fn(&mut S, usize, Option<usize>),
}

impl<S> AnchorListener<S> {
    pub fn new(
        descriptor_index: usize,
        variable_name: &'static str,
        entity_count: fn(&S) -> usize,
        previous: fn(&S, usize) -> Option<ChainLink>,
        anchor: fn(&S, usize) -> Option<usize>,
        set_anchor: fn(&mut S, usize, Option<usize>),
    ) -> Self {
        Self {
            descriptor_index,
            variable_name,
            entity_count,
            previous,
            anchor,
            set_anchor,
        }
    }

    /// Follows `previous` links back to the anchor.
    fn resolve_anchor(&self, solution: &S, entity_index: usize) -> Result<Option<usize>> {
        let limit = (self.entity_count)(solution);
        let mut current = entity_index;
        for _ in 0..=limit {
            match (self.previous)(solution, current) {
                None => return Ok(None),
                Some(ChainLink::Anchor(anchor)) => return Ok(Some(anchor)),
                Some(ChainLink::Entity(previous)) => current = previous,
            }
        }
        Err(SearchForgeError::DomainModel(format!(
            "chain through {} does not end in an anchor",
            EntityReference::new(self.descriptor_index, entity_index)
        )))
    }

    fn successor(&self, solution: &S, entity_index: usize) -> Option<usize> {
        (0..(self.entity_count)(solution))
            .find(|&i| (self.previous)(solution, i) == Some(ChainLink::Entity(entity_index)))
    }
}

impl<S: Send + Sync> VariableListener<S> for AnchorListener<S> {
    fn after_variable_changed(
        &mut self,
        ctx: &mut dyn ShadowContext<S>,
        entity: EntityReference,
    ) -> Result<()> {
        let anchor = self.resolve_anchor(ctx.working_solution(), entity.entity_index)?;
        let mut current = Some(entity.entity_index);
        let mut remaining = (self.entity_count)(ctx.working_solution());
        while let Some(index) = current {
            if (self.anchor)(ctx.working_solution(), index) == anchor || remaining == 0 {
                break;
            }
            let reference = EntityReference::new(self.descriptor_index, index);
            ctx.before_variable_changed(reference, self.variable_name)?;
            (self.set_anchor)(ctx.working_solution_mut(), index, anchor);
            ctx.after_variable_changed(reference, self.variable_name)?;
            current = self.successor(ctx.working_solution(), index);
            remaining -= 1;
        }
        Ok(())
    }

    fn reset_working_solution(&mut self, solution: &mut S) {
        for i in 0..(self.entity_count)(solution) {
            let anchor = self.resolve_anchor(solution, i).ok().flatten();
            (self.set_anchor)(solution, i, anchor);
        }
    }

    fn find_stale(&self, working: &S, expected: &S) -> Option<String> {
        (0..(self.entity_count)(expected)).find_map(|i| {
            let actual = (self.anchor)(working, i);
            let wanted = (self.anchor)(expected, i);
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

impl<S> fmt::Debug for AnchorListener<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnchorListener")
            .field("descriptor_index", &self.descriptor_index)
            .field("variable_name", &self.variable_name)
            .finish()
    }
}
