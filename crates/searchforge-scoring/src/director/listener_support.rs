//! Dispatch of variable listeners in topological order.
//!
//! Before-notifications reach the listeners of the changed variable
//! immediately. After-notifications are queued per listener (one entry per
//! entity) and flushed by [`VariableListenerSupport::trigger`]. Listeners are
//! kept in the topological order computed by
//! [`SolutionDescriptor::validate`], so a single pass over the queue reaches
//! a fixpoint: a listener can only enqueue work for listeners after it.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use searchforge_core::domain::{
    EntityReference, ShadowContext, ShadowDependency, SolutionDescriptor, VariableKey,
    VariableListener,
};
use searchforge_core::{Result, SearchForgeError};
use tracing::debug;

/// Receives entity-level change notifications for score bookkeeping.
///
/// Incremental directors retract and re-insert the entity; the simple
/// director only marks its score dirty.
pub trait EntityChangeSink<S> {
    fn before_entity_changed(&mut self, solution: &S, entity: EntityReference);

    fn after_entity_changed(&mut self, solution: &S, entity: EntityReference);
}

/// Builds the listener for one shadow variable.
///
/// Registrations are cheap to clone so a director factory can hand fresh
/// listeners to every director it builds.
pub struct ListenerRegistration<S> {
    pub entity: &'static str,
    pub variable: &'static str,
    build: Arc<dyn Fn() -> Box<dyn VariableListener<S>> + Send + Sync>,
}

impl<S> ListenerRegistration<S> {
    pub fn new<F>(entity: &'static str, variable: &'static str, build: F) -> Self
    where
        F: Fn() -> Box<dyn VariableListener<S>> + Send + Sync + 'static,
    {
        Self {
            entity,
            variable,
            build: Arc::new(build),
        }
    }
}

impl<S> Clone for ListenerRegistration<S> {
    fn clone(&self) -> Self {
        Self {
            entity: self.entity,
            variable: self.variable,
            build: Arc::clone(&self.build),
        }
    }
}

impl<S> fmt::Debug for ListenerRegistration<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListenerRegistration({}.{})", self.entity, self.variable)
    }
}

struct ListenerSlot<S> {
    dependency: ShadowDependency,
    listener: Box<dyn VariableListener<S>>,
    pending: Vec<EntityReference>,
    pending_set: HashSet<EntityReference>,
}

impl<S> ListenerSlot<S> {
    fn listens_to(&self, key: &VariableKey) -> bool {
        self.dependency.sources.contains(key)
    }

    fn enqueue(&mut self, entity: EntityReference) {
        if self.pending_set.insert(entity) {
            self.pending.push(entity);
        }
    }
}

/// Owns the variable listeners of one score director.
pub struct VariableListenerSupport<S> {
    slots: Vec<ListenerSlot<S>>,
}

impl<S> Default for VariableListenerSupport<S> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<S> VariableListenerSupport<S> {
    /// Validates the shadow wiring and instantiates one listener per shadow variable.
    pub fn build(
        descriptor: &SolutionDescriptor<S>,
        registrations: &[ListenerRegistration<S>],
    ) -> Result<Self> {
        let order = descriptor.validate()?;
        let mut resolved = Vec::with_capacity(registrations.len());
        for registration in registrations {
            let key = descriptor.variable_key(registration.entity, registration.variable)?;
            if !order.iter().any(|d| d.target == key) {
                return Err(SearchForgeError::DomainModel(format!(
                    "listener registered for '{}.{}' which is not a shadow variable",
                    registration.entity, registration.variable
                )));
            }
            resolved.push((key, registration));
        }

        let mut slots = Vec::with_capacity(order.len());
        for dependency in order {
            let registration = resolved
                .iter()
                .find(|(key, _)| *key == dependency.target)
                .map(|(_, registration)| *registration)
                .ok_or_else(|| {
                    SearchForgeError::DomainModel(format!(
                        "no variable listener registered for shadow variable {}",
                        dependency.target
                    ))
                })?;
            slots.push(ListenerSlot {
                dependency,
                listener: (registration.build)(),
                pending: Vec::new(),
                pending_set: HashSet::new(),
            });
        }
        debug!(
            event = "variable_listeners_built",
            listener_count = slots.len(),
            order = ?slots
                .iter()
                .map(|slot| slot.dependency.target.to_string())
                .collect::<Vec<_>>(),
        );
        Ok(Self { slots })
    }

    pub fn listener_count(&self) -> usize {
        self.slots.len()
    }

    pub fn has_pending(&self) -> bool {
        self.slots.iter().any(|slot| !slot.pending.is_empty())
    }

    /// Notifies the score sink and the listeners of `key` that it is about to change.
    pub fn before_variable_changed(
        &mut self,
        solution: &mut S,
        sink: &mut dyn EntityChangeSink<S>,
        key: VariableKey,
        entity: EntityReference,
    ) -> Result<()> {
        sink.before_entity_changed(solution, entity);
        notify_before(&mut self.slots, solution, sink, key, entity)
    }

    /// Notifies the score sink and queues the listeners of `key`.
    pub fn after_variable_changed(
        &mut self,
        solution: &mut S,
        sink: &mut dyn EntityChangeSink<S>,
        key: VariableKey,
        entity: EntityReference,
    ) -> Result<()> {
        sink.after_entity_changed(solution, entity);
        notify_after(&mut self.slots, key, entity);
        Ok(())
    }

    /// Runs every queued after-notification in listener order.
    pub fn trigger(&mut self, solution: &mut S, sink: &mut dyn EntityChangeSink<S>) -> Result<()> {
        for i in 0..self.slots.len() {
            let (head, downstream) = self.slots.split_at_mut(i + 1);
            let slot = &mut head[i];
            let pending = std::mem::take(&mut slot.pending);
            slot.pending_set.clear();
            let target = slot.dependency.target;
            for entity in pending {
                let mut ctx = ListenerContext {
                    solution: &mut *solution,
                    sink: &mut *sink,
                    downstream: &mut *downstream,
                    target,
                };
                slot.listener.after_variable_changed(&mut ctx, entity)?;
            }
        }
        Ok(())
    }

    /// Recomputes every shadow variable in listener order and drops queued work.
    pub fn reset_working_solution(&mut self, solution: &mut S) {
        for slot in &mut self.slots {
            slot.pending.clear();
            slot.pending_set.clear();
            slot.listener.reset_working_solution(solution);
        }
    }

    /// Recomputes all shadow variables on a clone and compares them.
    pub fn assert_not_stale(&mut self, working: &S, context: &str) -> Result<()>
    where
        S: Clone,
    {
        let mut expected = working.clone();
        for slot in &mut self.slots {
            slot.listener.reset_working_solution(&mut expected);
        }
        for slot in &self.slots {
            if let Some(report) = slot.listener.find_stale(working, &expected) {
                return Err(SearchForgeError::ShadowVariableStale(format!(
                    "{}: shadow variable {} is stale: {}",
                    context, slot.dependency.target, report
                )));
            }
        }
        Ok(())
    }
}

impl<S> fmt::Debug for VariableListenerSupport<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let targets: Vec<String> = self
            .slots
            .iter()
            .map(|slot| slot.dependency.target.to_string())
            .collect();
        f.debug_struct("VariableListenerSupport")
            .field("listeners", &targets)
            .finish()
    }
}

fn notify_before<S>(
    slots: &mut [ListenerSlot<S>],
    solution: &mut S,
    sink: &mut dyn EntityChangeSink<S>,
    key: VariableKey,
    entity: EntityReference,
) -> Result<()> {
    for i in 0..slots.len() {
        if !slots[i].listens_to(&key) {
            continue;
        }
        let (head, downstream) = slots.split_at_mut(i + 1);
        let slot = &mut head[i];
        slot.enqueue(entity);
        let mut ctx = ListenerContext {
            solution: &mut *solution,
            sink: &mut *sink,
            downstream,
            target: slot.dependency.target,
        };
        slot.listener.before_variable_changed(&mut ctx, entity)?;
    }
    Ok(())
}

fn notify_after<S>(slots: &mut [ListenerSlot<S>], key: VariableKey, entity: EntityReference) {
    for slot in slots.iter_mut().filter(|slot| slot.listens_to(&key)) {
        slot.enqueue(entity);
    }
}

// The context handed to one listener: it may only write its own target, and
// its writes are forwarded to the score sink and the listeners after it.
struct ListenerContext<'a, S> {
    solution: &'a mut S,
    sink: &'a mut dyn EntityChangeSink<S>,
    downstream: &'a mut [ListenerSlot<S>],
    target: VariableKey,
}

impl<S> ListenerContext<'_, S> {
    fn check_target(&self, entity: EntityReference, variable_name: &'static str) -> Result<VariableKey> {
        let key = VariableKey::new(entity.descriptor_index, variable_name);
        if key == self.target {
            Ok(key)
        } else {
            Err(SearchForgeError::DomainModel(format!(
                "the listener of {} changed undeclared variable {}",
                self.target, key
            )))
        }
    }
}

impl<S> ShadowContext<S> for ListenerContext<'_, S> {
    fn working_solution(&self) -> &S {
        &*self.solution
    }

    fn working_solution_mut(&mut self) -> &mut S {
        &mut *self.solution
    }

    fn before_variable_changed(
        &mut self,
        entity: EntityReference,
        variable_name: &'static str,
    ) -> Result<()> {
        let key = self.check_target(entity, variable_name)?;
        self.sink.before_entity_changed(&*self.solution, entity);
        notify_before(
            &mut *self.downstream,
            &mut *self.solution,
            &mut *self.sink,
            key,
            entity,
        )
    }

    fn after_variable_changed(
        &mut self,
        entity: EntityReference,
        variable_name: &'static str,
    ) -> Result<()> {
        let key = self.check_target(entity, variable_name)?;
        self.sink.after_entity_changed(&*self.solution, entity);
        notify_after(&mut *self.downstream, key, entity);
        Ok(())
    }
}
