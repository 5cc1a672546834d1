//! Runtime descriptors for solutions, entities and variables.

use std::collections::HashMap;
use std::fmt;

use super::entity_ref::VariableKey;
use super::variable::{ShadowVariableKind, SourceRef, VariableType};
use crate::error::{Result, SearchForgeError};

/// Describes a planning variable at runtime.
#[derive(Debug, Clone)]
pub struct VariableDescriptor {
    /// Name of the variable (field name).
    pub name: &'static str,
    /// Type of the variable.
    pub variable_type: VariableType,
    /// Whether the variable can be unassigned.
    pub allows_unassigned: bool,
    /// For shadow variables: the variables it is computed from.
    pub sources: Vec<SourceRef>,
}

impl VariableDescriptor {
    /// Creates a genuine variable descriptor.
    pub fn genuine(name: &'static str) -> Self {
        VariableDescriptor {
            name,
            variable_type: VariableType::Genuine,
            allows_unassigned: false,
            sources: Vec::new(),
        }
    }

    /// Creates a chained variable descriptor.
    pub fn chained(name: &'static str) -> Self {
        VariableDescriptor {
            name,
            variable_type: VariableType::Chained,
            allows_unassigned: false,
            sources: Vec::new(),
        }
    }

    /// Creates a custom shadow variable descriptor; add sources with [`with_source`](Self::with_source).
    pub fn shadow(name: &'static str) -> Self {
        VariableDescriptor {
            name,
            variable_type: VariableType::Shadow(ShadowVariableKind::Custom),
            allows_unassigned: true,
            sources: Vec::new(),
        }
    }

    /// Creates the inverse of `mapped_by` declared on `entity`.
    pub fn inverse_relation(
        name: &'static str,
        entity: &'static str,
        mapped_by: &'static str,
    ) -> Self {
        VariableDescriptor {
            name,
            variable_type: VariableType::Shadow(ShadowVariableKind::InverseRelation),
            allows_unassigned: true,
            sources: vec![SourceRef {
                entity,
                variable: mapped_by,
            }],
        }
    }

    /// Creates the anchor shadow of the chained variable `chained` declared on `entity`.
    pub fn anchor(name: &'static str, entity: &'static str, chained: &'static str) -> Self {
        VariableDescriptor {
            name,
            variable_type: VariableType::Shadow(ShadowVariableKind::Anchor),
            allows_unassigned: true,
            sources: vec![SourceRef {
                entity,
                variable: chained,
            }],
        }
    }

    /// Adds a source variable for a custom shadow variable.
    pub fn with_source(mut self, entity: &'static str, variable: &'static str) -> Self {
        self.sources.push(SourceRef { entity, variable });
        self
    }

    pub fn with_allows_unassigned(mut self, allows: bool) -> Self {
        self.allows_unassigned = allows;
        self
    }
}

/// Describes a planning entity collection at runtime.
pub struct EntityDescriptor<S> {
    /// Name of the entity type.
    pub type_name: &'static str,
    /// Variable descriptors for this entity.
    pub variable_descriptors: Vec<VariableDescriptor>,
    entity_count: fn(&S) -> usize,
    planning_id: Option<fn(&S, usize) -> u64>,
}

impl<S> EntityDescriptor<S> {
    /// Creates a descriptor for the entity collection counted by `entity_count`.
    pub fn new(type_name: &'static str, entity_count: fn(&S) -> usize) -> Self {
        EntityDescriptor {
            type_name,
            variable_descriptors: Vec::new(),
            entity_count,
            planning_id: None,
        }
    }

    pub fn with_variable(mut self, descriptor: VariableDescriptor) -> Self {
        self.variable_descriptors.push(descriptor);
        self
    }

    /// Sets the planning id extractor used for lookups by identity.
    pub fn with_planning_id(mut self, planning_id: fn(&S, usize) -> u64) -> Self {
        self.planning_id = Some(planning_id);
        self
    }

    /// Returns the number of entities in the solution.
    pub fn entity_count(&self, solution: &S) -> usize {
        (self.entity_count)(solution)
    }

    /// Returns the planning id of an entity, if the descriptor has one.
    pub fn planning_id(&self, solution: &S, entity_index: usize) -> Option<u64> {
        self.planning_id.map(|id| id(solution, entity_index))
    }

    /// Finds the index of the entity with the given planning id.
    pub fn find_by_planning_id(&self, solution: &S, planning_id: u64) -> Option<usize> {
        let id = self.planning_id?;
        (0..self.entity_count(solution)).find(|&i| id(solution, i) == planning_id)
    }

    pub fn find_variable(&self, name: &str) -> Option<&VariableDescriptor> {
        self.variable_descriptors.iter().find(|v| v.name == name)
    }

    pub fn genuine_variable_descriptors(&self) -> impl Iterator<Item = &VariableDescriptor> {
        self.variable_descriptors
            .iter()
            .filter(|v| v.variable_type.is_genuine())
    }

    pub fn shadow_variable_descriptors(&self) -> impl Iterator<Item = &VariableDescriptor> {
        self.variable_descriptors
            .iter()
            .filter(|v| v.variable_type.is_shadow())
    }
}

impl<S> Clone for EntityDescriptor<S> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name,
            variable_descriptors: self.variable_descriptors.clone(),
            entity_count: self.entity_count,
            planning_id: self.planning_id,
        }
    }
}

impl<S> fmt::Debug for EntityDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("type_name", &self.type_name)
            .field("variables", &self.variable_descriptors)
            .field("has_planning_id", &self.planning_id.is_some())
            .finish()
    }
}

/// A shadow variable together with the variables it is computed from.
///
/// Produced by [`SolutionDescriptor::validate`] in listener execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowDependency {
    pub target: VariableKey,
    pub kind: ShadowVariableKind,
    pub sources: Vec<VariableKey>,
}

/// Describes a planning solution at runtime.
///
/// This is the explicit registry of entity collections and variables,
/// constructed once when the solver is built and passed to the score
/// director. [`validate`](Self::validate) checks the shadow variable wiring
/// and yields the order in which variable listeners must run.
pub struct SolutionDescriptor<S> {
    /// Name of the solution type.
    pub type_name: &'static str,
    /// Descriptors for all entity collections.
    pub entity_descriptors: Vec<EntityDescriptor<S>>,
}

impl<S> SolutionDescriptor<S> {
    pub fn new(type_name: &'static str) -> Self {
        SolutionDescriptor {
            type_name,
            entity_descriptors: Vec::new(),
        }
    }

    pub fn with_entity(mut self, descriptor: EntityDescriptor<S>) -> Self {
        self.entity_descriptors.push(descriptor);
        self
    }

    pub fn entity_descriptor(&self, descriptor_index: usize) -> Option<&EntityDescriptor<S>> {
        self.entity_descriptors.get(descriptor_index)
    }

    /// Finds the index of an entity descriptor by type name.
    pub fn find_entity_descriptor(&self, type_name: &str) -> Option<usize> {
        self.entity_descriptors
            .iter()
            .position(|d| d.type_name == type_name)
    }

    /// Returns the number of entities of one descriptor, or 0 for an unknown descriptor.
    pub fn entity_count(&self, solution: &S, descriptor_index: usize) -> usize {
        self.entity_descriptors
            .get(descriptor_index)
            .map_or(0, |d| d.entity_count(solution))
    }

    /// Returns the total number of entities across all collections.
    pub fn total_entity_count(&self, solution: &S) -> usize {
        self.entity_descriptors
            .iter()
            .map(|d| d.entity_count(solution))
            .sum()
    }

    /// Looks up a working entity by planning id.
    pub fn lookup_entity(
        &self,
        solution: &S,
        descriptor_index: usize,
        planning_id: u64,
    ) -> Option<usize> {
        self.entity_descriptors
            .get(descriptor_index)?
            .find_by_planning_id(solution, planning_id)
    }

    /// Resolves an entity type name and variable name into a key.
    pub fn variable_key(&self, entity: &str, variable: &str) -> Result<VariableKey> {
        let descriptor_index = self.find_entity_descriptor(entity).ok_or_else(|| {
            SearchForgeError::DomainModel(format!(
                "entity '{}' is not declared on solution '{}'",
                entity, self.type_name
            ))
        })?;
        let descriptor = self.find_variable_descriptor(descriptor_index, variable)?;
        Ok(VariableKey::new(descriptor_index, descriptor.name))
    }

    fn find_variable_descriptor(
        &self,
        descriptor_index: usize,
        variable: &str,
    ) -> Result<&VariableDescriptor> {
        let entity = &self.entity_descriptors[descriptor_index];
        entity.find_variable(variable).ok_or_else(|| {
            SearchForgeError::DomainModel(format!(
                "variable '{}' is not declared on entity '{}'",
                variable, entity.type_name
            ))
        })
    }

    /// Validates the shadow variable wiring.
    ///
    /// Checks that every source exists, that inverse relations map a genuine
    /// variable, that anchors map a chained variable, and that the shadow
    /// variables form no cycle. Returns the shadow variables in topological
    /// order: every shadow variable comes after the shadow variables it reads.
    pub fn validate(&self) -> Result<Vec<ShadowDependency>> {
        let mut nodes = Vec::new();
        for (descriptor_index, entity) in self.entity_descriptors.iter().enumerate() {
            for variable in entity.shadow_variable_descriptors() {
                let VariableType::Shadow(kind) = variable.variable_type else {
                    continue;
                };
                if variable.sources.is_empty() {
                    return Err(SearchForgeError::DomainModel(format!(
                        "shadow variable '{}.{}' has no source variable",
                        entity.type_name, variable.name
                    )));
                }
                let mut sources = Vec::with_capacity(variable.sources.len());
                for source in &variable.sources {
                    let key = self.variable_key(source.entity, source.variable)?;
                    let source_descriptor =
                        self.find_variable_descriptor(key.descriptor_index, key.variable_name)?;
                    let valid = match kind {
                        ShadowVariableKind::Custom => true,
                        ShadowVariableKind::InverseRelation => {
                            source_descriptor.variable_type.is_genuine()
                        }
                        ShadowVariableKind::Anchor => source_descriptor.variable_type.is_chained(),
                    };
                    if !valid {
                        return Err(SearchForgeError::DomainModel(format!(
                            "{:?} shadow variable '{}.{}' maps to '{}.{}' which is a {:?} variable",
                            kind,
                            entity.type_name,
                            variable.name,
                            source.entity,
                            source.variable,
                            source_descriptor.variable_type
                        )));
                    }
                    sources.push(key);
                }
                nodes.push(ShadowDependency {
                    target: VariableKey::new(descriptor_index, variable.name),
                    kind,
                    sources,
                });
            }
        }
        topological_order(nodes)
    }
}

// Kahn's algorithm, always releasing the lowest declared node first so the
// order is stable across runs.
fn topological_order(nodes: Vec<ShadowDependency>) -> Result<Vec<ShadowDependency>> {
    let index_of: HashMap<VariableKey, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.target, i))
        .collect();

    let mut in_degree = vec![0usize; nodes.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (i, node) in nodes.iter().enumerate() {
        for source in &node.sources {
            if let Some(&upstream) = index_of.get(source) {
                in_degree[i] += 1;
                dependents[upstream].push(i);
            }
        }
    }

    let mut ready: Vec<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(nodes.len());
    while !ready.is_empty() {
        ready.sort_unstable_by(|a, b| b.cmp(a));
        let Some(next) = ready.pop() else { break };
        order.push(next);
        for &dependent in &dependents[next] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push(dependent);
            }
        }
    }

    if order.len() != nodes.len() {
        let cyclic: Vec<String> = (0..nodes.len())
            .filter(|&i| in_degree[i] > 0)
            .map(|i| nodes[i].target.to_string())
            .collect();
        return Err(SearchForgeError::DomainModel(format!(
            "shadow variables form a cycle: {}",
            cyclic.join(", ")
        )));
    }

    let mut slots: Vec<Option<ShadowDependency>> = nodes.into_iter().map(Some).collect();
    Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
}

impl<S> Clone for SolutionDescriptor<S> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name,
            entity_descriptors: self.entity_descriptors.clone(),
        }
    }
}

impl<S> fmt::Debug for SolutionDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolutionDescriptor")
            .field("type_name", &self.type_name)
            .field("entities", &self.entity_descriptors.len())
            .finish()
    }
}
