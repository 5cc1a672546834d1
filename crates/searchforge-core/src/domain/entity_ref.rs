//! Index-based references to entities and their variables.

use std::fmt;

/// Identifies one entity in the working solution.
///
/// Entities are addressed by the index of their entity descriptor and their
/// position in the corresponding collection. References stay valid until a
/// problem change adds or removes entities of that descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityReference {
    pub descriptor_index: usize,
    pub entity_index: usize,
}

impl EntityReference {
    #[inline]
    pub const fn new(descriptor_index: usize, entity_index: usize) -> Self {
        Self {
            descriptor_index,
            entity_index,
        }
    }
}

impl fmt::Display for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}[{}]", self.descriptor_index, self.entity_index)
    }
}

/// Identifies one variable declared on an entity descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableKey {
    pub descriptor_index: usize,
    pub variable_name: &'static str,
}

impl VariableKey {
    #[inline]
    pub const fn new(descriptor_index: usize, variable_name: &'static str) -> Self {
        Self {
            descriptor_index,
            variable_name,
        }
    }
}

impl fmt::Display for VariableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.descriptor_index, self.variable_name)
    }
}
