//! Variable type definitions

/// The type of a planning variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    /// A genuine planning variable that the solver changes.
    Genuine,
    /// A chained planning variable where entities form chains rooted at anchors.
    Chained,
    /// A shadow variable computed from other variables by a listener.
    Shadow(ShadowVariableKind),
}

/// The kind of shadow variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadowVariableKind {
    /// Custom shadow variable with a user-defined listener.
    Custom,
    /// Inverse of a genuine or chained variable (the `next` of a `previous`).
    InverseRelation,
    /// Anchor at the root of a chained variable.
    Anchor,
}

impl VariableType {
    /// Returns true for genuine and chained variables.
    pub fn is_genuine(&self) -> bool {
        matches!(self, VariableType::Genuine | VariableType::Chained)
    }

    pub fn is_shadow(&self) -> bool {
        matches!(self, VariableType::Shadow(_))
    }

    pub fn is_chained(&self) -> bool {
        matches!(self, VariableType::Chained)
    }
}

/// Names a source variable by entity type name and variable name.
///
/// Resolved into a [`VariableKey`](super::VariableKey) during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceRef {
    pub entity: &'static str,
    pub variable: &'static str,
}
