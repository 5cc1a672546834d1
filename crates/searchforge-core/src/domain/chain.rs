//! Chained variable values.

/// The value of a chained planning variable.
///
/// A chained entity points either at an anchor (a problem fact that roots
/// the chain) or at another entity of the same descriptor:
/// `Anchor <- Entity1 <- Entity2 <- Entity3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainLink {
    /// Index of the anchor fact.
    Anchor(usize),
    /// Index of the preceding entity.
    Entity(usize),
}

impl ChainLink {
    /// Returns the preceding entity index, if the link points at an entity.
    pub fn entity(self) -> Option<usize> {
        match self {
            ChainLink::Entity(index) => Some(index),
            ChainLink::Anchor(_) => None,
        }
    }
}
