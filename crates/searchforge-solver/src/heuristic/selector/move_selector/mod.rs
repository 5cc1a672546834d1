//! Move selectors.
//!
//! Move selectors combine entity and value selectors into moves. They are
//! [`Selector`](super::Selector)s like any other, so the decorators and the
//! selected-count limit apply to them too.

mod cartesian;
mod change;
mod swap;
mod union;

#[cfg(test)]
mod tests;

pub use cartesian::CartesianProductMoveSelector;
pub use change::ChangeMoveSelector;
pub use swap::SwapMoveSelector;
pub use union::{IntoMoveSelector, UnionMoveSelector};
