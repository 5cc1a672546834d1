//! Selectors for entities, values and moves.
//!
//! Everything here is a restartable cursor driven by the local search phase:
//! entity and value selectors feed move selectors, decorators wrap any of
//! them, and every selector receives the solver's lifecycle events.

pub mod decorator;
pub mod move_selector;
pub mod nearby;

mod cache;
mod entity;
mod mimic;
mod selection_order;
mod traits;
mod value;

#[cfg(test)]
mod tests;

pub use cache::SelectionCacheType;
pub use entity::FromSolutionEntitySelector;
pub use mimic::{MimicRecorder, MimicRecordingSelector, MimicRegistry, MimicReplayingSelector};
pub use move_selector::{
    CartesianProductMoveSelector, ChangeMoveSelector, IntoMoveSelector, SwapMoveSelector,
    UnionMoveSelector,
};
pub use selection_order::SelectionOrder;
pub use traits::{Selector, SelectorEvent};
pub use value::{
    EntityIndependentValueSelector, EntityValueRangeSelector, FromSolutionValueSelector,
    StaticValueSelector, ValueSelector,
};
