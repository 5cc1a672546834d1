//! Moves and the selectors that generate them.

pub mod r#move;
pub mod selector;

pub use r#move::{ChangeMove, CompositeMove, EitherMove, Move, SwapMove};
pub use selector::{Selector, SelectorEvent};
