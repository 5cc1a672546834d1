//! Selector decorators.
//!
//! Every decorator wraps a child [`Selector`](super::Selector) and is itself
//! a selector over the same item type, so they apply alike to entities,
//! values and moves.
//!
//! - [`CachingSelector`] - materializes the child once per cache scope
//! - [`FilteringSelector`] - drops items rejected by a predicate
//! - [`SortingSelector`] - sorts the materialized items
//! - [`ProbabilitySelector`] - draws items with replacement, weighted
//! - [`ShufflingSelector`] - shuffles the materialized items
//! - [`SelectedCountLimitSelector`] - stops a pass after a number of items

mod caching;
mod count_limit;
mod filtering;
mod probability;
mod shuffling;
mod sorting;


pub use caching::CachingSelector;
pub use count_limit::SelectedCountLimitSelector;
pub use filtering::FilteringSelector;
pub use probability::ProbabilitySelector;
pub use shuffling::ShufflingSelector;
pub use sorting::{weight_comparator, SortDirection, SortingSelector};
