//! Shared test fixtures for SearchForge crates.
//!
//! This crate provides data types, descriptors and pure score functions for
//! testing. It depends on `searchforge-core` only, so every other crate can
//! use it as a dev-dependency without pulling in a second copy of itself.
//!
//! - [`pair`] - Two entities over `{1, 2, 3}`, penalized when they share a value
//! - [`nqueens`] - N-Queens data types and conflict calculation
//! - [`task`] - Task priorities, used for sorting and probability tests
//! - [`tour`] - A chained tour with `next`, `vehicle` and `arrival` shadow variables
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! searchforge-test = { workspace = true }
//! ```

pub mod nqueens;
pub mod pair;
pub mod task;
pub mod tour;

pub use nqueens::{NQueensSolution, Queen};
pub use pair::PairSolution;
pub use task::{Task, TaskSolution};
pub use tour::{TourSolution, Vehicle, Visit};
