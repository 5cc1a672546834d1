//! Domain model for planning problems
//!
//! - `PlanningSolution`: the container for the complete problem and solution
//! - Descriptors: runtime metadata about entities and their variables,
//!   built once at solver-build time and validated for shadow wiring
//! - `VariableListener`: the contract that keeps shadow variables consistent

mod chain;
mod descriptor;
mod entity_ref;
pub mod listener;
mod traits;
mod variable;


pub use chain::ChainLink;
pub use descriptor::{EntityDescriptor, ShadowDependency, SolutionDescriptor, VariableDescriptor};
pub use entity_ref::{EntityReference, VariableKey};
pub use listener::{AnchorListener, InverseRelationListener, ShadowContext, VariableListener};
pub use traits::PlanningSolution;
pub use variable::{ShadowVariableKind, SourceRef, VariableType};
