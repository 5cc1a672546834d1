//! SearchForge Core - Core types and traits for local search
//!
//! This crate provides the fundamental abstractions for SearchForge:
//! - Score types for representing solution quality
//! - Domain traits and descriptors for defining planning problems
//! - The variable listener contract for shadow variables
//! - Constraint identification types
//! - The shared error type

pub mod constraint;
pub mod domain;
pub mod error;
pub mod score;

pub use constraint::{ConstraintRef, ImpactType};
pub use domain::{
    EntityDescriptor, EntityReference, PlanningSolution, ShadowContext, ShadowVariableKind,
    SolutionDescriptor, VariableDescriptor, VariableKey, VariableListener, VariableType,
};
pub use error::{Result, SearchForgeError};
pub use score::{
    HardMediumSoftScore, HardSoftScore, ParseableScore, Score, ScoreLevel, ScoreParseError,
    SimpleScore,
};
