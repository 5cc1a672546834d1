//! SearchForge - local search for planning problems in Rust
//!
//! Describe the planning variables with [`VariableAccess`], pick a score
//! director factory, load a [`SolverConfig`] and let a [`SolverFactory`]
//! build and run the solver.
//!
//! # Example
//!
//! ```
//! use searchforge::prelude::*;
//! use searchforge_test::pair::{self, PairSolution};
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     random_seed = 3
//!
//!     [termination]
//!     step_count_limit = 20
//! "#).unwrap();
//! let factory = SolverFactory::new(
//!     config,
//!     SimpleScoreDirectorFactory::new(pair::create_pair_descriptor(), pair::calculate_conflicts),
//! )
//! .unwrap();
//!
//! let value = VariableAccess {
//!     entity_class: "Item",
//!     descriptor_index: 0,
//!     variable_name: "value",
//!     getter: pair::get_value,
//!     setter: pair::set_value,
//!     values: pair::value_range,
//! };
//! let best = factory.solve(PairSolution::with_values(&[1, 1]), &[value]).unwrap();
//! assert_eq!(best.score, Some(SimpleScore::of(0)));
//! ```

mod solver;

pub use solver::SolverFactory;

pub use searchforge_config::{
    EnvironmentMode, LocalSearchConfig, LocalSearchType, MoveThreadCount, PhaseConfig,
    SolverConfig, TerminationConfig,
};
pub use searchforge_core::{
    HardMediumSoftScore, HardSoftScore, ParseableScore, PlanningSolution, Result, Score,
    SearchForgeError, SimpleScore, SolutionDescriptor,
};
pub use searchforge_scoring::{
    ConstraintSet, IncrementalScoreDirector, IncrementalScoreDirectorFactory, ScoreDirector,
    ScoreDirectorFactory, ScoreExplanation, SimpleScoreDirector, SimpleScoreDirectorFactory,
};
pub use searchforge_solver::{
    ClosureProblemChange, ProblemChange, ProblemChangeResult, Solver, SolverHandle, VariableAccess,
};

pub use searchforge_config as config;
pub use searchforge_scoring as scoring;
pub use searchforge_solver as engine;

pub mod prelude {
    pub use super::{
        HardMediumSoftScore, HardSoftScore, PlanningSolution, Score, SimpleScore,
        SimpleScoreDirectorFactory, SolverConfig, SolverFactory, VariableAccess,
    };
    pub use super::{IncrementalScoreDirectorFactory, ScoreDirectorFactory};
}
