//! SearchForge local search engine
//!
//! This crate provides the solver implementation:
//! - Moves and the selector framework that generates them
//! - Acceptors, the forager and the decider of the local search phase
//! - Multi-threaded move evaluation
//! - Scopes, terminations and real-time problem changes
//! - The [`Solver`] that runs phases in order
//! - Configuration wiring (builder module)

pub mod builder;
pub mod heuristic;
pub mod phase;
pub mod realtime;
pub mod scope;
pub mod solver;
pub mod termination;

pub use builder::{
    AcceptorBuilder, ForagerBuilder, MoveSelectorBuilder, TerminationBuilder, VariableAccess,
};
pub use heuristic::selector::decorator::{
    CachingSelector, FilteringSelector, ProbabilitySelector, SelectedCountLimitSelector,
    ShufflingSelector, SortingSelector,
};
pub use heuristic::selector::nearby::{
    NearbyDistanceMeter, NearbyDistribution, NearbyEntitySelector, NearbyValueSelector,
};
pub use heuristic::selector::{
    CartesianProductMoveSelector, ChangeMoveSelector, FromSolutionEntitySelector,
    FromSolutionValueSelector, MimicRecordingSelector, MimicReplayingSelector,
    SelectionCacheType, SelectionOrder, StaticValueSelector, SwapMoveSelector, UnionMoveSelector,
    ValueSelector,
};
pub use heuristic::{ChangeMove, CompositeMove, EitherMove, Move, Selector, SelectorEvent, SwapMove};
pub use phase::localsearch::{
    Acceptor, CompositeAcceptor, FinalistPodiumType, GreatDelugeAcceptor, HillClimbingAcceptor,
    LateAcceptanceAcceptor, LocalSearchDecider, LocalSearchForager, LocalSearchPhase,
    MoveEvaluator, MultiThreadedMoveEvaluator, PickEarlyType, SimulatedAnnealingAcceptor,
    TabuAcceptor, TabuKind, TabuSize,
};
pub use phase::Phase;
pub use realtime::{
    ClosureProblemChange, ProblemChange, ProblemChangeDirector, ProblemChangeResult, SolverHandle,
};
pub use scope::{PhaseScope, SolverScope, StepScope};
pub use solver::Solver;
pub use termination::{
    AndTermination, BestScoreFeasibleTermination, BestScoreTermination, ExternalTermination,
    OrTermination, Progress, StepCountTermination, Termination, TimeTermination,
    UnimprovedStepCountTermination, UnimprovedTimeTermination,
};
