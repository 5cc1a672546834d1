//! Local search phase.
//!
//! Every step the decider walks the move selector, evaluates each doable move
//! by doing it, scoring it and undoing it, asks the acceptor whether the move
//! is acceptable and hands accepted moves to the forager. The forager's pick
//! becomes the step.
//!
//! Moves can be evaluated on several threads: see
//! [`MultiThreadedMoveEvaluator`].

pub mod acceptor;

mod decider;
mod forager;
mod multithreaded;
mod phase;


pub use acceptor::{
    Acceptor, Candidate, CompositeAcceptor, GreatDelugeAcceptor, HillClimbingAcceptor,
    LateAcceptanceAcceptor, PhaseContext, SimulatedAnnealingAcceptor, StepContext, TabuAcceptor,
    TabuKind, TabuSize, TakenStep, WaterLevelIncrement,
};
pub use decider::{LocalSearchDecider, StepDecision, DEFAULT_UNACCEPTED_MOVE_LIMIT};
pub use forager::{FinalistPodiumType, LocalSearchForager, PickEarlyType};
pub use multithreaded::{MoveEvaluator, MultiThreadedMoveEvaluator};
pub use phase::LocalSearchPhase;
