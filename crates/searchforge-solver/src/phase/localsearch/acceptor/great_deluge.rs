//! Great deluge acceptor.

use std::fmt::Debug;

use rand::rngs::StdRng;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::{Result, Score, SearchForgeError};

use super::{Acceptor, Candidate, PhaseContext, StepContext, TakenStep};
use crate::heuristic::r#move::Move;

/// How the water level rises after each step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaterLevelIncrement<Sc> {
    /// Adds a fixed score.
    Score(Sc),
    /// Adds `|level * ratio|`.
    Ratio(f64),
}

/// Great deluge acceptor - accepts moves above a rising water level.
///
/// The water level starts at the phase's initial score and only rises. A move
/// is accepted when it is at or above the level, or when it improves on the
/// last step score.
///
/// # Example
///
/// ```
/// use searchforge_core::HardSoftScore;
/// use searchforge_solver::phase::localsearch::GreatDelugeAcceptor;
///
/// let by_ratio = GreatDelugeAcceptor::<HardSoftScore>::with_ratio(0.001).unwrap();
/// assert!(by_ratio.water_level().is_none());
///
/// let by_score = GreatDelugeAcceptor::with_increment_score(HardSoftScore::of(0, 10)).unwrap();
/// assert!(by_score.water_level().is_none());
///
/// assert!(GreatDelugeAcceptor::<HardSoftScore>::with_ratio(0.0).is_err());
/// ```
#[derive(Clone)]
pub struct GreatDelugeAcceptor<Sc: Score> {
    increment: WaterLevelIncrement<Sc>,
    water_level: Option<Sc>,
}

impl<Sc: Score> Debug for GreatDelugeAcceptor<Sc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GreatDelugeAcceptor")
            .field("increment", &self.increment)
            .field("water_level", &self.water_level)
            .finish()
    }
}

impl<Sc: Score> GreatDelugeAcceptor<Sc> {
    pub const DEFAULT_RATIO: f64 = 0.000_000_05;

    pub fn new(increment: WaterLevelIncrement<Sc>) -> Result<Self> {
        match increment {
            WaterLevelIncrement::Ratio(ratio) if ratio.is_nan() || ratio <= 0.0 => {
                return Err(SearchForgeError::Config(format!(
                    "the water level increment ratio ({}) must be positive",
                    ratio
                )));
            }
            WaterLevelIncrement::Score(score) if score < Sc::zero() => {
                return Err(SearchForgeError::Config(format!(
                    "the water level increment score ({}) cannot be negative",
                    score
                )));
            }
            _ => {}
        }
        Ok(Self {
            increment,
            water_level: None,
        })
    }

    pub fn with_ratio(ratio: f64) -> Result<Self> {
        Self::new(WaterLevelIncrement::Ratio(ratio))
    }

    pub fn with_increment_score(score: Sc) -> Result<Self> {
        Self::new(WaterLevelIncrement::Score(score))
    }

    pub fn water_level(&self) -> Option<Sc> {
        self.water_level
    }
}

impl<Sc: Score> Default for GreatDelugeAcceptor<Sc> {
    fn default() -> Self {
        Self {
            increment: WaterLevelIncrement::Ratio(Self::DEFAULT_RATIO),
            water_level: None,
        }
    }
}

impl<S, M> Acceptor<S, M> for GreatDelugeAcceptor<S::Score>
where
    S: PlanningSolution,
    M: Move<S>,
{
    fn phase_started(&mut self, phase: &PhaseContext<S::Score>) {
        self.water_level = Some(phase.initial_score);
    }

    fn is_accepted(
        &mut self,
        step: &StepContext<S::Score>,
        candidate: &Candidate<'_, S, M>,
        _rng: &mut StdRng,
    ) -> bool {
        let water_level = self.water_level.unwrap_or(step.last_step_score);
        candidate.score >= water_level || candidate.score > step.last_step_score
    }

    fn step_ended(&mut self, _step: &StepContext<S::Score>, _taken: &TakenStep<'_, S, M>) {
        if let Some(level) = self.water_level {
            let rise = match self.increment {
                WaterLevelIncrement::Score(score) => score,
                WaterLevelIncrement::Ratio(ratio) => level.multiply(ratio).abs(),
            };
            self.water_level = Some(level + rise);
        }
    }

    fn phase_ended(&mut self) {
        self.water_level = None;
    }
}
