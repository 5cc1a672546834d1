//! Simulated annealing acceptor.

use rand::rngs::StdRng;
use rand::Rng;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::{Result, Score, SearchForgeError};

use super::{Acceptor, Candidate, PhaseContext, StepContext};
use crate::heuristic::r#move::Move;

const TEMPERATURE_MINIMUM: f64 = 1.0e-100;

/// Simulated annealing with one temperature per score level.
///
/// Every step, each level's temperature is its starting temperature scaled by
/// `1 - time_gradient`, so the search cools down as the phase budget runs out.
/// Moves at least as good as the last step are always accepted. A worse move is
/// accepted with the product over levels of `exp(-difference / temperature)`,
/// where levels that did not get worse contribute 1.
#[derive(Debug, Clone)]
pub struct SimulatedAnnealingAcceptor {
    starting_temperature_levels: Vec<f64>,
    temperature_levels: Vec<f64>,
}

impl SimulatedAnnealingAcceptor {
    /// Builds the acceptor from a starting temperature expressed as a score,
    /// for example `0hard/400soft`. Negative levels are rejected.
    pub fn new<Sc: Score>(starting_temperature: Sc) -> Result<Self> {
        let starting_temperature_levels = starting_temperature.to_level_doubles();
        if let Some(level) = starting_temperature_levels.iter().find(|l| **l < 0.0) {
            return Err(SearchForgeError::Config(format!(
                "the starting temperature ({}) cannot have a negative level ({})",
                starting_temperature, level
            )));
        }
        Ok(Self {
            temperature_levels: starting_temperature_levels.clone(),
            starting_temperature_levels,
        })
    }

    pub fn temperature_levels(&self) -> &[f64] {
        &self.temperature_levels
    }
}

impl<S, M> Acceptor<S, M> for SimulatedAnnealingAcceptor
where
    S: PlanningSolution,
    M: Move<S>,
{
    fn phase_started(&mut self, _phase: &PhaseContext<S::Score>) {
        self.temperature_levels = self.starting_temperature_levels.clone();
    }

    fn step_started(&mut self, step: &StepContext<S::Score>) {
        let reverse_time_gradient = 1.0 - step.time_gradient;
        self.temperature_levels = self
            .starting_temperature_levels
            .iter()
            .map(|start| (start * reverse_time_gradient).max(TEMPERATURE_MINIMUM))
            .collect();
    }

    fn is_accepted(
        &mut self,
        step: &StepContext<S::Score>,
        candidate: &Candidate<'_, S, M>,
        rng: &mut StdRng,
    ) -> bool {
        if candidate.score >= step.last_step_score {
            return true;
        }
        let difference = (step.last_step_score - candidate.score).to_level_doubles();
        let accept_chance: f64 = difference
            .iter()
            .zip(&self.temperature_levels)
            .map(|(diff, temperature)| {
                if *diff <= 0.0 {
                    1.0
                } else {
                    (-diff / temperature).exp()
                }
            })
            .product();
        rng.random::<f64>() < accept_chance
    }
}
