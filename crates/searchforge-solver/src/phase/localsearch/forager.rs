//! Forager for local search move selection.
//!
//! The forager buffers the accepted moves of one step, decides when the
//! decider may stop evaluating, and picks the step's winning move.

use std::cmp::Ordering;
use std::fmt::Debug;

use rand::rngs::StdRng;
use rand::Rng;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::Score;

use super::StepContext;
use crate::heuristic::r#move::Move;

/// When the forager stops the evaluation of a step before its quota is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PickEarlyType {
    /// Evaluate the full quota of candidates.
    #[default]
    Never,
    /// Stop at the first accepted move that beats the best score.
    FirstBestScoreImproving,
    /// Stop at the first accepted move that beats the last step score.
    FirstLastStepScoreImproving,
}

/// How the forager ranks accepted moves against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FinalistPodiumType {
    /// The highest score wins.
    #[default]
    HighestScore,
    /// Strategic oscillation by score level.
    ///
    /// When no candidate improves on the reference score, a move that improves
    /// some level on the reference wins over one that improves none, so the
    /// search can trade a regression on one level for progress on another.
    /// The reference is the last step score, or the best score when
    /// `on_best_score` is set.
    StrategicOscillationByLevel { on_best_score: bool },
}

/// Collects accepted moves and picks the winner of a step.
pub struct LocalSearchForager<S: PlanningSolution, M> {
    accepted_count_limit: Option<usize>,
    pick_early_type: PickEarlyType,
    break_tie_randomly: bool,
    podium_type: FinalistPodiumType,
    step: Option<StepContext<S::Score>>,
    accepted_move_count: usize,
    early_picked: Option<(M, S::Score)>,
    finalists: Vec<(M, S::Score)>,
    finalist_score: Option<S::Score>,
}

impl<S, M> LocalSearchForager<S, M>
where
    S: PlanningSolution,
    M: Move<S>,
{
    /// Creates a forager without accepted count limit, that never picks early
    /// and breaks ties randomly.
    pub fn new() -> Self {
        Self {
            accepted_count_limit: None,
            pick_early_type: PickEarlyType::Never,
            break_tie_randomly: true,
            podium_type: FinalistPodiumType::HighestScore,
            step: None,
            accepted_move_count: 0,
            early_picked: None,
            finalists: Vec::new(),
            finalist_score: None,
        }
    }

    /// Stops the step once this many moves were accepted.
    pub fn with_accepted_count_limit(mut self, limit: usize) -> Self {
        self.accepted_count_limit = Some(limit.max(1));
        self
    }

    pub fn with_pick_early_type(mut self, pick_early_type: PickEarlyType) -> Self {
        self.pick_early_type = pick_early_type;
        self
    }

    pub fn with_break_tie_randomly(mut self, break_tie_randomly: bool) -> Self {
        self.break_tie_randomly = break_tie_randomly;
        self
    }

    pub fn with_podium_type(mut self, podium_type: FinalistPodiumType) -> Self {
        self.podium_type = podium_type;
        self
    }

    pub fn accepted_count_limit(&self) -> Option<usize> {
        self.accepted_count_limit
    }

    pub fn accepted_move_count(&self) -> usize {
        self.accepted_move_count
    }

    pub fn step_started(&mut self, step: &StepContext<S::Score>) {
        self.step = Some(*step);
        self.accepted_move_count = 0;
        self.early_picked = None;
        self.finalists.clear();
        self.finalist_score = None;
    }

    /// Buffers an accepted move with the score it leads to.
    pub fn add_move(&mut self, mv: M, score: S::Score) {
        self.accepted_move_count += 1;
        if self.early_picked.is_none() && self.is_early_pick(score) {
            self.early_picked = Some((mv.clone(), score));
        }
        match self.compare_with_finalists(score) {
            Ordering::Greater => {
                self.finalists.clear();
                self.finalists.push((mv, score));
                self.finalist_score = Some(score);
            }
            Ordering::Equal => self.finalists.push((mv, score)),
            Ordering::Less => {}
        }
    }

    /// Returns true once the decider should stop evaluating moves for this step.
    /// True if a step can end before a never-ending selector runs out.
    pub fn supports_never_ending_move_selector(&self) -> bool {
        self.accepted_count_limit.is_some() || self.pick_early_type != PickEarlyType::Never
    }

    pub fn is_quit_early(&self) -> bool {
        self.early_picked.is_some()
            || self
                .accepted_count_limit
                .is_some_and(|limit| self.accepted_move_count >= limit)
    }

    /// Removes and returns the winning move, if any move was accepted.
    pub fn pick_move(&mut self, rng: &mut StdRng) -> Option<(M, S::Score)> {
        if let Some(picked) = self.early_picked.take() {
            self.finalists.clear();
            return Some(picked);
        }
        if self.finalists.is_empty() {
            return None;
        }
        let index = if self.break_tie_randomly && self.finalists.len() > 1 {
            rng.random_range(0..self.finalists.len())
        } else {
            0
        };
        let picked = self.finalists.swap_remove(index);
        self.finalists.clear();
        Some(picked)
    }

    pub fn phase_ended(&mut self) {
        self.step = None;
        self.early_picked = None;
        self.finalists.clear();
        self.finalist_score = None;
    }

    fn is_early_pick(&self, score: S::Score) -> bool {
        let Some(step) = &self.step else {
            return false;
        };
        match self.pick_early_type {
            PickEarlyType::Never => false,
            PickEarlyType::FirstBestScoreImproving => score > step.best_score,
            PickEarlyType::FirstLastStepScoreImproving => score > step.last_step_score,
        }
    }

    fn compare_with_finalists(&self, score: S::Score) -> Ordering {
        let Some(finalist_score) = self.finalist_score else {
            return Ordering::Greater;
        };
        match (self.podium_type, &self.step) {
            (FinalistPodiumType::StrategicOscillationByLevel { on_best_score }, Some(step)) => {
                let reference = if on_best_score {
                    step.best_score
                } else {
                    step.last_step_score
                };
                oscillation_compare(score, finalist_score, reference)
            }
            _ => score.cmp(&finalist_score),
        }
    }
}

fn oscillation_compare<Sc: Score>(score: Sc, finalist_score: Sc, reference: Sc) -> Ordering {
    // Only a move below the reference oscillates; an improving finalist is
    // never traded for an oscillating move.
    if score >= reference || finalist_score > reference {
        return score.cmp(&finalist_score);
    }
    let move_levels = score.to_level_numbers();
    let finalist_levels = finalist_score.to_level_numbers();
    let reference_levels = reference.to_level_numbers();
    for ((m, f), r) in move_levels.iter().zip(&finalist_levels).zip(&reference_levels) {
        let move_is_higher = m > r;
        let finalist_is_higher = f > r;
        match (move_is_higher, finalist_is_higher) {
            (true, true) => break,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }
    }
    score.cmp(&finalist_score)
}

impl<S, M> Default for LocalSearchForager<S, M>
where
    S: PlanningSolution,
    M: Move<S>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PlanningSolution, M> Debug for LocalSearchForager<S, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSearchForager")
            .field("accepted_count_limit", &self.accepted_count_limit)
            .field("pick_early_type", &self.pick_early_type)
            .field("break_tie_randomly", &self.break_tie_randomly)
            .field("podium_type", &self.podium_type)
            .field("accepted_move_count", &self.accepted_move_count)
            .field("finalist_count", &self.finalists.len())
            .finish()
    }
}
