//! Terminations on the best score.

use searchforge_core::domain::PlanningSolution;
use searchforge_core::Score;

use super::{ratio, Progress, Termination};

/// Terminates once the best score reaches a target.
#[derive(Debug, Clone, Copy)]
pub struct BestScoreTermination<Sc: Score> {
    target: Sc,
}

impl<Sc: Score> BestScoreTermination<Sc> {
    pub fn new(target: Sc) -> Self {
        Self { target }
    }

    pub fn target(&self) -> Sc {
        self.target
    }
}

impl<S: PlanningSolution> Termination<S> for BestScoreTermination<S::Score> {
    fn is_terminated(&self, progress: &Progress<S::Score>) -> bool {
        progress.best_score.is_some_and(|best| best >= self.target)
    }

    // Measured on the most significant level where the starting score
    // differs from the target.
    fn time_gradient(&self, progress: &Progress<S::Score>) -> Option<f64> {
        let starting = progress.starting_score?;
        let best = progress.best_score?;
        if best >= self.target || starting >= self.target {
            return Some(1.0);
        }
        let starting = starting.to_level_doubles();
        let best = best.to_level_doubles();
        let target = self.target.to_level_doubles();
        let level = (0..target.len()).find(|&i| starting[i] != target[i])?;
        if best[level] > target[level] {
            return Some(1.0);
        }
        Some(ratio(
            best[level] - starting[level],
            target[level] - starting[level],
        ))
    }
}

/// Terminates once the best score is feasible.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestScoreFeasibleTermination;

impl BestScoreFeasibleTermination {
    pub fn new() -> Self {
        Self
    }
}

impl<S: PlanningSolution> Termination<S> for BestScoreFeasibleTermination {
    fn is_terminated(&self, progress: &Progress<S::Score>) -> bool {
        progress.best_score.is_some_and(|best| best.is_feasible())
    }
}
