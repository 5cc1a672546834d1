//! Step count termination.

use searchforge_core::domain::PlanningSolution;

use super::{ratio, Progress, Termination};

/// Terminates after a number of steps.
#[derive(Debug, Clone, Copy)]
pub struct StepCountTermination {
    limit: u64,
}

impl StepCountTermination {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl<S: PlanningSolution> Termination<S> for StepCountTermination {
    fn is_terminated(&self, progress: &Progress<S::Score>) -> bool {
        progress.step_count >= self.limit
    }

    fn time_gradient(&self, progress: &Progress<S::Score>) -> Option<f64> {
        Some(ratio(progress.step_count as f64, self.limit as f64))
    }
}
