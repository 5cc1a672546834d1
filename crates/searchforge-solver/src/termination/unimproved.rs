//! Terminations on lack of improvement.

use std::time::Duration;

use searchforge_core::domain::PlanningSolution;

use super::{ratio, Progress, Termination};

/// Terminates when the best score has not improved for a number of steps.
#[derive(Debug, Clone, Copy)]
pub struct UnimprovedStepCountTermination {
    limit: u64,
}

impl UnimprovedStepCountTermination {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl<S: PlanningSolution> Termination<S> for UnimprovedStepCountTermination {
    fn is_terminated(&self, progress: &Progress<S::Score>) -> bool {
        progress.unimproved_step_count >= self.limit
    }

    fn time_gradient(&self, progress: &Progress<S::Score>) -> Option<f64> {
        Some(ratio(progress.unimproved_step_count as f64, self.limit as f64))
    }
}

/// Terminates when the best score has not improved for a duration.
#[derive(Debug, Clone, Copy)]
pub struct UnimprovedTimeTermination {
    limit: Duration,
}

impl UnimprovedTimeTermination {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn seconds(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }
}

impl<S: PlanningSolution> Termination<S> for UnimprovedTimeTermination {
    fn is_terminated(&self, progress: &Progress<S::Score>) -> bool {
        progress.unimproved_elapsed >= self.limit
    }

    fn time_gradient(&self, progress: &Progress<S::Score>) -> Option<f64> {
        Some(ratio(
            progress.unimproved_elapsed.as_secs_f64(),
            self.limit.as_secs_f64(),
        ))
    }
}
