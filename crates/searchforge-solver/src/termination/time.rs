//! Time-based termination.

use std::time::Duration;

use searchforge_core::domain::PlanningSolution;

use super::{ratio, Progress, Termination};

/// Terminates after a time limit.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use searchforge_solver::termination::TimeTermination;
///
/// let term = TimeTermination::seconds(30);
/// assert_eq!(term.limit(), Duration::from_secs(30));
/// assert_eq!(TimeTermination::millis(1500).limit(), Duration::from_millis(1500));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TimeTermination {
    limit: Duration,
}

impl TimeTermination {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    pub fn millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn seconds(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

impl<S: PlanningSolution> Termination<S> for TimeTermination {
    fn is_terminated(&self, progress: &Progress<S::Score>) -> bool {
        progress.elapsed >= self.limit
    }

    fn time_gradient(&self, progress: &Progress<S::Score>) -> Option<f64> {
        Some(ratio(
            progress.elapsed.as_secs_f64(),
            self.limit.as_secs_f64(),
        ))
    }
}
