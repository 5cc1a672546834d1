//! Termination driven by another thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use searchforge_core::domain::PlanningSolution;

use super::{Progress, Termination};

/// Terminates once a shared flag is raised.
///
/// # Example
///
/// ```
/// use std::sync::atomic::Ordering;
/// use searchforge_solver::termination::ExternalTermination;
///
/// let term = ExternalTermination::new();
/// let flag = term.flag();
/// assert!(!term.is_requested());
/// flag.store(true, Ordering::SeqCst);
/// assert!(term.is_requested());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExternalTermination {
    flag: Arc<AtomicBool>,
}

impl ExternalTermination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl<S: PlanningSolution> Termination<S> for ExternalTermination {
    fn is_terminated(&self, _progress: &Progress<S::Score>) -> bool {
        self.is_requested()
    }
}
