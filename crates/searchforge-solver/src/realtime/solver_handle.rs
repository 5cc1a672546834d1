//! Solver handle for submitting problem changes during solving.

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use searchforge_core::domain::PlanningSolution;
use tokio::sync::mpsc;

use super::problem_change::BoxedProblemChange;
use super::ProblemChange;

/// Result of a problem change submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemChangeResult {
    /// The change will be applied at the next step boundary.
    Queued,
    /// No solve is in progress; the change was dropped.
    SolverNotRunning,
    /// The solver side of the queue is gone.
    QueueClosed,
}

/// Handle for interacting with a running solver from another thread.
///
/// Handles are cheap to clone and all clones feed the same queue.
pub struct SolverHandle<S: PlanningSolution> {
    change_tx: mpsc::UnboundedSender<BoxedProblemChange<S>>,
    solving: Arc<AtomicBool>,
    terminate_early: Arc<AtomicBool>,
}

impl<S: PlanningSolution> SolverHandle<S> {
    /// Creates a handle and the receiver the solver drains.
    pub fn new() -> (Self, ProblemChangeReceiver<S>) {
        let (change_tx, change_rx) = mpsc::unbounded_channel();
        let solving = Arc::new(AtomicBool::new(false));
        let terminate_early = Arc::new(AtomicBool::new(false));

        let handle = Self {
            change_tx,
            solving: Arc::clone(&solving),
            terminate_early: Arc::clone(&terminate_early),
        };
        let receiver = ProblemChangeReceiver {
            change_rx,
            solving,
            terminate_early,
        };
        (handle, receiver)
    }

    /// Queues a problem change for the next step boundary.
    pub fn add_problem_change<P: ProblemChange<S> + 'static>(&self, change: P) -> ProblemChangeResult {
        self.add_problem_change_boxed(Box::new(change))
    }

    pub fn add_problem_change_boxed(&self, change: BoxedProblemChange<S>) -> ProblemChangeResult {
        if !self.solving.load(Ordering::SeqCst) {
            return ProblemChangeResult::SolverNotRunning;
        }
        match self.change_tx.send(change) {
            Ok(()) => ProblemChangeResult::Queued,
            Err(_) => ProblemChangeResult::QueueClosed,
        }
    }

    pub fn is_solving(&self) -> bool {
        self.solving.load(Ordering::SeqCst)
    }

    /// Asks the solver to stop at the next step boundary.
    pub fn terminate_early(&self) {
        self.terminate_early.store(true, Ordering::SeqCst);
    }
}

impl<S: PlanningSolution> Clone for SolverHandle<S> {
    fn clone(&self) -> Self {
        Self {
            change_tx: self.change_tx.clone(),
            solving: Arc::clone(&self.solving),
            terminate_early: Arc::clone(&self.terminate_early),
        }
    }
}

impl<S: PlanningSolution> Debug for SolverHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverHandle")
            .field("solving", &self.solving.load(Ordering::SeqCst))
            .field("terminate_early", &self.terminate_early.load(Ordering::SeqCst))
            .finish()
    }
}

/// Solver side of a [`SolverHandle`].
pub struct ProblemChangeReceiver<S: PlanningSolution> {
    change_rx: mpsc::UnboundedReceiver<BoxedProblemChange<S>>,
    solving: Arc<AtomicBool>,
    terminate_early: Arc<AtomicBool>,
}

impl<S: PlanningSolution> ProblemChangeReceiver<S> {
    pub fn has_pending(&self) -> bool {
        !self.change_rx.is_empty()
    }

    /// Takes every queued change, in submission order.
    pub fn drain_pending(&mut self) -> Vec<BoxedProblemChange<S>> {
        let mut changes = Vec::new();
        while let Ok(change) = self.change_rx.try_recv() {
            changes.push(change);
        }
        changes
    }

    /// Marks the solver as running. Starting a solve clears any earlier
    /// early-termination request.
    pub fn set_solving(&self, solving: bool) {
        if solving {
            self.terminate_early.store(false, Ordering::SeqCst);
        }
        self.solving.store(solving, Ordering::SeqCst);
    }

    pub fn is_terminate_early(&self) -> bool {
        self.terminate_early.load(Ordering::SeqCst)
    }

    /// The flag [`SolverHandle::terminate_early`] raises.
    pub fn terminate_early_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.terminate_early)
    }
}

impl<S: PlanningSolution> Debug for ProblemChangeReceiver<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemChangeReceiver")
            .field("pending", &self.change_rx.len())
            .field("solving", &self.solving.load(Ordering::SeqCst))
            .finish()
    }
}
