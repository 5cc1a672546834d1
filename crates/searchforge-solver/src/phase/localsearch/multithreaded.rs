//! Multithreaded move evaluation.

use std::fmt::{self, Debug};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use searchforge_config::EnvironmentMode;
use searchforge_core::domain::PlanningSolution;
use searchforge_core::{Result, SearchForgeError};
use searchforge_scoring::{ScoreDirector, ScoreDirectorFactory};
use tracing::debug;

use super::decider::evaluate_move;
use crate::heuristic::r#move::Move;

/// Scores batches of moves away from the solver thread.
///
/// An evaluator only ever reports scores. The acceptor, the forager and the
/// selectors stay on the coordinating thread, which feeds them the results
/// in selection order.
pub trait MoveEvaluator<S: PlanningSolution, M: Move<S>>: Send + Debug {
    /// Number of moves the decider selects before each evaluation round.
    fn batch_size(&self) -> usize;

    /// Replaces every worker's solution with a copy of `working_solution`.
    fn sync(&mut self, working_solution: &S) -> Result<()>;

    /// Does, scores and undoes every move on a worker. Scores come back in
    /// the order of `moves`.
    fn evaluate(
        &mut self,
        moves: &[M],
        last_step_score: S::Score,
        environment_mode: EnvironmentMode,
    ) -> Result<Vec<S::Score>>;
}

/// Evaluates moves on a rayon pool, one score director per worker.
///
/// Each worker owns a director built by the factory over its own copy of the
/// working solution. Workers are brought in line with the canonical working
/// solution before every step, so the moves they score are the moves the
/// coordinating thread would score.
pub struct MultiThreadedMoveEvaluator<S: PlanningSolution, F: ScoreDirectorFactory<S>> {
    factory: F,
    pool: ThreadPool,
    workers: Vec<F::Director>,
    thread_count: usize,
    moves_per_thread: usize,
}

/// Moves each worker scores per evaluation round.
pub const DEFAULT_MOVES_PER_THREAD: usize = 10;

impl<S, F> MultiThreadedMoveEvaluator<S, F>
where
    S: PlanningSolution,
    F: ScoreDirectorFactory<S>,
{
    pub fn new(factory: F, thread_count: usize) -> Result<Self> {
        if thread_count == 0 {
            return Err(SearchForgeError::Config(
                "the move thread count must be at least 1".to_string(),
            ));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .thread_name(|index| format!("searchforge-move-{}", index))
            .build()
            .map_err(|e| SearchForgeError::Internal(format!("cannot start move threads: {}", e)))?;
        Ok(Self {
            factory,
            pool,
            workers: Vec::with_capacity(thread_count),
            thread_count,
            moves_per_thread: DEFAULT_MOVES_PER_THREAD,
        })
    }

    pub fn with_moves_per_thread(mut self, moves_per_thread: usize) -> Self {
        self.moves_per_thread = moves_per_thread.max(1);
        self
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }
}

impl<S, F, M> MoveEvaluator<S, M> for MultiThreadedMoveEvaluator<S, F>
where
    S: PlanningSolution,
    F: ScoreDirectorFactory<S>,
    M: Move<S>,
{
    fn batch_size(&self) -> usize {
        self.thread_count * self.moves_per_thread
    }

    fn sync(&mut self, working_solution: &S) -> Result<()> {
        if self.workers.is_empty() {
            for _ in 0..self.thread_count {
                let director = self
                    .factory
                    .build_score_director(working_solution.clone())?;
                self.workers.push(director);
            }
            debug!(event = "move_threads_started", thread_count = self.thread_count);
        } else {
            for worker in &mut self.workers {
                worker.set_working_solution(working_solution.clone());
            }
        }
        Ok(())
    }

    fn evaluate(
        &mut self,
        moves: &[M],
        last_step_score: S::Score,
        environment_mode: EnvironmentMode,
    ) -> Result<Vec<S::Score>> {
        if moves.is_empty() {
            return Ok(Vec::new());
        }
        if self.workers.len() != self.thread_count {
            return Err(SearchForgeError::UsageOrder(
                "moves evaluated before the workers were synced".to_string(),
            ));
        }
        let chunk_size = moves.len().div_ceil(self.thread_count);
        let workers = &mut self.workers;
        let per_chunk: Vec<Vec<S::Score>> = self.pool.install(|| {
            moves
                .par_chunks(chunk_size)
                .zip(workers.par_iter_mut())
                .map(|(chunk, worker)| {
                    chunk
                        .iter()
                        .map(|mv| evaluate_move(&mut *worker, mv, last_step_score, environment_mode))
                        .collect::<Result<Vec<_>>>()
                })
                .collect::<Result<Vec<_>>>()
        })?;
        Ok(per_chunk.into_iter().flatten().collect())
    }
}

impl<S: PlanningSolution, F: ScoreDirectorFactory<S>> Debug for MultiThreadedMoveEvaluator<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiThreadedMoveEvaluator")
            .field("thread_count", &self.thread_count)
            .field("moves_per_thread", &self.moves_per_thread)
            .field("workers", &self.workers.len())
            .finish()
    }
}
