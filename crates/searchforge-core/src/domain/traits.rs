//! Core domain traits

/// Trait for planning solutions.
///
/// A planning solution holds both the problem definition and the
/// (potentially partial) assignment: problem facts, planning entities
/// and the score of the current assignment.
///
/// # Example
///
/// ```
/// use searchforge_core::{PlanningSolution, SimpleScore};
///
/// #[derive(Clone)]
/// struct NQueens {
///     rows: Vec<Option<usize>>,
///     score: Option<SimpleScore>,
/// }
///
/// impl PlanningSolution for NQueens {
///     type Score = SimpleScore;
///
///     fn score(&self) -> Option<Self::Score> {
///         self.score
///     }
///
///     fn set_score(&mut self, score: Option<Self::Score>) {
///         self.score = score;
///     }
///
///     fn is_initialized(&self) -> bool {
///         self.rows.iter().all(Option::is_some)
///     }
/// }
/// ```
///
/// Planning solutions must be `Send + Sync` so that clones can be scored on
/// worker threads during multithreaded move evaluation.
pub trait PlanningSolution: Clone + Send + Sync + 'static {
    /// The score type used to evaluate this solution.
    type Score: crate::score::Score;

    /// Returns the current score of this solution, if calculated.
    fn score(&self) -> Option<Self::Score>;

    /// Sets the score of this solution.
    fn set_score(&mut self, score: Option<Self::Score>);

    /// Returns true if every planning variable has been assigned.
    fn is_initialized(&self) -> bool {
        true
    }
}

