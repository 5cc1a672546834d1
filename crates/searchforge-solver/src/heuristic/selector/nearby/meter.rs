//! Distance meters for nearby selection.

/// Measures the distance from an origin to a destination.
///
/// Distances only rank destinations; they need not be symmetric, and any
/// finite value is allowed. Closures implement the trait directly.
///
/// # Example
///
/// ```
/// use searchforge_solver::heuristic::selector::nearby::NearbyDistanceMeter;
/// use searchforge_test::pair::PairSolution;
///
/// let by_index = |_: &PairSolution, origin: &usize, destination: &usize| {
///     (*origin as f64 - *destination as f64).abs()
/// };
/// let solution = PairSolution::with_values(&[1, 2, 3]);
/// assert_eq!(by_index.distance(&solution, &0, &2), 2.0);
/// ```
pub trait NearbyDistanceMeter<S, O, D>: Send + Sync {
    fn distance(&self, solution: &S, origin: &O, destination: &D) -> f64;
}

impl<S, O, D, F> NearbyDistanceMeter<S, O, D> for F
where
    F: Fn(&S, &O, &D) -> f64 + Send + Sync,
{
    fn distance(&self, solution: &S, origin: &O, destination: &D) -> f64 {
        self(solution, origin, destination)
    }
}
