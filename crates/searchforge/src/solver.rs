//! Builds solvers from declarative configuration.

use std::fmt::{self, Debug};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use searchforge_config::{LocalSearchConfig, PhaseConfig, SolverConfig};
use searchforge_core::domain::PlanningSolution;
use searchforge_core::{ParseableScore, Result, SearchForgeError};
use searchforge_scoring::ScoreDirectorFactory;
use searchforge_solver::phase::Phase;
use searchforge_solver::{
    AcceptorBuilder, EitherMove, ForagerBuilder, LocalSearchDecider, LocalSearchPhase,
    MoveSelectorBuilder, MultiThreadedMoveEvaluator, Solver, TerminationBuilder, VariableAccess,
};
use tracing::debug;

/// Turns a [`SolverConfig`] into ready-to-run solvers.
///
/// The configuration is validated once, up front. Every solver built by the
/// factory shares its score director factory, including the move threads of
/// multi-threaded phases.
pub struct SolverFactory<S: PlanningSolution, F> {
    config: SolverConfig,
    director_factory: Arc<F>,
    _phantom: PhantomData<fn() -> S>,
}

impl<S, F> SolverFactory<S, F>
where
    S: PlanningSolution,
    S::Score: ParseableScore,
    F: ScoreDirectorFactory<S> + 'static,
{
    pub fn new(config: SolverConfig, director_factory: F) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            director_factory: Arc::new(director_factory),
            _phantom: PhantomData,
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn director_factory(&self) -> &F {
        &self.director_factory
    }

    /// Builds a solver whose move selectors work on `variables`.
    ///
    /// Without configured phases the solver runs one local search phase with
    /// the default settings.
    pub fn build_solver<V>(&self, variables: &[VariableAccess<S, V>]) -> Result<Solver<S, F::Director>>
    where
        V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
    {
        if variables.is_empty() {
            return Err(SearchForgeError::Config(
                "a solver needs at least one planning variable to move".to_string(),
            ));
        }
        let move_threads = self.config.move_thread_count.resolve(available_processors());

        let mut solver = Solver::new().with_environment_mode(self.config.environment_mode);
        if let Some(seed) = self.config.random_seed {
            solver = solver.with_random_seed(seed);
        }
        if let Some(config) = &self.config.termination {
            if let Some(termination) = TerminationBuilder::build(config)? {
                solver = solver.with_termination(termination);
            }
        }

        let default_phases = [PhaseConfig::LocalSearch(LocalSearchConfig::default())];
        let phases = if self.config.phases.is_empty() {
            &default_phases[..]
        } else {
            &self.config.phases[..]
        };
        for (phase_index, phase) in phases.iter().enumerate() {
            let built = match phase {
                PhaseConfig::LocalSearch(config) => {
                    self.build_local_search_phase(config, variables, move_threads)?
                }
            };
            debug!(
                event = "phase_built",
                phase_index,
                phase = built.phase_type_name(),
                move_threads = ?move_threads,
            );
            solver = solver.with_boxed_phase(built);
        }
        Ok(solver)
    }

    fn build_local_search_phase<V>(
        &self,
        config: &LocalSearchConfig,
        variables: &[VariableAccess<S, V>],
        move_threads: Option<usize>,
    ) -> Result<Box<dyn Phase<S, F::Director>>>
    where
        V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
    {
        let move_selector = MoveSelectorBuilder::build(config.move_selector.as_ref(), variables)?;
        let acceptor = AcceptorBuilder::build::<S, EitherMove<S, V>>(&config.resolved_acceptor())?;
        let forager = ForagerBuilder::build(&config.resolved_forager());

        let mut decider = LocalSearchDecider::new(move_selector, acceptor, forager)?;
        if let Some(thread_count) = move_threads {
            let evaluator =
                MultiThreadedMoveEvaluator::new(Arc::clone(&self.director_factory), thread_count)?;
            decider = decider.with_move_evaluator(Box::new(evaluator));
        }

        let mut phase = LocalSearchPhase::new(decider);
        if let Some(termination_config) = &config.termination {
            if let Some(termination) = TerminationBuilder::build(termination_config)? {
                phase = phase.with_termination(termination);
            }
        }
        Ok(Box::new(phase))
    }

    /// Builds a director over `solution` and a solver, and solves.
    pub fn solve<V>(&self, solution: S, variables: &[VariableAccess<S, V>]) -> Result<S>
    where
        V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
    {
        let mut solver = self.build_solver(variables)?;
        let director = self.director_factory.build_score_director(solution)?;
        solver.solve(director)
    }
}

impl<S: PlanningSolution, F> Debug for SolverFactory<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverFactory")
            .field("config", &self.config)
            .finish()
    }
}

fn available_processors() -> usize {
    std::thread::available_parallelism().map_or(1, |count| count.get())
}

#[cfg(test)]
mod tests;
