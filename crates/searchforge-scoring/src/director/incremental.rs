//! Incremental score director over a monomorphized constraint set.

use std::collections::BTreeSet;
use std::fmt;

use searchforge_core::domain::{
    EntityReference, PlanningSolution, SolutionDescriptor, VariableKey,
};
use searchforge_core::score::Score;
use searchforge_core::{Result, SearchForgeError};

use super::listener_support::{EntityChangeSink, ListenerRegistration, VariableListenerSupport};
use super::traits::ScoreDirector;
use crate::analysis::ConstraintMatchTotal;
use crate::constraint::ConstraintSet;

/// A score director that keeps the score up to date with deltas.
///
/// Before an entity changes, its contribution is retracted from every
/// constraint. Re-insertion is deferred until the score is needed or the
/// variable listeners have run, so an entity touched by both a genuine
/// change and a cascading shadow update is retracted and inserted once.
///
/// # Example
///
/// ```
/// use searchforge_core::domain::{EntityDescriptor, PlanningSolution, SolutionDescriptor, VariableDescriptor};
/// use searchforge_core::score::SimpleScore;
/// use searchforge_core::{ConstraintRef, ImpactType};
/// use searchforge_scoring::{IncrementalScoreDirector, ScoreDirector, UniConstraint};
///
/// #[derive(Clone, Debug)]
/// struct Lights {
///     on: Vec<bool>,
///     score: Option<SimpleScore>,
/// }
///
/// impl PlanningSolution for Lights {
///     type Score = SimpleScore;
///     fn score(&self) -> Option<SimpleScore> { self.score }
///     fn set_score(&mut self, score: Option<SimpleScore>) { self.score = score; }
/// }
///
/// let descriptor = SolutionDescriptor::new("Lights")
///     .with_entity(EntityDescriptor::new("Light", |s: &Lights| s.on.len())
///         .with_variable(VariableDescriptor::genuine("on")));
/// let lit = UniConstraint::new(
///     ConstraintRef::new("", "Lit"),
///     ImpactType::Penalty,
///     SimpleScore::of(1),
///     0,
///     |s: &Lights| s.on.len(),
///     |s: &Lights, i: usize| i64::from(s.on[i]),
/// );
///
/// let solution = Lights { on: vec![true, false, true], score: None };
/// let mut director = IncrementalScoreDirector::new(solution, descriptor, (lit,));
/// assert_eq!(director.calculate_score(), SimpleScore::of(-2));
///
/// director.before_variable_changed(0, 0, "on").unwrap();
/// director.working_solution_mut().on[0] = false;
/// director.after_variable_changed(0, 0, "on").unwrap();
/// assert_eq!(director.calculate_score(), SimpleScore::of(-1));
/// ```
pub struct IncrementalScoreDirector<S, C>
where
    S: PlanningSolution,
    C: ConstraintSet<S, S::Score>,
{
    working_solution: S,
    solution_descriptor: SolutionDescriptor<S>,
    constraints: C,
    listener_support: VariableListenerSupport<S>,
    cached_score: S::Score,
    retracted: BTreeSet<EntityReference>,
    initialized: bool,
    constraint_match_enabled: bool,
    calculation_count: u64,
}

// Retracts each entity at most once until the next flush.
struct RetractSink<'a, C, Sc> {
    constraints: &'a mut C,
    score: &'a mut Sc,
    retracted: &'a mut BTreeSet<EntityReference>,
    active: bool,
}

impl<S, C, Sc> EntityChangeSink<S> for RetractSink<'_, C, Sc>
where
    Sc: Score,
    C: ConstraintSet<S, Sc>,
{
    fn before_entity_changed(&mut self, solution: &S, entity: EntityReference) {
        if self.active && self.retracted.insert(entity) {
            let delta = self.constraints.on_retract_all(
                solution,
                entity.entity_index,
                entity.descriptor_index,
            );
            *self.score = *self.score + delta;
        }
    }

    fn after_entity_changed(&mut self, _solution: &S, _entity: EntityReference) {}
}

impl<S, C> IncrementalScoreDirector<S, C>
where
    S: PlanningSolution,
    C: ConstraintSet<S, S::Score>,
{
    /// Creates a director without shadow variables.
    pub fn new(solution: S, solution_descriptor: SolutionDescriptor<S>, constraints: C) -> Self {
        IncrementalScoreDirector {
            working_solution: solution,
            solution_descriptor,
            constraints,
            listener_support: VariableListenerSupport::default(),
            cached_score: S::Score::zero(),
            retracted: BTreeSet::new(),
            initialized: false,
            constraint_match_enabled: false,
            calculation_count: 0,
        }
    }

    /// Creates a director whose shadow variables are maintained by the given listeners.
    pub fn with_listeners(
        solution: S,
        solution_descriptor: SolutionDescriptor<S>,
        constraints: C,
        listeners: &[ListenerRegistration<S>],
    ) -> Result<Self> {
        let listener_support = VariableListenerSupport::build(&solution_descriptor, listeners)?;
        let mut director = Self::new(solution, solution_descriptor, constraints);
        director.listener_support = listener_support;
        director
            .listener_support
            .reset_working_solution(&mut director.working_solution);
        Ok(director)
    }

    pub fn with_constraint_match_enabled(mut self, enabled: bool) -> Self {
        self.constraint_match_enabled = enabled;
        self
    }

    pub fn constraints(&self) -> &C {
        &self.constraints
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn initialize(&mut self) {
        self.retracted.clear();
        self.cached_score = self.constraints.initialize_all(&self.working_solution);
        self.initialized = true;
    }

    // Re-inserts every retracted entity in index order.
    fn flush(&mut self) {
        let retracted = std::mem::take(&mut self.retracted);
        for entity in retracted {
            let delta = self.constraints.on_insert_all(
                &self.working_solution,
                entity.entity_index,
                entity.descriptor_index,
            );
            self.cached_score = self.cached_score + delta;
        }
    }
}

impl<S, C> ScoreDirector<S> for IncrementalScoreDirector<S, C>
where
    S: PlanningSolution,
    C: ConstraintSet<S, S::Score>,
{
    fn working_solution(&self) -> &S {
        &self.working_solution
    }

    fn working_solution_mut(&mut self) -> &mut S {
        &mut self.working_solution
    }

    fn calculate_score(&mut self) -> S::Score {
        self.calculation_count += 1;
        if self.initialized {
            self.flush();
        } else {
            self.initialize();
        }
        self.working_solution.set_score(Some(self.cached_score));
        self.cached_score
    }

    fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        &self.solution_descriptor
    }

    fn clone_working_solution(&self) -> S {
        self.working_solution.clone()
    }

    fn set_working_solution(&mut self, solution: S) {
        self.working_solution = solution;
        self.reset();
    }

    fn before_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) -> Result<()> {
        let Self {
            working_solution,
            constraints,
            listener_support,
            cached_score,
            retracted,
            initialized,
            ..
        } = self;
        let mut sink = RetractSink {
            constraints,
            score: cached_score,
            retracted,
            active: *initialized,
        };
        listener_support.before_variable_changed(
            working_solution,
            &mut sink,
            VariableKey::new(descriptor_index, variable_name),
            EntityReference::new(descriptor_index, entity_index),
        )
    }

    fn after_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &'static str,
    ) -> Result<()> {
        let Self {
            working_solution,
            constraints,
            listener_support,
            cached_score,
            retracted,
            initialized,
            ..
        } = self;
        let mut sink = RetractSink {
            constraints,
            score: cached_score,
            retracted,
            active: *initialized,
        };
        listener_support.after_variable_changed(
            working_solution,
            &mut sink,
            VariableKey::new(descriptor_index, variable_name),
            EntityReference::new(descriptor_index, entity_index),
        )
    }

    fn trigger_variable_listeners(&mut self) -> Result<()> {
        {
            let Self {
                working_solution,
                constraints,
                listener_support,
                cached_score,
                retracted,
                initialized,
                ..
            } = self;
            let mut sink = RetractSink {
                constraints,
                score: cached_score,
                retracted,
                active: *initialized,
            };
            listener_support.trigger(working_solution, &mut sink)?;
        }
        if self.initialized {
            self.flush();
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.constraints.reset_all();
        self.listener_support
            .reset_working_solution(&mut self.working_solution);
        self.retracted.clear();
        self.cached_score = S::Score::zero();
        self.initialized = false;
    }

    fn calculation_count(&self) -> u64 {
        self.calculation_count
    }

    fn assert_working_score_from_scratch(
        &mut self,
        working_score: S::Score,
        context: &str,
    ) -> Result<()> {
        let uncorrupted = self.constraints.evaluate_all(&self.working_solution);
        if uncorrupted != working_score {
            return Err(SearchForgeError::score_corruption(
                context,
                working_score,
                uncorrupted,
            ));
        }
        Ok(())
    }

    fn assert_shadow_variables_are_not_stale(&mut self, context: &str) -> Result<()> {
        self.listener_support
            .assert_not_stale(&self.working_solution, context)
    }

    fn is_constraint_match_enabled(&self) -> bool {
        self.constraint_match_enabled
    }

    fn constraint_match_totals(&mut self) -> Result<Vec<ConstraintMatchTotal<S::Score>>> {
        if !self.constraint_match_enabled {
            return Err(SearchForgeError::UsageOrder(
                "constraint match totals requested but constraint match tracking is disabled"
                    .to_string(),
            ));
        }
        Ok(self.constraints.match_totals(&self.working_solution))
    }
}

impl<S, C> fmt::Debug for IncrementalScoreDirector<S, C>
where
    S: PlanningSolution,
    C: ConstraintSet<S, S::Score>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncrementalScoreDirector")
            .field("constraint_count", &self.constraints.constraint_count())
            .field("listeners", &self.listener_support)
            .field("initialized", &self.initialized)
            .field("cached_score", &self.cached_score)
            .finish()
    }
}
