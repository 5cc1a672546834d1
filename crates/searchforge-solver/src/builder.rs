//! Builder module for constructing solver components from configuration
//!
//! This module provides the wiring between configuration types and the
//! solver implementation. Move selectors are typed code: configuration can
//! only pick among change and swap selectors over variables the caller
//! describes with [`VariableAccess`].

use std::fmt::{self, Debug};
use std::hash::Hash;

use searchforge_config::{
    AcceptorConfig, AcceptorType, ForagerConfig, MoveSelectorConfig, NearbyDistributionConfig,
    SelectionConfig, TerminationCompositionStyle, TerminationConfig,
};
use searchforge_core::domain::PlanningSolution;
use searchforge_core::{ParseableScore, Result, SearchForgeError};
use tracing::debug;

use crate::heuristic::r#move::{EitherMove, Move};
use crate::heuristic::selector::decorator::{
    CachingSelector, SelectedCountLimitSelector, ShufflingSelector,
};
use crate::heuristic::selector::nearby::NearbyDistribution;
use crate::heuristic::selector::{
    ChangeMoveSelector, IntoMoveSelector, SelectionCacheType, SelectionOrder, Selector,
    SwapMoveSelector, UnionMoveSelector,
};
use crate::phase::localsearch::{
    Acceptor, CompositeAcceptor, FinalistPodiumType, GreatDelugeAcceptor, HillClimbingAcceptor,
    LateAcceptanceAcceptor, LocalSearchForager, PickEarlyType, SimulatedAnnealingAcceptor,
    TabuAcceptor, TabuKind, TabuSize,
};
use crate::termination::{
    AndTermination, BestScoreFeasibleTermination, BestScoreTermination, OrTermination,
    StepCountTermination, Termination, TimeTermination, UnimprovedStepCountTermination,
    UnimprovedTimeTermination,
};

/// Entity tabu ratio used when entity tabu is enabled without a size.
pub const DEFAULT_ENTITY_TABU_RATIO: f64 = 0.1;
pub const DEFAULT_LATE_ACCEPTANCE_SIZE: usize = 400;

fn parse_score<Sc: ParseableScore>(what: &str, text: &str) -> Result<Sc> {
    Sc::parse(text).map_err(|e| {
        SearchForgeError::Config(format!("the {} ({}) is not a valid score: {}", what, text, e))
    })
}

/// Builder for constructing acceptors from configuration.
pub struct AcceptorBuilder;

impl AcceptorBuilder {
    /// Builds every enabled acceptor kind. Several kinds combine into a
    /// [`CompositeAcceptor`] that accepts only what all of them accept.
    pub fn build<S, M>(config: &AcceptorConfig) -> Result<Box<dyn Acceptor<S, M>>>
    where
        S: PlanningSolution,
        S::Score: ParseableScore,
        M: Move<S> + 'static,
    {
        let mut acceptors: Vec<Box<dyn Acceptor<S, M>>> = Vec::new();
        for acceptor_type in config.resolved_types() {
            acceptors.push(Self::build_one(acceptor_type, config)?);
        }
        match acceptors.len() {
            0 => Err(SearchForgeError::Config(
                "the acceptor does not specify any acceptor_types or other acceptor property"
                    .to_string(),
            )),
            1 => Ok(acceptors.remove(0)),
            _ => Ok(Box::new(CompositeAcceptor::new(acceptors))),
        }
    }

    fn build_one<S, M>(
        acceptor_type: AcceptorType,
        config: &AcceptorConfig,
    ) -> Result<Box<dyn Acceptor<S, M>>>
    where
        S: PlanningSolution,
        S::Score: ParseableScore,
        M: Move<S> + 'static,
    {
        debug!(event = "build_acceptor", acceptor_type = ?acceptor_type);
        Ok(match acceptor_type {
            AcceptorType::HillClimbing => Box::new(HillClimbingAcceptor::new()),
            AcceptorType::EntityTabu => {
                let size = exclusive_size(
                    "entity_tabu",
                    config.entity_tabu_size,
                    config.entity_tabu_ratio,
                )?;
                let fading = exclusive_size(
                    "fading_entity_tabu",
                    config.fading_entity_tabu_size,
                    config.fading_entity_tabu_ratio,
                )?;
                let size = match (size, fading) {
                    (Some(size), _) => size,
                    (None, Some(_)) => TabuSize::Fixed(0),
                    (None, None) => TabuSize::EntityRatio(DEFAULT_ENTITY_TABU_RATIO),
                };
                Box::new(tabu(TabuKind::Entity, size, fading)?)
            }
            AcceptorType::ValueTabu => Box::new(fixed_tabu(
                TabuKind::Value,
                config.value_tabu_size,
                config.fading_value_tabu_size,
            )?),
            AcceptorType::MoveTabu => Box::new(fixed_tabu(
                TabuKind::Move,
                config.move_tabu_size,
                config.fading_move_tabu_size,
            )?),
            AcceptorType::UndoMoveTabu => Box::new(fixed_tabu(
                TabuKind::UndoMove,
                config.undo_move_tabu_size,
                config.fading_undo_move_tabu_size,
            )?),
            AcceptorType::SimulatedAnnealing => {
                let text = config
                    .simulated_annealing_starting_temperature
                    .as_deref()
                    .ok_or_else(|| {
                        SearchForgeError::Config(
                            "the simulated_annealing acceptor requires a simulated_annealing_starting_temperature"
                                .to_string(),
                        )
                    })?;
                let temperature: S::Score = parse_score("starting temperature", text)?;
                Box::new(SimulatedAnnealingAcceptor::new(temperature)?)
            }
            AcceptorType::LateAcceptance => Box::new(LateAcceptanceAcceptor::<S::Score>::new(
                config
                    .late_acceptance_size
                    .unwrap_or(DEFAULT_LATE_ACCEPTANCE_SIZE),
            )?),
            AcceptorType::GreatDeluge => {
                let acceptor = match (
                    config.great_deluge_water_level_increment_score.as_deref(),
                    config.great_deluge_water_level_increment_ratio,
                ) {
                    (Some(_), Some(_)) => {
                        return Err(SearchForgeError::Config(
                            "the great deluge acceptor cannot have both an increment score and an increment ratio"
                                .to_string(),
                        ))
                    }
                    (Some(text), None) => GreatDelugeAcceptor::with_increment_score(parse_score::<
                        S::Score,
                    >(
                        "water level increment score",
                        text,
                    )?)?,
                    (None, Some(ratio)) => GreatDelugeAcceptor::with_ratio(ratio)?,
                    (None, None) => GreatDelugeAcceptor::default(),
                };
                Box::new(acceptor)
            }
        })
    }
}

fn exclusive_size(what: &str, size: Option<usize>, ratio: Option<f64>) -> Result<Option<TabuSize>> {
    match (size, ratio) {
        (Some(_), Some(_)) => Err(SearchForgeError::Config(format!(
            "the acceptor cannot have both {}_size and {}_ratio",
            what, what
        ))),
        (Some(size), None) => Ok(Some(TabuSize::Fixed(size))),
        (None, Some(ratio)) => Ok(Some(TabuSize::EntityRatio(ratio))),
        (None, None) => Ok(None),
    }
}

fn tabu(kind: TabuKind, size: TabuSize, fading: Option<TabuSize>) -> Result<TabuAcceptor> {
    let acceptor = TabuAcceptor::new(kind, size)?;
    match fading {
        Some(fading) => acceptor.with_fading_tabu_size(fading),
        None => Ok(acceptor),
    }
}

fn fixed_tabu(kind: TabuKind, size: Option<usize>, fading: Option<usize>) -> Result<TabuAcceptor> {
    if size.is_none() && fading.is_none() {
        return Err(SearchForgeError::Config(format!(
            "the {:?} tabu acceptor requires a tabu size or a fading tabu size",
            kind
        )));
    }
    tabu(
        kind,
        TabuSize::Fixed(size.unwrap_or(0)),
        fading.map(TabuSize::Fixed),
    )
}

/// Builder for constructing foragers from configuration.
pub struct ForagerBuilder;

impl ForagerBuilder {
    pub fn build<S, M>(config: &ForagerConfig) -> LocalSearchForager<S, M>
    where
        S: PlanningSolution,
        M: Move<S>,
    {
        let mut forager = LocalSearchForager::new();
        if let Some(limit) = config.accepted_count_limit {
            forager = forager.with_accepted_count_limit(limit);
        }
        if let Some(pick_early_type) = config.pick_early_type {
            forager = forager.with_pick_early_type(pick_early_type.into());
        }
        if let Some(break_tie_randomly) = config.break_tie_randomly {
            forager = forager.with_break_tie_randomly(break_tie_randomly);
        }
        if let Some(podium_type) = config.finalist_podium_type {
            forager = forager.with_podium_type(podium_type.into());
        }
        forager
    }
}

/// Builder for constructing terminations from configuration.
pub struct TerminationBuilder;

impl TerminationBuilder {
    /// Returns `None` when no limit is configured.
    pub fn build<S>(config: &TerminationConfig) -> Result<Option<Box<dyn Termination<S>>>>
    where
        S: PlanningSolution,
        S::Score: ParseableScore,
    {
        let mut terminations: Vec<Box<dyn Termination<S>>> = Vec::new();
        if let Some(limit) = config.time_limit() {
            terminations.push(Box::new(TimeTermination::new(limit)));
        }
        if let Some(text) = &config.best_score_limit {
            let target: S::Score = parse_score("best_score_limit", text)?;
            terminations.push(Box::new(BestScoreTermination::new(target)));
        }
        if config.best_score_feasible == Some(true) {
            terminations.push(Box::new(BestScoreFeasibleTermination::new()));
        }
        if let Some(limit) = config.step_count_limit {
            terminations.push(Box::new(StepCountTermination::new(limit)));
        }
        if let Some(limit) = config.unimproved_step_count_limit {
            terminations.push(Box::new(UnimprovedStepCountTermination::new(limit)));
        }
        if let Some(limit) = config.unimproved_time_limit() {
            terminations.push(Box::new(UnimprovedTimeTermination::new(limit)));
        }
        Ok(match terminations.len() {
            0 => None,
            1 => terminations.pop(),
            _ => match config.termination_composition_style {
                TerminationCompositionStyle::Or => Some(Box::new(OrTermination::new(terminations))),
                TerminationCompositionStyle::And => {
                    Some(Box::new(AndTermination::new(terminations)))
                }
            },
        })
    }
}

/// Typed access to one genuine planning variable, for configured selectors.
pub struct VariableAccess<S, V> {
    pub entity_class: &'static str,
    pub descriptor_index: usize,
    pub variable_name: &'static str,
    pub getter: fn(&S, usize) -> Option<V>,
    pub setter: fn(&mut S, usize, Option<V>),
    pub values: fn(&S) -> Vec<V>,
}

impl<S, V> Clone for VariableAccess<S, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, V> Copy for VariableAccess<S, V> {}

impl<S, V> Debug for VariableAccess<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableAccess")
            .field("entity_class", &self.entity_class)
            .field("descriptor_index", &self.descriptor_index)
            .field("variable_name", &self.variable_name)
            .finish()
    }
}

type BoxedMoveSelector<S, V> = Box<dyn Selector<S, Item = EitherMove<S, V>>>;

/// Builds change, swap and union move selectors from configuration.
pub struct MoveSelectorBuilder;

impl MoveSelectorBuilder {
    /// Builds the configured selector, or a random union of a change and a
    /// swap selector per variable when nothing is configured.
    pub fn build<S, V>(
        config: Option<&MoveSelectorConfig>,
        variables: &[VariableAccess<S, V>],
    ) -> Result<BoxedMoveSelector<S, V>>
    where
        S: PlanningSolution,
        V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
    {
        match config {
            Some(config) => Self::build_config(config, variables, SelectionOrder::Inherit),
            None => {
                let mut union = UnionMoveSelector::new(true);
                for variable in variables {
                    union.push(Box::new(IntoMoveSelector::<S, _, EitherMove<S, V>>::new(
                        change_selector(variable, true),
                    )));
                    union.push(Box::new(IntoMoveSelector::<S, _, EitherMove<S, V>>::new(
                        swap_selector(variable, true),
                    )));
                }
                Ok(Box::new(union))
            }
        }
    }

    fn build_config<S, V>(
        config: &MoveSelectorConfig,
        variables: &[VariableAccess<S, V>],
        inherited: SelectionOrder,
    ) -> Result<BoxedMoveSelector<S, V>>
    where
        S: PlanningSolution,
        V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
    {
        let selection = config.selection();
        let order = selection
            .selection_order
            .map(SelectionOrder::from)
            .unwrap_or_default()
            .resolve(inherited);
        let cache_type = selection
            .cache_type
            .map(SelectionCacheType::from)
            .unwrap_or_default();
        order.validate_cache_type(cache_type)?;
        // Only a just-in-time random selector draws randomly by itself. Cached
        // orders materialize the original order first.
        let random_child = order == SelectionOrder::Random && !cache_type.is_cached();

        let child: BoxedMoveSelector<S, V> = match config {
            MoveSelectorConfig::ChangeMoveSelector(change) => {
                if change.nearby_selection.is_some() || change.entity_mimic_id.is_some() {
                    return Err(code_only("nearby and mimic selection"));
                }
                let matching = matching_variables(
                    variables,
                    change.entity_class.as_deref(),
                    change.variable_name.as_deref(),
                )?;
                union_of(matching.into_iter().map(|variable| {
                    Box::new(IntoMoveSelector::<S, _, EitherMove<S, V>>::new(change_selector(
                        variable,
                        random_child,
                    ))) as BoxedMoveSelector<S, V>
                }))
            }
            MoveSelectorConfig::SwapMoveSelector(swap) => {
                if swap.nearby_selection.is_some() {
                    return Err(code_only("nearby selection"));
                }
                let matching = matching_variables(
                    variables,
                    swap.entity_class.as_deref(),
                    swap.variable_name.as_deref(),
                )?;
                union_of(matching.into_iter().map(|variable| {
                    Box::new(IntoMoveSelector::<S, _, EitherMove<S, V>>::new(swap_selector(
                        variable,
                        random_child,
                    ))) as BoxedMoveSelector<S, V>
                }))
            }
            MoveSelectorConfig::UnionMoveSelector(union_config) => {
                let child_order = SelectionOrder::from_random_selection(random_child);
                let mut union = UnionMoveSelector::new(random_child);
                for child in &union_config.selectors {
                    union.push(Self::build_config(child, variables, child_order)?);
                }
                Box::new(union)
            }
            MoveSelectorConfig::CartesianProductMoveSelector(_) => {
                return Err(code_only("cartesian product selection"));
            }
        };
        decorate(child, order, cache_type, selection)
    }
}

fn code_only(feature: &str) -> SearchForgeError {
    SearchForgeError::Config(format!(
        "{} cannot be configured declaratively; build the selector in code",
        feature
    ))
}

fn change_selector<S, V>(
    variable: &VariableAccess<S, V>,
    random: bool,
) -> impl Selector<S, Item = crate::heuristic::r#move::ChangeMove<S, V>>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
{
    ChangeMoveSelector::from_solution(
        variable.getter,
        variable.setter,
        variable.descriptor_index,
        variable.variable_name,
        variable.values,
        random,
    )
}

fn swap_selector<S, V>(
    variable: &VariableAccess<S, V>,
    random: bool,
) -> impl Selector<S, Item = crate::heuristic::r#move::SwapMove<S, V>>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
{
    if random {
        SwapMoveSelector::random(
            variable.getter,
            variable.setter,
            variable.descriptor_index,
            variable.variable_name,
        )
    } else {
        SwapMoveSelector::all_pairs(
            variable.getter,
            variable.setter,
            variable.descriptor_index,
            variable.variable_name,
        )
    }
}

fn matching_variables<'v, S, V>(
    variables: &'v [VariableAccess<S, V>],
    entity_class: Option<&str>,
    variable_name: Option<&str>,
) -> Result<Vec<&'v VariableAccess<S, V>>> {
    let matching: Vec<_> = variables
        .iter()
        .filter(|v| entity_class.map_or(true, |class| v.entity_class == class))
        .filter(|v| variable_name.map_or(true, |name| v.variable_name == name))
        .collect();
    if matching.is_empty() {
        return Err(SearchForgeError::Config(format!(
            "no planning variable matches entity_class {:?} and variable_name {:?}",
            entity_class, variable_name
        )));
    }
    Ok(matching)
}

fn union_of<S, V>(mut selectors: impl Iterator<Item = BoxedMoveSelector<S, V>>) -> BoxedMoveSelector<S, V>
where
    S: PlanningSolution,
    V: Clone + PartialEq + Hash + Send + Sync + Debug + 'static,
{
    let first = selectors.next();
    let second = selectors.next();
    match (first, second) {
        (Some(only), None) => only,
        (first, second) => {
            let mut union = UnionMoveSelector::new(false);
            for selector in first.into_iter().chain(second).chain(selectors) {
                union.push(selector);
            }
            Box::new(union)
        }
    }
}

/// Applies the cache, order and count limit of `selection` to `child`.
pub fn decorate<S, T>(
    child: Box<dyn Selector<S, Item = T>>,
    order: SelectionOrder,
    cache_type: SelectionCacheType,
    selection: &SelectionConfig,
) -> Result<Box<dyn Selector<S, Item = T>>>
where
    S: PlanningSolution,
    T: Clone + Send + Debug + 'static,
{
    let ordered: Box<dyn Selector<S, Item = T>> = match order {
        SelectionOrder::Shuffled => Box::new(ShufflingSelector::new(child, cache_type)?),
        SelectionOrder::Sorted | SelectionOrder::Probabilistic => {
            return Err(code_only("sorted and probabilistic selection"));
        }
        SelectionOrder::Original | SelectionOrder::Random if cache_type.is_cached() => Box::new(
            CachingSelector::new(child, cache_type, order == SelectionOrder::Random)?,
        ),
        _ => child,
    };
    Ok(match selection.selected_count_limit {
        Some(limit) => Box::new(SelectedCountLimitSelector::new(ordered, limit)),
        None => ordered,
    })
}

impl From<searchforge_config::SelectionOrder> for SelectionOrder {
    fn from(order: searchforge_config::SelectionOrder) -> Self {
        use searchforge_config::SelectionOrder as Config;
        match order {
            Config::Inherit => SelectionOrder::Inherit,
            Config::Original => SelectionOrder::Original,
            Config::Random => SelectionOrder::Random,
            Config::Shuffled => SelectionOrder::Shuffled,
            Config::Sorted => SelectionOrder::Sorted,
            Config::Probabilistic => SelectionOrder::Probabilistic,
        }
    }
}

impl From<searchforge_config::SelectionCacheType> for SelectionCacheType {
    fn from(cache_type: searchforge_config::SelectionCacheType) -> Self {
        use searchforge_config::SelectionCacheType as Config;
        match cache_type {
            Config::JustInTime => SelectionCacheType::JustInTime,
            Config::Step => SelectionCacheType::Step,
            Config::Phase => SelectionCacheType::Phase,
            Config::Solver => SelectionCacheType::Solver,
        }
    }
}

impl From<searchforge_config::PickEarlyType> for PickEarlyType {
    fn from(pick_early_type: searchforge_config::PickEarlyType) -> Self {
        use searchforge_config::PickEarlyType as Config;
        match pick_early_type {
            Config::Never => PickEarlyType::Never,
            Config::FirstBestScoreImproving => PickEarlyType::FirstBestScoreImproving,
            Config::FirstLastStepScoreImproving => PickEarlyType::FirstLastStepScoreImproving,
        }
    }
}

impl From<searchforge_config::FinalistPodiumType> for FinalistPodiumType {
    fn from(podium_type: searchforge_config::FinalistPodiumType) -> Self {
        use searchforge_config::FinalistPodiumType as Config;
        match podium_type {
            Config::HighestScore => FinalistPodiumType::HighestScore,
            Config::StrategicOscillation | Config::StrategicOscillationByLevel => {
                FinalistPodiumType::StrategicOscillationByLevel {
                    on_best_score: false,
                }
            }
            Config::StrategicOscillationByLevelOnBestScore => {
                FinalistPodiumType::StrategicOscillationByLevel {
                    on_best_score: true,
                }
            }
        }
    }
}

impl From<NearbyDistributionConfig> for NearbyDistribution {
    fn from(config: NearbyDistributionConfig) -> Self {
        match config {
            NearbyDistributionConfig::Block {
                size_minimum,
                size_maximum,
                size_ratio,
                uniform_distribution_probability,
            } => NearbyDistribution::Block {
                size_minimum: size_minimum.unwrap_or(1),
                size_maximum: size_maximum.unwrap_or(usize::MAX),
                size_ratio: size_ratio.unwrap_or(1.0),
                uniform_distribution_probability: uniform_distribution_probability.unwrap_or(0.0),
            },
            NearbyDistributionConfig::Linear { size_maximum } => NearbyDistribution::Linear {
                size_maximum: size_maximum.unwrap_or(usize::MAX),
            },
            NearbyDistributionConfig::Parabolic { size_maximum } => NearbyDistribution::Parabolic {
                size_maximum: size_maximum.unwrap_or(usize::MAX),
            },
            NearbyDistributionConfig::Beta { alpha, beta } => NearbyDistribution::Beta {
                alpha: alpha.unwrap_or(1.0),
                beta: beta.unwrap_or(5.0),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use searchforge_config::{
        ChangeMoveSelectorConfig, LocalSearchConfig, LocalSearchType, SwapMoveSelectorConfig,
        UnionMoveSelectorConfig,
    };
    use searchforge_core::{HardSoftScore, SimpleScore};
    use searchforge_scoring::SimpleScoreDirector;
    use searchforge_test::pair::{self, PairSolution};
    use searchforge_test::task::TaskSolution;

    use super::*;
    use crate::heuristic::r#move::ChangeMove;
    use crate::termination::Progress;

    type PairMove = EitherMove<PairSolution, i64>;

    fn pair_variable() -> VariableAccess<PairSolution, i64> {
        VariableAccess {
            entity_class: "Item",
            descriptor_index: 0,
            variable_name: "value",
            getter: pair::get_value,
            setter: pair::set_value,
            values: pair::value_range,
        }
    }

    fn pair_director() -> SimpleScoreDirector<PairSolution, fn(&PairSolution) -> SimpleScore> {
        SimpleScoreDirector::new(
            PairSolution::with_values(&[1, 2]),
            pair::create_pair_descriptor(),
            pair::calculate_conflicts as fn(&PairSolution) -> SimpleScore,
        )
    }

    #[test]
    fn test_single_acceptor_types() {
        let late: Box<dyn Acceptor<PairSolution, PairMove>> =
            AcceptorBuilder::build(&LocalSearchConfig::default().resolved_acceptor()).unwrap();
        assert!(format!("{:?}", late).contains("late_acceptance_size: 400"));

        let hill_climbing = LocalSearchConfig {
            local_search_type: Some(LocalSearchType::HillClimbing),
            ..LocalSearchConfig::default()
        };
        let hill: Box<dyn Acceptor<PairSolution, PairMove>> =
            AcceptorBuilder::build(&hill_climbing.resolved_acceptor()).unwrap();
        assert!(format!("{:?}", hill).contains("HillClimbing"));

        let tabu_search = LocalSearchConfig {
            local_search_type: Some(LocalSearchType::TabuSearch),
            ..LocalSearchConfig::default()
        };
        let tabu: Box<dyn Acceptor<PairSolution, PairMove>> =
            AcceptorBuilder::build(&tabu_search.resolved_acceptor()).unwrap();
        let debug = format!("{:?}", tabu);
        assert!(debug.contains("Entity"));
        assert!(debug.contains("EntityRatio(0.1)"));
    }

    #[test]
    fn test_composite_acceptor() {
        let config = AcceptorConfig {
            entity_tabu_size: Some(5),
            late_acceptance_size: Some(10),
            ..AcceptorConfig::default()
        };
        let acceptor: Box<dyn Acceptor<PairSolution, PairMove>> =
            AcceptorBuilder::build(&config).unwrap();
        let debug = format!("{:?}", acceptor);
        assert!(debug.starts_with('['));
        assert!(debug.contains("TabuAcceptor"));
        assert!(debug.contains("LateAcceptanceAcceptor"));
    }

    #[test]
    fn test_scores_parse_with_the_solution_score_type() {
        let config = AcceptorConfig {
            simulated_annealing_starting_temperature: Some("0hard/400soft".to_string()),
            ..AcceptorConfig::default()
        };
        let built = AcceptorBuilder::build::<TaskSolution, ChangeMove<TaskSolution, i64>>(&config);
        assert!(built.is_ok());

        let bad = AcceptorConfig {
            simulated_annealing_starting_temperature: Some("warm".to_string()),
            ..AcceptorConfig::default()
        };
        let err = AcceptorBuilder::build::<TaskSolution, ChangeMove<TaskSolution, i64>>(&bad)
            .unwrap_err();
        assert!(matches!(err, SearchForgeError::Config(_)));
    }

    #[test]
    fn test_value_tabu_needs_a_size() {
        let config = AcceptorConfig {
            acceptor_types: vec![AcceptorType::ValueTabu],
            ..AcceptorConfig::default()
        };
        assert!(AcceptorBuilder::build::<PairSolution, PairMove>(&config).is_err());
    }

    #[test]
    fn test_forager_from_config() {
        let config = ForagerConfig {
            accepted_count_limit: Some(3),
            finalist_podium_type: Some(
                searchforge_config::FinalistPodiumType::StrategicOscillationByLevelOnBestScore,
            ),
            ..ForagerConfig::default()
        };
        let forager: LocalSearchForager<PairSolution, PairMove> = ForagerBuilder::build(&config);
        assert_eq!(forager.accepted_count_limit(), Some(3));
        assert!(format!("{:?}", forager).contains("on_best_score: true"));
    }

    #[test]
    fn test_termination_from_config() {
        let none = TerminationBuilder::build::<TaskSolution>(&TerminationConfig::default()).unwrap();
        assert!(none.is_none());

        let config = TerminationConfig {
            step_count_limit: Some(10),
            best_score_limit: Some("0hard/-5soft".to_string()),
            ..TerminationConfig::default()
        };
        let termination = TerminationBuilder::build::<TaskSolution>(&config)
            .unwrap()
            .unwrap();
        let mut progress = Progress::default();
        progress.step_count = 3;
        progress.best_score = Some(HardSoftScore::of(-1, 0));
        assert!(!termination.is_terminated(&progress));
        progress.best_score = Some(HardSoftScore::of(0, -5));
        assert!(termination.is_terminated(&progress));

        let and = TerminationConfig {
            termination_composition_style: TerminationCompositionStyle::And,
            ..config
        };
        let termination = TerminationBuilder::build::<TaskSolution>(&and).unwrap().unwrap();
        assert!(!termination.is_terminated(&progress));
        progress.step_count = 10;
        assert!(termination.is_terminated(&progress));
    }

    #[test]
    fn test_bad_best_score_limit() {
        let config = TerminationConfig {
            best_score_limit: Some("lots".to_string()),
            ..TerminationConfig::default()
        };
        assert!(TerminationBuilder::build::<TaskSolution>(&config).is_err());
    }

    #[test]
    fn test_default_move_selector_never_ends() {
        let selector = MoveSelectorBuilder::build(None, &[pair_variable()]).unwrap();
        assert!(selector.is_never_ending());
    }

    #[test]
    fn test_configured_original_union() {
        let original = SelectionConfig {
            selection_order: Some(searchforge_config::SelectionOrder::Original),
            ..SelectionConfig::default()
        };
        let config = MoveSelectorConfig::UnionMoveSelector(UnionMoveSelectorConfig {
            selectors: vec![
                MoveSelectorConfig::ChangeMoveSelector(ChangeMoveSelectorConfig::default()),
                MoveSelectorConfig::SwapMoveSelector(SwapMoveSelectorConfig::default()),
            ],
            selection: original,
        });
        let selector = MoveSelectorBuilder::build(Some(&config), &[pair_variable()]).unwrap();
        assert!(!selector.is_never_ending());
        // 2 entities x 3 values of change moves, 1 swap pair.
        assert_eq!(selector.size(&pair_director()), Some(7));
    }

    #[test]
    fn test_unknown_variable_is_a_config_error() {
        let config = MoveSelectorConfig::ChangeMoveSelector(ChangeMoveSelectorConfig {
            variable_name: Some("colour".to_string()),
            ..ChangeMoveSelectorConfig::default()
        });
        let err = MoveSelectorBuilder::build(Some(&config), &[pair_variable()]).unwrap_err();
        assert!(matches!(err, SearchForgeError::Config(_)));
    }

    #[test]
    fn test_selected_count_limit_is_applied() {
        let config = MoveSelectorConfig::ChangeMoveSelector(ChangeMoveSelectorConfig {
            selection: SelectionConfig {
                selection_order: Some(searchforge_config::SelectionOrder::Original),
                selected_count_limit: Some(4),
                ..SelectionConfig::default()
            },
            ..ChangeMoveSelectorConfig::default()
        });
        let selector = MoveSelectorBuilder::build(Some(&config), &[pair_variable()]).unwrap();
        assert_eq!(selector.size(&pair_director()), Some(4));
    }

    #[test]
    fn test_nearby_distribution_defaults() {
        let beta: NearbyDistribution = NearbyDistributionConfig::default().into();
        assert_eq!(beta, NearbyDistribution::default());
        let linear: NearbyDistribution = NearbyDistributionConfig::Linear {
            size_maximum: Some(40),
        }
        .into();
        assert_eq!(linear, NearbyDistribution::Linear { size_maximum: 40 });
    }
}
