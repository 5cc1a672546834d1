//! Local search phase configuration: acceptor, forager and move selector.

use serde::{Deserialize, Serialize};

use crate::selector::MoveSelectorConfig;
use crate::termination::TerminationConfig;
use crate::{invalid, ConfigError};

/// Preset combinations of acceptor and forager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalSearchType {
    HillClimbing,
    TabuSearch,
    SimulatedAnnealing,
    #[default]
    LateAcceptance,
    GreatDeluge,
    VariableNeighborhoodDescent,
}

/// Local search configuration.
///
/// Either pick a `local_search_type` preset or configure the `acceptor` and
/// `forager` explicitly; a preset cannot be combined with either.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LocalSearchConfig {
    pub local_search_type: Option<LocalSearchType>,

    /// Acceptor configuration.
    pub acceptor: Option<AcceptorConfig>,

    /// Forager configuration.
    pub forager: Option<ForagerConfig>,

    /// Move selector configuration.
    pub move_selector: Option<MoveSelectorConfig>,

    /// Phase termination configuration.
    pub termination: Option<TerminationConfig>,
}

impl LocalSearchConfig {
    /// The acceptor to build: the explicit one, or the preset's.
    pub fn resolved_acceptor(&self) -> AcceptorConfig {
        if let Some(acceptor) = &self.acceptor {
            return acceptor.clone();
        }
        let acceptor_type = match self.local_search_type.unwrap_or_default() {
            LocalSearchType::HillClimbing | LocalSearchType::VariableNeighborhoodDescent => {
                AcceptorType::HillClimbing
            }
            LocalSearchType::TabuSearch => AcceptorType::EntityTabu,
            LocalSearchType::SimulatedAnnealing => AcceptorType::SimulatedAnnealing,
            LocalSearchType::LateAcceptance => AcceptorType::LateAcceptance,
            LocalSearchType::GreatDeluge => AcceptorType::GreatDeluge,
        };
        AcceptorConfig {
            acceptor_types: vec![acceptor_type],
            ..AcceptorConfig::default()
        }
    }

    /// The forager to build: the explicit one, or the preset's.
    ///
    /// Slow stepping algorithms (tabu search) evaluate up to 1000 accepted
    /// moves per step, fast stepping ones take the first accepted move.
    pub fn resolved_forager(&self) -> ForagerConfig {
        if let Some(forager) = &self.forager {
            return forager.clone();
        }
        match self.local_search_type.unwrap_or_default() {
            LocalSearchType::TabuSearch => ForagerConfig {
                accepted_count_limit: Some(1000),
                ..ForagerConfig::default()
            },
            LocalSearchType::VariableNeighborhoodDescent => ForagerConfig {
                pick_early_type: Some(PickEarlyType::FirstLastStepScoreImproving),
                ..ForagerConfig::default()
            },
            LocalSearchType::HillClimbing
            | LocalSearchType::SimulatedAnnealing
            | LocalSearchType::LateAcceptance
            | LocalSearchType::GreatDeluge => ForagerConfig {
                accepted_count_limit: Some(1),
                ..ForagerConfig::default()
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(local_search_type) = self.local_search_type {
            if self.acceptor.is_some() || self.forager.is_some() {
                return invalid(format!(
                    "the local_search_type ({:?}) must not be configured together with an explicit acceptor or forager",
                    local_search_type
                ));
            }
        }
        self.resolved_acceptor().validate()?;
        self.resolved_forager().validate()?;
        if let Some(move_selector) = &self.move_selector {
            move_selector.validate()?;
        }
        if let Some(termination) = &self.termination {
            termination.validate()?;
        }
        Ok(())
    }
}

/// Kinds of acceptor. Several kinds combine into a composite acceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptorType {
    HillClimbing,
    EntityTabu,
    ValueTabu,
    MoveTabu,
    UndoMoveTabu,
    SimulatedAnnealing,
    LateAcceptance,
    GreatDeluge,
}

/// Acceptor configuration.
///
/// Setting a parameter of an acceptor kind enables that kind even when it is
/// missing from `acceptor_types`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AcceptorConfig {
    #[serde(default)]
    pub acceptor_types: Vec<AcceptorType>,

    pub entity_tabu_size: Option<usize>,
    pub entity_tabu_ratio: Option<f64>,
    pub fading_entity_tabu_size: Option<usize>,
    pub fading_entity_tabu_ratio: Option<f64>,

    pub value_tabu_size: Option<usize>,
    pub fading_value_tabu_size: Option<usize>,

    pub move_tabu_size: Option<usize>,
    pub fading_move_tabu_size: Option<usize>,

    pub undo_move_tabu_size: Option<usize>,
    pub fading_undo_move_tabu_size: Option<usize>,

    /// Per-level starting temperature, parsed with the solution's score type
    /// (e.g. "2hard/100soft").
    pub simulated_annealing_starting_temperature: Option<String>,

    pub late_acceptance_size: Option<usize>,

    /// Fixed rise of the water level, parsed with the solution's score type.
    pub great_deluge_water_level_increment_score: Option<String>,
    /// Rise of the water level as a ratio of the level itself.
    pub great_deluge_water_level_increment_ratio: Option<f64>,
}

impl AcceptorConfig {
    fn has(&self, acceptor_type: AcceptorType) -> bool {
        self.acceptor_types.contains(&acceptor_type)
    }

    /// Enabled acceptor kinds, in build order, each listed once.
    pub fn resolved_types(&self) -> Vec<AcceptorType> {
        let candidates = [
            (AcceptorType::HillClimbing, false),
            (
                AcceptorType::EntityTabu,
                self.entity_tabu_size.is_some()
                    || self.entity_tabu_ratio.is_some()
                    || self.fading_entity_tabu_size.is_some()
                    || self.fading_entity_tabu_ratio.is_some(),
            ),
            (
                AcceptorType::ValueTabu,
                self.value_tabu_size.is_some() || self.fading_value_tabu_size.is_some(),
            ),
            (
                AcceptorType::MoveTabu,
                self.move_tabu_size.is_some() || self.fading_move_tabu_size.is_some(),
            ),
            (
                AcceptorType::UndoMoveTabu,
                self.undo_move_tabu_size.is_some() || self.fading_undo_move_tabu_size.is_some(),
            ),
            (
                AcceptorType::SimulatedAnnealing,
                self.simulated_annealing_starting_temperature.is_some(),
            ),
            (AcceptorType::LateAcceptance, self.late_acceptance_size.is_some()),
            (
                AcceptorType::GreatDeluge,
                self.great_deluge_water_level_increment_score.is_some()
                    || self.great_deluge_water_level_increment_ratio.is_some(),
            ),
        ];
        candidates
            .into_iter()
            .filter(|&(acceptor_type, implied)| implied || self.has(acceptor_type))
            .map(|(acceptor_type, _)| acceptor_type)
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let types = self.resolved_types();
        if types.is_empty() {
            return invalid(
                "the acceptor does not specify any acceptor_types or other acceptor property".into(),
            );
        }
        exclusive(
            "entity_tabu_size",
            self.entity_tabu_size,
            "entity_tabu_ratio",
            self.entity_tabu_ratio,
        )?;
        exclusive(
            "fading_entity_tabu_size",
            self.fading_entity_tabu_size,
            "fading_entity_tabu_ratio",
            self.fading_entity_tabu_ratio,
        )?;
        for (name, ratio) in [
            ("entity_tabu_ratio", self.entity_tabu_ratio),
            ("fading_entity_tabu_ratio", self.fading_entity_tabu_ratio),
        ] {
            if let Some(ratio) = ratio {
                if ratio.is_nan() || ratio <= 0.0 || ratio >= 1.0 {
                    return invalid(format!(
                        "the {} ({}) must be between 0.0 and 1.0 exclusive",
                        name, ratio
                    ));
                }
            }
        }
        for (acceptor_type, size, fading_size) in [
            (AcceptorType::ValueTabu, self.value_tabu_size, self.fading_value_tabu_size),
            (AcceptorType::MoveTabu, self.move_tabu_size, self.fading_move_tabu_size),
            (
                AcceptorType::UndoMoveTabu,
                self.undo_move_tabu_size,
                self.fading_undo_move_tabu_size,
            ),
        ] {
            if types.contains(&acceptor_type) && size.is_none() && fading_size.is_none() {
                return invalid(format!(
                    "the acceptor type {:?} requires a tabu size or a fading tabu size",
                    acceptor_type
                ));
            }
        }
        if types.contains(&AcceptorType::SimulatedAnnealing)
            && self.simulated_annealing_starting_temperature.is_none()
        {
            return invalid(
                "the simulated_annealing acceptor requires a simulated_annealing_starting_temperature"
                    .into(),
            );
        }
        if self.late_acceptance_size == Some(0) {
            return invalid("late_acceptance_size must be positive".into());
        }
        exclusive(
            "great_deluge_water_level_increment_score",
            self.great_deluge_water_level_increment_score.as_deref(),
            "great_deluge_water_level_increment_ratio",
            self.great_deluge_water_level_increment_ratio,
        )?;
        if let Some(ratio) = self.great_deluge_water_level_increment_ratio {
            if ratio.is_nan() || ratio <= 0.0 {
                return invalid(format!(
                    "great_deluge_water_level_increment_ratio ({}) must be positive because the water level should increase",
                    ratio
                ));
            }
        }
        Ok(())
    }
}

fn exclusive<A: std::fmt::Debug, B: std::fmt::Debug>(
    a_name: &str,
    a: Option<A>,
    b_name: &str,
    b: Option<B>,
) -> Result<(), ConfigError> {
    if let (Some(a), Some(b)) = (&a, &b) {
        return invalid(format!(
            "the acceptor cannot have both {} ({:?}) and {} ({:?})",
            a_name, a, b_name, b
        ));
    }
    Ok(())
}

/// Forager configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ForagerConfig {
    /// Maximum number of accepted moves evaluated per step.
    pub accepted_count_limit: Option<usize>,

    /// Whether to pick early if an improving move is found.
    pub pick_early_type: Option<PickEarlyType>,

    /// Break ties between equally scored moves with the random source.
    pub break_tie_randomly: Option<bool>,

    pub finalist_podium_type: Option<FinalistPodiumType>,
}

impl ForagerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.accepted_count_limit == Some(0) {
            return invalid("accepted_count_limit must be positive".into());
        }
        Ok(())
    }
}

/// Pick early type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickEarlyType {
    /// Never pick early.
    #[default]
    Never,

    /// Pick the first move that improves the best score.
    FirstBestScoreImproving,

    /// Pick the first move that improves the last step score.
    FirstLastStepScoreImproving,
}

/// How the forager ranks the accepted moves of a step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalistPodiumType {
    #[default]
    HighestScore,
    /// Same as `StrategicOscillationByLevel`.
    StrategicOscillation,
    /// Prefers moves that improve a score level over the last step score.
    StrategicOscillationByLevel,
    /// Prefers moves that improve a score level over the best score.
    StrategicOscillationByLevelOnBestScore,
}
