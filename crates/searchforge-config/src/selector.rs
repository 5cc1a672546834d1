//! Move selector configuration.
//!
//! These settings describe a selector tree. Selectors themselves stay typed
//! code: the application maps each leaf to its getters and setters, and the
//! solver applies the generic settings (cache type, selection order, count
//! limit) as decorators.

use serde::{Deserialize, Serialize};

use crate::{invalid, ConfigError};

/// Order in which a selector yields its items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOrder {
    #[default]
    Inherit,
    Original,
    Random,
    Shuffled,
    Sorted,
    Probabilistic,
}

impl SelectionOrder {
    pub fn requires_caching(self) -> bool {
        matches!(
            self,
            SelectionOrder::Shuffled | SelectionOrder::Sorted | SelectionOrder::Probabilistic
        )
    }
}

/// Lifetime of a selector cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionCacheType {
    #[default]
    JustInTime,
    Step,
    Phase,
    Solver,
}

/// Settings every selector accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SelectionConfig {
    pub selection_order: Option<SelectionOrder>,
    pub cache_type: Option<SelectionCacheType>,
    /// Stops every pass after this many selected items.
    pub selected_count_limit: Option<u64>,
}

impl SelectionConfig {
    fn validate(&self, owner: &str) -> Result<(), ConfigError> {
        let order = self.selection_order.unwrap_or_default();
        let cache_type = self.cache_type.unwrap_or_default();
        if order.requires_caching() && cache_type == SelectionCacheType::JustInTime {
            return invalid(format!(
                "the {} has selection_order {:?}, which requires a cache_type other than {:?}",
                owner, order, cache_type
            ));
        }
        if self.selected_count_limit == Some(0) {
            return invalid(format!("the {} has a selected_count_limit of 0", owner));
        }
        Ok(())
    }
}

/// Move selector configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoveSelectorConfig {
    ChangeMoveSelector(ChangeMoveSelectorConfig),
    SwapMoveSelector(SwapMoveSelectorConfig),
    UnionMoveSelector(UnionMoveSelectorConfig),
    CartesianProductMoveSelector(CartesianProductMoveSelectorConfig),
}

impl MoveSelectorConfig {
    pub fn selection(&self) -> &SelectionConfig {
        match self {
            MoveSelectorConfig::ChangeMoveSelector(config) => &config.selection,
            MoveSelectorConfig::SwapMoveSelector(config) => &config.selection,
            MoveSelectorConfig::UnionMoveSelector(config) => &config.selection,
            MoveSelectorConfig::CartesianProductMoveSelector(config) => &config.selection,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            MoveSelectorConfig::ChangeMoveSelector(_) => "change_move_selector",
            MoveSelectorConfig::SwapMoveSelector(_) => "swap_move_selector",
            MoveSelectorConfig::UnionMoveSelector(_) => "union_move_selector",
            MoveSelectorConfig::CartesianProductMoveSelector(_) => {
                "cartesian_product_move_selector"
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.selection().validate(self.name())?;
        match self {
            MoveSelectorConfig::ChangeMoveSelector(config) => {
                if let Some(nearby) = &config.nearby_selection {
                    nearby.validate(self.name(), config.selection.selection_order)?;
                }
            }
            MoveSelectorConfig::SwapMoveSelector(config) => {
                if let Some(nearby) = &config.nearby_selection {
                    nearby.validate(self.name(), config.selection.selection_order)?;
                }
            }
            MoveSelectorConfig::UnionMoveSelector(UnionMoveSelectorConfig { selectors, .. })
            | MoveSelectorConfig::CartesianProductMoveSelector(
                CartesianProductMoveSelectorConfig { selectors, .. },
            ) => {
                if selectors.is_empty() {
                    return invalid(format!("the {} has no child selectors", self.name()));
                }
                for child in selectors {
                    child.validate()?;
                }
            }
        }
        Ok(())
    }
}

/// Change move selector configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ChangeMoveSelectorConfig {
    /// Entity type filter.
    pub entity_class: Option<String>,
    pub variable_name: Option<String>,
    /// Mimic id to record the selected entity under.
    pub entity_mimic_id: Option<String>,
    pub nearby_selection: Option<NearbySelectionConfig>,
    #[serde(flatten)]
    pub selection: SelectionConfig,
}

/// Swap move selector configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SwapMoveSelectorConfig {
    /// Entity type filter.
    pub entity_class: Option<String>,
    pub variable_name: Option<String>,
    pub nearby_selection: Option<NearbySelectionConfig>,
    #[serde(flatten)]
    pub selection: SelectionConfig,
}

/// Union move selector configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct UnionMoveSelectorConfig {
    /// Child selectors.
    pub selectors: Vec<MoveSelectorConfig>,
    #[serde(flatten)]
    pub selection: SelectionConfig,
}

/// Cartesian product move selector configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CartesianProductMoveSelectorConfig {
    /// Child selectors.
    pub selectors: Vec<MoveSelectorConfig>,
    #[serde(default)]
    pub ignore_empty_child_iterators: bool,
    #[serde(flatten)]
    pub selection: SelectionConfig,
}

/// Nearby selection: bias random choices toward elements close to an origin.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct NearbySelectionConfig {
    /// Mimic id of the selector that chooses the origin.
    pub origin_mimic_id: Option<String>,
    #[serde(default)]
    pub distribution: NearbyDistributionConfig,
}

impl NearbySelectionConfig {
    fn validate(&self, owner: &str, order: Option<SelectionOrder>) -> Result<(), ConfigError> {
        match order.unwrap_or_default() {
            SelectionOrder::Inherit | SelectionOrder::Original | SelectionOrder::Random => {}
            other => {
                return invalid(format!(
                    "the {} with nearby selection has selection_order {:?}; only original or random are supported",
                    owner, other
                ));
            }
        }
        if self.origin_mimic_id.as_deref().is_some_and(str::is_empty) {
            return invalid(format!("the {} has an empty origin_mimic_id", owner));
        }
        self.distribution.validate()
    }
}

/// Rank distribution of nearby selection.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NearbyDistributionConfig {
    Block {
        size_minimum: Option<usize>,
        size_maximum: Option<usize>,
        size_ratio: Option<f64>,
        uniform_distribution_probability: Option<f64>,
    },
    Linear {
        size_maximum: Option<usize>,
    },
    Parabolic {
        size_maximum: Option<usize>,
    },
    Beta {
        alpha: Option<f64>,
        beta: Option<f64>,
    },
}

impl Default for NearbyDistributionConfig {
    fn default() -> Self {
        NearbyDistributionConfig::Beta {
            alpha: None,
            beta: None,
        }
    }
}

impl NearbyDistributionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            NearbyDistributionConfig::Block {
                size_minimum,
                size_maximum,
                size_ratio,
                uniform_distribution_probability,
            } => {
                let minimum = size_minimum.unwrap_or(1);
                if minimum < 1 {
                    return invalid(format!(
                        "the block distribution size_minimum ({}) must be at least 1",
                        minimum
                    ));
                }
                if let Some(maximum) = size_maximum {
                    if maximum < minimum {
                        return invalid(format!(
                            "the block distribution size_maximum ({}) is below its size_minimum ({})",
                            maximum, minimum
                        ));
                    }
                }
                for (name, value) in [
                    ("size_ratio", size_ratio),
                    ("uniform_distribution_probability", uniform_distribution_probability),
                ] {
                    if let Some(value) = value {
                        if !(0.0..=1.0).contains(&value) {
                            return invalid(format!(
                                "the block distribution {} ({}) must be in [0, 1]",
                                name, value
                            ));
                        }
                    }
                }
            }
            NearbyDistributionConfig::Linear { size_maximum }
            | NearbyDistributionConfig::Parabolic { size_maximum } => {
                if size_maximum == Some(0) {
                    return invalid("the distribution size_maximum must be at least 1".into());
                }
            }
            NearbyDistributionConfig::Beta { alpha, beta } => {
                for (name, value) in [("alpha", alpha), ("beta", beta)] {
                    if let Some(value) = value {
                        if value.is_nan() || value <= 0.0 {
                            return invalid(format!(
                                "the beta distribution {} ({}) must be positive",
                                name, value
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
