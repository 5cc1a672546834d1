//! Termination configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{invalid, ConfigError};

/// How several configured limits combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationCompositionStyle {
    /// Stop as soon as any limit is reached.
    #[default]
    Or,
    /// Stop once every limit is reached.
    And,
}

/// Termination configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TerminationConfig {
    /// Maximum milliseconds to spend solving.
    pub millis_spent_limit: Option<u64>,

    /// Maximum seconds to spend solving.
    pub seconds_spent_limit: Option<u64>,

    /// Maximum minutes to spend solving.
    pub minutes_spent_limit: Option<u64>,

    /// Target best score to achieve (as string, e.g., "0hard/0soft").
    pub best_score_limit: Option<String>,

    /// Stop once the best score is feasible.
    pub best_score_feasible: Option<bool>,

    /// Maximum number of steps.
    pub step_count_limit: Option<u64>,

    /// Maximum unimproved steps before terminating.
    pub unimproved_step_count_limit: Option<u64>,

    /// Maximum seconds without improvement.
    pub unimproved_seconds_spent_limit: Option<u64>,

    #[serde(default)]
    pub termination_composition_style: TerminationCompositionStyle,
}

impl TerminationConfig {
    /// Returns the time limit as a Duration, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        let millis = self.millis_spent_limit.unwrap_or(0)
            + self.seconds_spent_limit.unwrap_or(0) * 1_000
            + self.minutes_spent_limit.unwrap_or(0) * 60_000;
        if millis > 0 {
            Some(Duration::from_millis(millis))
        } else {
            None
        }
    }

    /// Returns the unimproved time limit as a Duration, if any.
    pub fn unimproved_time_limit(&self) -> Option<Duration> {
        self.unimproved_seconds_spent_limit.map(Duration::from_secs)
    }

    /// Returns true if no limit is configured.
    pub fn is_empty(&self) -> bool {
        self.time_limit().is_none()
            && self.best_score_limit.is_none()
            && self.best_score_feasible != Some(true)
            && self.step_count_limit.is_none()
            && self.unimproved_step_count_limit.is_none()
            && self.unimproved_time_limit().is_none()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(limit) = &self.best_score_limit {
            if limit.trim().is_empty() {
                return invalid("best_score_limit cannot be empty".into());
            }
        }
        if self.unimproved_step_count_limit == Some(0) {
            return invalid("unimproved_step_count_limit must be positive".into());
        }
        Ok(())
    }
}
