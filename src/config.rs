//! Engine configuration.

use crate::interpretation::{TrendAnalyzer, DEFAULT_EPSILON, DEFAULT_WINDOW};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// What to do when an examination is completed while tests are still open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Refuse completion while any test is PENDING or IN_PROGRESS.
    #[default]
    RequireResolvedTests,
    /// Complete regardless; open tests stay as they are.
    AllowOutstanding,
}

/// Tunables for the workflow coordinator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub completion_policy: CompletionPolicy,
    /// How many earlier results accompany a trend.
    pub trend_window: usize,
    /// Changes smaller than this are reported as stable.
    pub trend_epsilon: f64,
    /// Check the caller's role before every operation.
    pub enforce_roles: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            completion_policy: CompletionPolicy::default(),
            trend_window: DEFAULT_WINDOW,
            trend_epsilon: DEFAULT_EPSILON,
            enforce_roles: true,
        }
    }
}

impl WorkflowConfig {
    /// Load from JSON; absent keys take their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trend_window == 0 {
            return Err(ConfigError::Invalid(
                "trend_window must be at least 1".to_string(),
            ));
        }
        if !self.trend_epsilon.is_finite() || self.trend_epsilon <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "trend_epsilon must be a positive number, got {}",
                self.trend_epsilon
            )));
        }
        Ok(())
    }

    pub fn trend_analyzer(&self) -> TrendAnalyzer {
        TrendAnalyzer::new(self.trend_window, self.trend_epsilon)
    }
}
