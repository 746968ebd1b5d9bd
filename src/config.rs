// 9.0 config.rs: pipeline settings in one place.
// 9.1 AggregationParams: what gets averaged and how counterparty totals are summed.
// 9.2 ParallelParams: when to fan out over rayon and how wide.

use crate::summation::Summation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationParams {
    // average raw samples per trade/counterparty before applying curves
    pub average_exposures_first: bool,
    // running sum used for counterparty totals
    pub summation: Summation,
}

impl Default for AggregationParams {
    fn default() -> Self {
        Self {
            average_exposures_first: true,
            summation: Summation::Float,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelParams {
    pub enabled: bool,
    // below this many items the sequential fold is used
    pub parallel_threshold: usize,
    // None = rayon's global pool
    pub max_threads: Option<usize>,
}

impl Default for ParallelParams {
    fn default() -> Self {
        Self {
            enabled: true,
            parallel_threshold: 1_000,
            max_threads: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvaConfig {
    pub aggregation: AggregationParams,
    pub parallel: ParallelParams,
}

impl CvaConfig {
    // single threaded, float sums. easiest to step through
    pub fn development() -> Self {
        let mut config = Self::default();
        config.parallel.enabled = false;
        config
    }

    pub fn production() -> Self {
        let mut config = Self::default();
        config.parallel.parallel_threshold = 10_000;
        config
    }

    // totals must not move when the worker split changes
    pub fn audit() -> Self {
        let mut config = Self::default();
        config.aggregation.summation = Summation::Decimal;
        config
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Malformed {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallel.enabled && self.parallel.parallel_threshold == 0 {
            return Err(ConfigError::InvalidParallel {
                reason: "parallel threshold must be at least 1".to_string(),
            });
        }

        if self.parallel.max_threads == Some(0) {
            return Err(ConfigError::InvalidParallel {
                reason: "max threads must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    pub fn use_parallel(&self, items: usize) -> bool {
        self.parallel.enabled && items >= self.parallel.parallel_threshold
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid parallel settings: {reason}")]
    InvalidParallel { reason: String },

    #[error("Malformed config: {reason}")]
    Malformed { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Production,
    Audit,
}

impl Environment {
    pub fn config(&self) -> CvaConfig {
        match self {
            Environment::Development => CvaConfig::development(),
            Environment::Production => CvaConfig::production(),
            Environment::Audit => CvaConfig::audit(),
        }
    }
}
