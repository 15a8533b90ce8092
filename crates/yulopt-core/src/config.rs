//! Optimiser configuration.
//!
//! Configuration is usually embedded in a larger pipeline file, e.g.
//!
//! ```yaml
//! level: aggressive
//! verify_preconditions: true
//! disabled_passes:
//!   - unused-function-parameter-pruner
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Optimisation levels, ordered from least to most aggressive.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    /// O0: no optimisation
    None,
    /// O1: cheap local clean-ups
    Minimal,
    /// O2: interprocedural signature rewrites
    #[default]
    Moderate,
    /// O3: everything
    Aggressive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerConfig {
    pub level: OptimizationLevel,
    /// Check upstream preconditions (unique and hoisted function
    /// definitions, matching call arities) before running any pass.
    pub verify_preconditions: bool,
    /// Pass names to skip regardless of level.
    pub disabled_passes: Vec<String>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            level: OptimizationLevel::default(),
            verify_preconditions: cfg!(debug_assertions),
            disabled_passes: Vec::new(),
        }
    }
}

impl OptimizerConfig {
    pub fn with_level(level: OptimizationLevel) -> Self {
        OptimizerConfig {
            level,
            ..Self::default()
        }
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn is_pass_disabled(&self, name: &str) -> bool {
        self.disabled_passes.iter().any(|disabled| disabled == name)
    }
}
