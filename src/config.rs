//! Engine configuration: solver and generator budgets.
//!
//! Configs are plain serde values. [`EngineConfig::from_ron_str`] parses the
//! RON form; reading the file is left to the caller.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Budgets and options for a single solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Maximum node expansions before reporting exhaustion.
    pub node_budget: usize,
    /// Wall-clock limit in milliseconds; `0` disables it.
    pub time_budget_ms: u64,
    /// Whether sink bottles may be used as pour targets.
    pub allow_sink_moves: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            node_budget: 250_000,
            time_budget_ms: 0,
            allow_sink_moves: true,
        }
    }
}

impl SolverConfig {
    #[must_use]
    pub const fn with_node_budget(mut self, node_budget: usize) -> Self {
        self.node_budget = node_budget;
        self
    }

    #[must_use]
    pub const fn with_time_budget_ms(mut self, time_budget_ms: u64) -> Self {
        self.time_budget_ms = time_budget_ms;
        self
    }

    #[must_use]
    pub const fn with_sink_moves(mut self, allow_sink_moves: bool) -> Self {
        self.allow_sink_moves = allow_sink_moves;
        self
    }
}

/// Reject-and-retry settings for level generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Candidates tried before falling back to the best one seen.
    pub retry_ceiling: u32,
    /// Node budget for each validating solve.
    pub node_budget: usize,
    /// Time budget for each validating solve; `0` keeps generation
    /// independent of machine speed.
    pub time_budget_ms: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            retry_ceiling: 24,
            node_budget: 250_000,
            time_budget_ms: 0,
        }
    }
}

impl GeneratorConfig {
    /// Solver settings used to measure each candidate.
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            node_budget: self.node_budget,
            time_budget_ms: self.time_budget_ms,
            allow_sink_moves: true,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub solver: SolverConfig,
    pub generator: GeneratorConfig,
}

impl EngineConfig {
    /// Parses a RON document. Missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns [`crate::EngineError::Config`] on malformed RON.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        Ok(ron::from_str(source)?)
    }
}
