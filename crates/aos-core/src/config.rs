//! Runtime configuration.
//!
//! Defaults reproduce the canonical runtime. A TOML file may override any
//! subset of fields, and a handful of environment variables override the file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{ConfigError, Result};

pub const ENV_LLM_HUB_URL: &str = "AOS_LLM_HUB_URL";
pub const ENV_MAX_ITERATIONS: &str = "AOS_MAX_ITERATIONS";
pub const ENV_DIGEST_WINDOW_SECS: &str = "AOS_DIGEST_WINDOW_SECS";

/// Reasoning-loop budgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    pub max_iterations: u32,
    pub completion_timeout_ms: u64,
    pub tool_timeout_ms: u64,
    /// Entries kept per agent memory window.
    pub memory_window: usize,
    /// Characters kept per memory entry.
    pub memory_entry_chars: usize,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            completion_timeout_ms: 30_000,
            tool_timeout_ms: 15_000,
            memory_window: 10,
            memory_entry_chars: 500,
        }
    }
}

impl ReasoningConfig {
    pub fn completion_timeout(&self) -> Duration {
        Duration::from_millis(self.completion_timeout_ms)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_millis(self.tool_timeout_ms)
    }
}

/// Consensus thresholds for the launch decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    pub high_consensus_go: usize,
    pub majority_positive: usize,
    pub max_conditional: usize,
    /// Audit-log key every decision is recorded under.
    pub decision_key: String,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            high_consensus_go: 6,
            majority_positive: 8,
            max_conditional: 4,
            decision_key: "launch-first-10-users".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    pub window_secs: u64,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self { window_secs: 3600 }
    }
}

impl DigestConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// In-process event bus sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Broadcast channel capacity per subscriber.
    pub capacity: usize,
    /// Published events retained for inspection; the oldest are dropped first.
    pub history_limit: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            history_limit: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub url: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:4010".to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AosConfig {
    pub reasoning: ReasoningConfig,
    pub governance: GovernanceConfig,
    pub digest: DigestConfig,
    pub bus: BusConfig,
    pub completion: CompletionConfig,
}

impl AosConfig {
    /// Parse a TOML document. Missing sections and fields keep defaults.
    pub fn from_toml_str(raw: &str) -> std::result::Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with process environment overrides applied.
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load an optional TOML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                toml::from_str(&raw).map_err(ConfigError::from)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, which maps an env-var name to its value.
    pub fn apply_env<F>(&mut self, lookup: F) -> std::result::Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_LLM_HUB_URL) {
            self.completion.url = url;
        }
        if let Some(raw) = lookup(ENV_MAX_ITERATIONS) {
            self.reasoning.max_iterations = parse_env(ENV_MAX_ITERATIONS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DIGEST_WINDOW_SECS) {
            self.digest.window_secs = parse_env(ENV_DIGEST_WINDOW_SECS, &raw)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let checks: [(&str, bool, &str); 8] = [
            (
                "reasoning.max_iterations",
                self.reasoning.max_iterations == 0,
                "must be at least 1",
            ),
            (
                "reasoning.completion_timeout_ms",
                self.reasoning.completion_timeout_ms == 0,
                "must be non-zero",
            ),
            (
                "reasoning.tool_timeout_ms",
                self.reasoning.tool_timeout_ms == 0,
                "must be non-zero",
            ),
            (
                "reasoning.memory_window",
                self.reasoning.memory_window == 0,
                "must be at least 1",
            ),
            (
                "digest.window_secs",
                self.digest.window_secs == 0,
                "must be non-zero",
            ),
            (
                "bus.capacity",
                self.bus.capacity == 0,
                "must be at least 1",
            ),
            (
                "bus.history_limit",
                self.bus.history_limit == 0,
                "must be at least 1",
            ),
            (
                "governance.decision_key",
                self.governance.decision_key.trim().is_empty(),
                "must not be empty",
            ),
        ];

        match checks.iter().find(|(_, failed, _)| *failed) {
            Some((field, _, reason)) => Err(ConfigError::InvalidValue {
                field: (*field).to_string(),
                reason: (*reason).to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> std::result::Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field: key.to_string(),
        reason: format!("'{raw}' is not a valid number"),
    })
}
