//! Simulation configuration files.
//!
//! Three formats, chosen by file extension:
//!
//! | Extension | Format |
//! |-----------|--------|
//! | `.yaml`, `.yml` | [`SimulationConfig`] as YAML |
//! | `.json` | [`SimulationConfig`] as JSON |
//! | anything else | plain rules, one per line, `#` comments |
//!
//! ```yaml
//! rules:
//!   - PERMITIR TCP de CUALQUIERA:CUALQUIERA a CUALQUIERA:443
//! seed: 42
//! ticks: 20
//! interval_ms: 700
//! log_capacity: 100
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::RawRule;
use crate::{DEFAULT_LOG_CAPACITY, DEFAULT_TICK_INTERVAL};

const DEFAULT_TICKS: u64 = 20;

/// Errors raised while loading a [`SimulationConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything needed to run a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Rule texts in priority order. Invalid ones are kept here and rejected at parse time.
    #[serde(default)]
    pub rules: Vec<String>,

    /// RNG seed; `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "default_ticks")]
    pub ticks: u64,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
}

fn default_ticks() -> u64 {
    DEFAULT_TICKS
}

fn default_interval_ms() -> u64 {
    u64::try_from(DEFAULT_TICK_INTERVAL.as_millis()).unwrap_or(u64::MAX)
}

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            seed: None,
            ticks: default_ticks(),
            interval_ms: default_interval_ms(),
            log_capacity: default_log_capacity(),
        }
    }
}

impl SimulationConfig {
    /// Load a config file, picking the format from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or does not
    /// deserialize. Rule texts are not validated here.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let config = match extension.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml(&content)?,
            Some("json") => Self::from_json(&content)?,
            _ => Self::from_rules_text(&content),
        };
        tracing::debug!(
            path = %path.display(),
            rules = config.rules.len(),
            "config loaded"
        );
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] on malformed input.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on malformed input.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Plain rules: one per line. Blank lines and lines starting with `#`
    /// are skipped. Every other setting keeps its default.
    #[must_use]
    pub fn from_rules_text(content: &str) -> Self {
        let rules = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect();
        Self {
            rules,
            ..Self::default()
        }
    }

    /// The rule texts as raw rules with fresh ids.
    #[must_use]
    pub fn raw_rules(&self) -> Vec<RawRule> {
        self.rules
            .iter()
            .map(|text| RawRule::with_generated_id(text.as_str()))
            .collect()
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
