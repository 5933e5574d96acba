//! Simulator configuration.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::syscfg;

/// Scheduling policy for the pending vector fragment buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PvfbPolicy {
    /// FIFO ordering.
    Queue,
    /// LIFO ordering, drains the most recent split first.
    Stack,
    /// Two stacks with backward branches routed to the second one.
    DualStack,
}

impl Default for PvfbPolicy {
    fn default() -> Self {
        PvfbPolicy::Stack
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Number of cores, each a CP plus its vector lane array.
    pub num_cores: usize,
    /// Size of the shared memory image in bytes.
    pub memory_size: usize,
    /// Hardware vector length limit.
    pub vlmax: usize,
    /// PVFB scheduling policy.
    pub pvfb_policy: PvfbPolicy,
    /// Collect divergence and scoreboard statistics.
    pub stats: bool,
    /// Per-instruction trace logging.
    pub trace: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_cores: 1,
            memory_size: syscfg::MEMORY_SIZE,
            vlmax: syscfg::VLEN_MAX,
            pvfb_policy: PvfbPolicy::default(),
            stats: false,
            trace: false,
        }
    }
}

impl SimConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let cfg: SimConfig = toml::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_cores == 0 || self.num_cores > 32 {
            return Err(ConfigError::Invalid(format!(
                "num_cores must be in 1..=32, got {}",
                self.num_cores
            )));
        }
        if self.vlmax < syscfg::VLEN_MIN || self.vlmax > syscfg::VLEN_MAX {
            return Err(ConfigError::Invalid(format!(
                "vlmax must be in {}..={}, got {}",
                syscfg::VLEN_MIN,
                syscfg::VLEN_MAX,
                self.vlmax
            )));
        }
        if self.memory_size == 0 {
            return Err(ConfigError::Invalid("memory_size must be nonzero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        SimConfig::default().validate().unwrap();
    }

    #[test]
    fn parses_toml() {
        let cfg: SimConfig = toml::from_str(
            r#"
            num_cores = 2
            vlmax = 8
            pvfb_policy = "dual-stack"
            stats = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.num_cores, 2);
        assert_eq!(cfg.vlmax, 8);
        assert_eq!(cfg.pvfb_policy, PvfbPolicy::DualStack);
        assert!(cfg.stats);
        assert!(!cfg.trace);
    }

    #[test]
    fn rejects_zero_cores() {
        let cfg = SimConfig {
            num_cores: 0,
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
