//! Run configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```
//! use offer_merge::config::{EventMatching, MergeConfig};
//!
//! let cfg = MergeConfig::from_json_str(r#"{ "event_matching": "any_offer" }"#).unwrap();
//! assert_eq!(cfg.event_matching, EventMatching::AnyOffer);
//! assert_eq!(cfg.hours_per_day, 24.0);
//! ```

use crate::runner::ExecMode;
use crate::validation::ValidationMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do with a received event whose offer or customer cannot be found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupPolicy {
    /// Stop the run and return the lookup error.
    Abort,
    /// Drop the row, log a warning and count it.
    #[default]
    SkipAndWarn,
    /// Drop the row and count it without logging.
    Skip,
}

/// Which viewed/completed events are eligible for an offer's success label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventMatching {
    /// Only events for the same offer id as the received event.
    #[default]
    SameOffer,
    /// Any of the customer's viewed/completed events inside the window,
    /// whatever offer they belong to.
    AnyOffer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub exec_mode: ExecMode,
    pub lookup_policy: LookupPolicy,
    pub event_matching: EventMatching,
    pub validation_mode: ValidationMode,
    /// Divisor converting raw transcript times (hours) into days.
    pub hours_per_day: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            exec_mode: ExecMode::default(),
            lookup_policy: LookupPolicy::default(),
            event_matching: EventMatching::default(),
            validation_mode: ValidationMode::default(),
            hours_per_day: 24.0,
        }
    }
}

impl MergeConfig {
    /// # Errors
    /// If `json` is not a valid config object.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json).context("parse merge config")?;
        cfg.check()?;
        Ok(cfg)
    }

    /// # Errors
    /// If the file cannot be read or does not hold a valid config.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("load config {}", path.display()))
    }

    fn check(&self) -> Result<()> {
        anyhow::ensure!(
            self.hours_per_day.is_finite() && self.hours_per_day > 0.0,
            "hours_per_day must be a positive number, got {}",
            self.hours_per_day
        );
        if let ExecMode::Parallel { threads: Some(0) } = self.exec_mode {
            anyhow::bail!("exec_mode.threads must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() -> Result<()> {
        assert_eq!(MergeConfig::from_json_str("{}")?, MergeConfig::default());
        Ok(())
    }

    #[test]
    fn full_config_parses() -> Result<()> {
        let cfg = MergeConfig::from_json_str(
            r#"{
                "exec_mode": { "mode": "sequential" },
                "lookup_policy": "abort",
                "event_matching": "same_offer",
                "validation_mode": "fail_fast",
                "hours_per_day": 24.0
            }"#,
        )?;
        assert_eq!(cfg.exec_mode, ExecMode::Sequential);
        assert_eq!(cfg.lookup_policy, LookupPolicy::Abort);
        assert_eq!(cfg.validation_mode, ValidationMode::FailFast);
        Ok(())
    }

    #[test]
    fn rejects_nonsense_values() {
        assert!(MergeConfig::from_json_str(r#"{ "hours_per_day": 0 }"#).is_err());
        assert!(
            MergeConfig::from_json_str(r#"{ "exec_mode": { "mode": "parallel", "threads": 0 } }"#)
                .is_err()
        );
        assert!(MergeConfig::from_json_str(r#"{ "lookup_policy": "retry" }"#).is_err());
    }

    #[test]
    fn loads_from_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("merge.json");
        std::fs::write(&path, r#"{ "lookup_policy": "skip" }"#)?;
        let cfg = MergeConfig::from_json_file(&path)?;
        assert_eq!(cfg.lookup_policy, LookupPolicy::Skip);
        Ok(())
    }
}
