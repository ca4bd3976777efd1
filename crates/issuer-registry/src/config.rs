//! # Registry Configuration
//!
//! Limits, snapshot location and logging options, with environment overrides.

use crate::domain::{RegistryLimits, DEFAULT_MAX_ISSUERS, DEFAULT_MAX_TOPICS_PER_ISSUER};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Default snapshot file.
pub const DEFAULT_SNAPSHOT_PATH: &str = "./data/trusted-issuers.json";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// A limit of zero makes the registry unusable.
    #[error("{0} must be at least 1")]
    ZeroLimit(&'static str),
}

/// Complete registry configuration.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Registry size bounds.
    pub limits: RegistryLimits,
    /// Where the snapshot file lives.
    pub snapshot_path: PathBuf,
    /// Log level filter (trace, debug, info, warn, error).
    pub log_level: String,
    /// Whether to emit JSON formatted logs.
    pub json_logs: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            limits: RegistryLimits::default(),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl RegistryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TIR_MAX_ISSUERS`: Maximum registered issuers (default: 50)
    /// - `TIR_MAX_TOPICS_PER_ISSUER`: Maximum topics per issuer (default: 15)
    /// - `TIR_SNAPSHOT_PATH`: Snapshot file (default: ./data/trusted-issuers.json)
    /// - `TIR_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `TIR_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` uses the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = Self {
            limits: RegistryLimits {
                max_issuers: parse_or(&lookup, "TIR_MAX_ISSUERS", DEFAULT_MAX_ISSUERS)?,
                max_topics_per_issuer: parse_or(
                    &lookup,
                    "TIR_MAX_TOPICS_PER_ISSUER",
                    DEFAULT_MAX_TOPICS_PER_ISSUER,
                )?,
            },
            snapshot_path: lookup("TIR_SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_PATH)),
            log_level: lookup("TIR_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),
            json_logs: parse_bool(&lookup, "TIR_JSON_LOGS", false)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject unusable settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_issuers == 0 {
            return Err(ConfigError::ZeroLimit("max_issuers"));
        }
        if self.limits.max_topics_per_issuer == 0 {
            return Err(ConfigError::ZeroLimit("max_topics_per_issuer"));
        }
        Ok(())
    }
}

fn parse_or(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: usize,
) -> Result<usize, ConfigError> {
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        None => Ok(default),
    }
}

fn parse_bool(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match lookup(var) {
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue { var, value }),
        },
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.limits, RegistryLimits::default());
        assert_eq!(config.snapshot_path, PathBuf::from(DEFAULT_SNAPSHOT_PATH));
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs);
    }

    #[test]
    fn test_overrides() {
        let config = RegistryConfig::from_lookup(lookup(&[
            ("TIR_MAX_ISSUERS", "200"),
            ("TIR_MAX_TOPICS_PER_ISSUER", " 32 "),
            ("TIR_SNAPSHOT_PATH", "/var/lib/tir/registry.json"),
            ("RUST_LOG", "debug"),
            ("TIR_JSON_LOGS", "true"),
        ]))
        .unwrap();

        assert_eq!(config.limits.max_issuers, 200);
        assert_eq!(config.limits.max_topics_per_issuer, 32);
        assert_eq!(config.snapshot_path, PathBuf::from("/var/lib/tir/registry.json"));
        assert_eq!(config.log_level, "debug");
        assert!(config.json_logs);
    }

    #[test]
    fn test_tir_log_level_wins_over_rust_log() {
        let config =
            RegistryConfig::from_lookup(lookup(&[("RUST_LOG", "debug"), ("TIR_LOG_LEVEL", "warn")]))
                .unwrap();
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_invalid_number() {
        let err = RegistryConfig::from_lookup(lookup(&[("TIR_MAX_ISSUERS", "lots")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: "TIR_MAX_ISSUERS",
                value: "lots".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_bool() {
        assert!(RegistryConfig::from_lookup(lookup(&[("TIR_JSON_LOGS", "maybe")])).is_err());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let err = RegistryConfig::from_lookup(lookup(&[("TIR_MAX_ISSUERS", "0")])).unwrap_err();
        assert_eq!(err, ConfigError::ZeroLimit("max_issuers"));
    }
}
