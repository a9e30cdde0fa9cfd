//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

/// Default values used when a variable is not set.
pub mod defaults {
    pub const ALLURE_NAMESPACE: &str = "TestClass";
    pub const MAX_STEP_DURATION_MS: i64 = 1_000;
    pub const MAX_TEST_DURATION_MS: i64 = 5_000;
    pub const OUTPUT_DIR: &str = ".";
    pub const OVERWRITE_EXISTING: bool = false;
}

/// Settings that shape the Allure-result documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    /// Prefix of every `fullName` (joined to the test name with a dot)
    pub allure_namespace: String,
    /// Upper bound of the synthesized step duration in milliseconds
    pub max_step_duration_ms: i64,
    /// Upper bound of the synthesized test duration in milliseconds
    pub max_test_duration_ms: i64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            allure_namespace: defaults::ALLURE_NAMESPACE.to_string(),
            max_step_duration_ms: defaults::MAX_STEP_DURATION_MS,
            max_test_duration_ms: defaults::MAX_TEST_DURATION_MS,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Allure export settings
    pub export: ExportSettings,
    /// Directory that exported artifacts are written to
    pub output_dir: PathBuf,
    /// Default overwrite policy for imports
    pub overwrite_existing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            export: ExportSettings::default(),
            output_dir: PathBuf::from(defaults::OUTPUT_DIR),
            overwrite_existing: defaults::OVERWRITE_EXISTING,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TCS_ALLURE_NAMESPACE`: `fullName` prefix (default: TestClass)
    /// - `TCS_MAX_STEP_DURATION_MS`: max synthesized step duration (default: 1000)
    /// - `TCS_MAX_TEST_DURATION_MS`: max synthesized test duration (default: 5000)
    /// - `TCS_OUTPUT_DIR`: directory for exported files (default: .)
    /// - `TCS_OVERWRITE_EXISTING`: overwrite same-named test cases on import (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let allure_namespace = lookup("TCS_ALLURE_NAMESPACE")
            .unwrap_or_else(|| defaults::ALLURE_NAMESPACE.to_string());

        let max_step_duration_ms = lookup("TCS_MAX_STEP_DURATION_MS")
            .unwrap_or_else(|| defaults::MAX_STEP_DURATION_MS.to_string())
            .parse::<i64>()
            .map_err(|_| {
                ConfigError::InvalidValue("TCS_MAX_STEP_DURATION_MS must be a valid number")
            })?;

        let max_test_duration_ms = lookup("TCS_MAX_TEST_DURATION_MS")
            .unwrap_or_else(|| defaults::MAX_TEST_DURATION_MS.to_string())
            .parse::<i64>()
            .map_err(|_| {
                ConfigError::InvalidValue("TCS_MAX_TEST_DURATION_MS must be a valid number")
            })?;

        let output_dir = lookup("TCS_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(defaults::OUTPUT_DIR));

        let overwrite_existing = match lookup("TCS_OVERWRITE_EXISTING") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidValue(
                "TCS_OVERWRITE_EXISTING must be true or false",
            ))?,
            None => defaults::OVERWRITE_EXISTING,
        };

        let config = Config {
            export: ExportSettings {
                allure_namespace,
                max_step_duration_ms,
                max_test_duration_ms,
            },
            output_dir,
            overwrite_existing,
        };

        config.validate()?;

        Ok(config)
    }

    /// Check cross-field constraints.
    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let namespace = &self.export.allure_namespace;
        if namespace.is_empty() || namespace.chars().any(char::is_whitespace) {
            errors.push(format!(
                "TCS_ALLURE_NAMESPACE must be non-empty and contain no whitespace, got '{}'",
                namespace
            ));
        }

        if self.export.max_step_duration_ms < 0 || self.export.max_test_duration_ms < 0 {
            errors.push("Synthesized durations must not be negative".to_string());
        }

        if self.export.max_test_duration_ms < self.export.max_step_duration_ms {
            errors.push(format!(
                "TCS_MAX_TEST_DURATION_MS ({}) must be >= TCS_MAX_STEP_DURATION_MS ({})",
                self.export.max_test_duration_ms, self.export.max_step_duration_ms
            ));
        }

        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }

        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}
