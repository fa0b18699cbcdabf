//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineConfig, ExamConfig, ImportConfig, PayrollConfig, SecurityConfig};

/// Upper bound for lockout windows (one year).
const MAX_LOCK_SECS: i64 = 365 * 24 * 60 * 60;

/// Loads and provides access to engine configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and validates the values the calculators divide by or compare against.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── payroll.yaml   # Standard days/hours, overtime factors, insurance rate
/// ├── security.yaml  # Login lockout thresholds
/// ├── exams.yaml     # Points per question and pass ratio
/// └── import.yaml    # Import limits
/// ```
///
/// # Example
///
/// ```no_run
/// use workforce_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Insurance rate: {}", loader.payroll().insurance_rate);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if any required file is missing, contains invalid
    /// YAML, or holds a value that would make the calculators meaningless
    /// (zero standard days, a pass ratio above one, and so on).
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let payroll_path = path.join("payroll.yaml");
        let payroll = Self::load_yaml::<PayrollConfig>(&payroll_path)?;
        Self::validate_payroll(&payroll, &payroll_path)?;

        let security_path = path.join("security.yaml");
        let security = Self::load_yaml::<SecurityConfig>(&security_path)?;
        if security.max_failed_attempts == 0 {
            return Err(EngineError::ConfigParseError {
                path: security_path.display().to_string(),
                message: "max_failed_attempts must be at least 1".to_string(),
            });
        }
        for (name, secs) in [
            ("failure_window_secs", security.failure_window_secs),
            ("lockout_secs", security.lockout_secs),
        ] {
            if !(1..=MAX_LOCK_SECS).contains(&secs) {
                return Err(EngineError::ConfigParseError {
                    path: security_path.display().to_string(),
                    message: format!("{} must be between 1 and {}", name, MAX_LOCK_SECS),
                });
            }
        }

        let exams_path = path.join("exams.yaml");
        let exams = Self::load_yaml::<ExamConfig>(&exams_path)?;
        if exams.pass_ratio < Decimal::ZERO || exams.pass_ratio > Decimal::ONE {
            return Err(EngineError::ConfigParseError {
                path: exams_path.display().to_string(),
                message: "pass_ratio must be between 0 and 1".to_string(),
            });
        }

        let import = Self::load_yaml::<ImportConfig>(&path.join("import.yaml"))?;

        Ok(Self {
            config: EngineConfig::new(payroll, security, exams, import),
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate_payroll(payroll: &PayrollConfig, path: &Path) -> EngineResult<()> {
        if payroll.standard_days <= Decimal::ZERO || payroll.standard_hours <= Decimal::ZERO {
            return Err(EngineError::ConfigParseError {
                path: path.display().to_string(),
                message: "standard_days and standard_hours must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the payroll configuration.
    pub fn payroll(&self) -> &PayrollConfig {
        self.config.payroll()
    }

    /// Returns the login lockout configuration.
    pub fn security(&self) -> &SecurityConfig {
        self.config.security()
    }

    /// Returns the exam grading configuration.
    pub fn exams(&self) -> &ExamConfig {
        self.config.exams()
    }

    /// Returns the import limits.
    pub fn import(&self) -> &ImportConfig {
        self.config.import()
    }
}
