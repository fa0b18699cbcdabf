//! Configuration types for the workforce engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Overtime multipliers applied to the hourly base.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OvertimeFactors {
    /// Weekday overtime multiplier.
    pub weekday: Decimal,
    /// Weekly rest day overtime multiplier.
    pub weekend: Decimal,
    /// Public holiday overtime multiplier.
    pub public_holiday: Decimal,
    /// Night shift overtime multiplier.
    pub night: Decimal,
}

impl Default for OvertimeFactors {
    fn default() -> Self {
        Self {
            weekday: Decimal::new(15, 1),
            weekend: Decimal::new(20, 1),
            public_holiday: Decimal::new(30, 1),
            night: Decimal::new(13, 1),
        }
    }
}

/// Payroll configuration from payroll.yaml.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PayrollConfig {
    /// Working days used to derive the daily rate from the monthly base.
    pub standard_days: Decimal,
    /// Working hours per day used to derive the hourly rate.
    pub standard_hours: Decimal,
    /// Overtime multipliers.
    pub overtime: OvertimeFactors,
    /// Employee share of social insurance, as a fraction of insurance salary.
    pub insurance_rate: Decimal,
    /// Decimal places kept on the final salary.
    #[serde(default)]
    pub rounding_scale: u32,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            standard_days: Decimal::new(25, 0),
            standard_hours: Decimal::new(8, 0),
            overtime: OvertimeFactors::default(),
            insurance_rate: Decimal::new(105, 3),
            rounding_scale: 0,
        }
    }
}

/// Login lockout configuration from security.yaml.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SecurityConfig {
    /// Failed attempts allowed inside the window before the account locks.
    pub max_failed_attempts: u32,
    /// Sliding window in seconds during which failures accumulate.
    pub failure_window_secs: i64,
    /// Seconds an account stays locked.
    pub lockout_secs: i64,
    /// Maximum number of usernames tracked at once.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
}

fn default_cache_capacity() -> u64 {
    10_000
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            failure_window_secs: 15 * 60,
            lockout_secs: 15 * 60,
            cache_capacity: default_cache_capacity(),
        }
    }
}

/// Exam grading configuration from exams.yaml.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExamConfig {
    /// Points awarded per correct multiple-choice answer.
    pub points_per_question: Decimal,
    /// Minimum fraction of correct answers needed to pass.
    pub pass_ratio: Decimal,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            points_per_question: Decimal::ONE,
            pass_ratio: Decimal::new(8, 1),
        }
    }
}

/// Import limits from import.yaml.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportConfig {
    /// Largest number of data rows accepted in a single file.
    pub max_rows: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self { max_rows: 20_000 }
    }
}

/// The complete engine configuration loaded from YAML files.
///
/// This struct aggregates all configuration loaded from the various
/// YAML files in a configuration directory.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    payroll: PayrollConfig,
    security: SecurityConfig,
    exams: ExamConfig,
    import: ImportConfig,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(
        payroll: PayrollConfig,
        security: SecurityConfig,
        exams: ExamConfig,
        import: ImportConfig,
    ) -> Self {
        Self {
            payroll,
            security,
            exams,
            import,
        }
    }

    /// Returns the payroll configuration.
    pub fn payroll(&self) -> &PayrollConfig {
        &self.payroll
    }

    /// Returns the login lockout configuration.
    pub fn security(&self) -> &SecurityConfig {
        &self.security
    }

    /// Returns the exam grading configuration.
    pub fn exams(&self) -> &ExamConfig {
        &self.exams
    }

    /// Returns the import limits.
    pub fn import(&self) -> &ImportConfig {
        &self.import
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_payroll_constants() {
        let config = PayrollConfig::default();
        assert_eq!(config.standard_days, Decimal::new(25, 0));
        assert_eq!(config.standard_hours, Decimal::new(8, 0));
        assert_eq!(config.insurance_rate, Decimal::new(105, 3));
        assert_eq!(config.overtime.weekday, Decimal::new(15, 1));
        assert_eq!(config.overtime.night, Decimal::new(13, 1));
    }

    #[test]
    fn test_security_cache_capacity_defaults_when_omitted() {
        let yaml = "max_failed_attempts: 3\nfailure_window_secs: 60\nlockout_secs: 300\n";
        let config: SecurityConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.max_failed_attempts, 3);
        assert_eq!(config.cache_capacity, 10_000);
    }
}
