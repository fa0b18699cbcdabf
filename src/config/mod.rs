//! Configuration loading and management for the workforce engine.
//!
//! This module provides functionality to load engine configuration from YAML
//! files: payroll constants, login lockout thresholds, exam grading and
//! import limits.
//!
//! # Example
//!
//! ```no_run
//! use workforce_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Hourly base divisor: {}", config.payroll().standard_days);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    EngineConfig, ExamConfig, ImportConfig, OvertimeFactors, PayrollConfig, SecurityConfig,
};
