//! Error types for the workforce engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur in the payroll, exam, import,
//! tooling and login services.

use thiserror::Error;

/// The main error type for the workforce engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use workforce_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/file.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/file.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No employee exists with the given code.
    #[error("Employee not found: {code}")]
    EmployeeNotFound {
        /// The employee code that was not found.
        code: String,
    },

    /// The employee has no salary profile to snapshot.
    #[error("Salary profile not found for employee {employee_code}")]
    SalaryProfileNotFound {
        /// The employee code.
        employee_code: String,
    },

    /// A record looked up by id does not exist.
    #[error("{entity} '{id}' not found")]
    RecordNotFound {
        /// The entity kind (e.g. "payroll").
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// A record with the same business key already exists.
    #[error("{entity} already exists for key {key}")]
    DuplicateRecord {
        /// The entity kind.
        entity: &'static str,
        /// The conflicting business key.
        key: String,
    },

    /// A status change is not allowed from the current status.
    #[error("Cannot move {entity} from {from} to {to}")]
    InvalidTransition {
        /// The entity kind.
        entity: &'static str,
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },

    /// The record's status forbids edits.
    #[error("{entity} '{id}' cannot be edited while {status}")]
    RecordLocked {
        /// The entity kind.
        entity: &'static str,
        /// The record identifier.
        id: String,
        /// The status that locks the record.
        status: String,
    },

    /// The record changed since it was read.
    #[error("{entity} '{id}' was modified by another user, please retry")]
    ConcurrencyConflict {
        /// The entity kind.
        entity: &'static str,
        /// The record identifier.
        id: String,
    },

    /// The exam already has answers and can no longer be edited.
    #[error("Exam {exam_id} already has answers and is frozen")]
    ExamFrozen {
        /// The exam identifier.
        exam_id: u64,
    },

    /// A tool movement asked for more than the ledger allows.
    #[error("Insufficient quantity for tool {tool_code}: requested {requested}, allowed {allowed}")]
    InsufficientQuantity {
        /// The tool code.
        tool_code: String,
        /// The requested quantity.
        requested: i64,
        /// The maximum quantity the ledger allows for this movement.
        allowed: i64,
    },

    /// An input field was invalid.
    #[error("Invalid field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// An import file is missing a required column.
    #[error("Import is missing required column '{column}'")]
    MissingColumn {
        /// The canonical column name.
        column: String,
    },

    /// An import file could not be read at all.
    #[error("Import file could not be read: {message}")]
    UnreadableImport {
        /// A description of the read failure.
        message: String,
    },

    /// Too many failed logins for this username.
    #[error("Account '{username}' is locked, retry in {retry_after_secs}s")]
    AccountLocked {
        /// The locked username.
        username: String,
        /// Seconds until the lock lifts.
        retry_after_secs: i64,
    },

    /// Username or password did not match.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// A password could not be hashed or a stored hash is malformed.
    #[error("Password hashing failed: {message}")]
    PasswordHashError {
        /// A description of the hashing failure.
        message: String,
    },

    /// The caller lacks a permission the operation requires.
    #[error("Permission '{permission}' is required")]
    PermissionDenied {
        /// The missing permission.
        permission: String,
    },

    /// A background task failed before finishing.
    #[error("Internal error: {message}")]
    Internal {
        /// A description of the failure.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/file.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/file.yaml"
        );
    }

    #[test]
    fn test_record_locked_displays_status() {
        let error = EngineError::RecordLocked {
            entity: "payroll",
            id: "7".to_string(),
            status: "approved".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "payroll '7' cannot be edited while approved"
        );
    }

    #[test]
    fn test_concurrency_conflict_asks_for_retry() {
        let error = EngineError::ConcurrencyConflict {
            entity: "timesheet",
            id: "3".to_string(),
        };
        assert!(error.to_string().ends_with("please retry"));
    }

    #[test]
    fn test_insufficient_quantity_displays_numbers() {
        let error = EngineError::InsufficientQuantity {
            tool_code: "DRL-01".to_string(),
            requested: 5,
            allowed: 2,
        };
        assert_eq!(
            error.to_string(),
            "Insufficient quantity for tool DRL-01: requested 5, allowed 2"
        );
    }

    #[test]
    fn test_account_locked_displays_retry() {
        let error = EngineError::AccountLocked {
            username: "an.nguyen".to_string(),
            retry_after_secs: 120,
        };
        assert_eq!(
            error.to_string(),
            "Account 'an.nguyen' is locked, retry in 120s"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_missing_column() -> EngineResult<()> {
            Err(EngineError::MissingColumn {
                column: "employee_code".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_missing_column()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
