//! Login account model.

use serde::{Deserialize, Serialize};

/// A login account linked to an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Login name, compared case-insensitively.
    pub username: String,
    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// The employee behind the account.
    pub employee_code: String,
    /// The employee's department.
    pub department: String,
    /// Granted permission strings (e.g. "Payroll.Edit", "ViewAll").
    #[serde(default)]
    pub permissions: Vec<String>,
}
