//! 5S violation models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A violation type in the 5S catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation5S {
    /// Catalog code.
    pub code: String,
    /// Description of the infraction.
    pub name: String,
}

/// Count of one violation type logged against an employee on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeViolation5S {
    /// The employee.
    pub employee_code: String,
    /// The violation type.
    pub violation_code: String,
    /// The date observed.
    pub date: NaiveDate,
    /// Number of occurrences.
    pub qty: u32,
}

impl EmployeeViolation5S {
    /// The business key `(employee, violation, date)`.
    pub fn key(&self) -> (String, String, NaiveDate) {
        (
            self.employee_code.clone(),
            self.violation_code.clone(),
            self.date,
        )
    }
}
