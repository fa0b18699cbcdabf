//! Timesheet model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::workflow::TimesheetStatus;

/// Hours an employee booked for a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timesheet {
    /// Surrogate identifier.
    pub id: u64,
    /// The employee who worked.
    pub employee_code: String,
    /// The working day.
    pub work_date: NaiveDate,
    /// Hours worked.
    pub hours: Decimal,
    /// Overtime hours worked.
    #[serde(default)]
    pub overtime_hours: Decimal,
    /// Approval status.
    pub status: TimesheetStatus,
    /// Optimistic concurrency token.
    pub version: u64,
}
