//! Monthly payroll model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::workflow::PayrollStatus;

use super::{Allowances, SalaryProfile};

/// Variable monthly inputs entered or imported for a payroll.
///
/// Every field is nullable; the calculator treats a missing value as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollInputs {
    /// Regular hours worked in the month.
    pub regular_hours: Option<Decimal>,
    /// Overtime hours on normal working days.
    pub weekday_overtime_hours: Option<Decimal>,
    /// Overtime hours on weekly rest days.
    pub weekend_overtime_hours: Option<Decimal>,
    /// Overtime hours on public holidays.
    pub holiday_overtime_hours: Option<Decimal>,
    /// Night shift overtime hours.
    pub night_overtime_hours: Option<Decimal>,
    /// Days the employee held a responsibility role.
    pub responsible_days: Option<Decimal>,
    /// Disciplinary penalty deducted.
    pub penalty: Option<Decimal>,
    /// Trade union fee deducted.
    pub union_fee: Option<Decimal>,
    /// Personal income tax withheld.
    pub personal_income_tax: Option<Decimal>,
    /// Salary advance already paid out.
    pub advance: Option<Decimal>,
}

/// One employee's payroll for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPayroll {
    /// Surrogate identifier.
    pub id: u64,
    /// The employee paid.
    pub employee_code: String,
    /// Payroll year.
    pub year: i32,
    /// Payroll month (1-12).
    pub month: u32,
    /// Monthly base salary copied from the profile.
    pub base_salary: Option<Decimal>,
    /// Insurance salary copied from the profile.
    pub insurance_salary: Option<Decimal>,
    /// Per-day responsibility rate copied from the profile.
    pub responsibility_per_day: Option<Decimal>,
    /// Allowances copied from the profile at creation.
    pub allowances: Allowances,
    /// Variable inputs for the month.
    pub inputs: PayrollInputs,
    /// Derived final salary, recomputed on every input change.
    pub total_salary: Decimal,
    /// Approval status.
    pub status: PayrollStatus,
    /// Optimistic concurrency token, bumped on every write.
    pub version: u64,
}

impl MonthlyPayroll {
    /// The business key `(employee, year, month)`.
    pub fn key(&self) -> (String, i32, u32) {
        (self.employee_code.clone(), self.year, self.month)
    }

    /// The salary figures captured when the payroll was created.
    pub fn salary_snapshot(&self) -> SalaryProfile {
        SalaryProfile {
            employee_code: self.employee_code.clone(),
            base_salary: self.base_salary,
            insurance_salary: self.insurance_salary,
            responsibility_per_day: self.responsibility_per_day,
            allowances: self.allowances.clone(),
        }
    }
}
