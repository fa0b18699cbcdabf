//! Import profiles for the payroll, 5S violation and employee templates.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{Employee, EmployeeViolation5S, PayrollInputs};

use super::cells::{parse_date, parse_decimal, parse_integer};
use super::dedup::{DuplicatePolicy, ImportProfile, ReferenceCheck};
use super::sheet::{ColumnSpec, SheetRow};

const EMPLOYEE_CODE_ALIASES: &[&str] = &["Mã NV", "Mã nhân viên", "Employee Code", "EmployeeCode"];

fn optional_amount(row: &SheetRow, column: &str) -> Result<Option<Decimal>, String> {
    let Some(raw) = row.get(column) else {
        return Ok(None);
    };
    let value = parse_decimal(raw).map_err(|e| format!("{}: {}", column, e))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(format!("{}: must not be negative", column));
    }
    Ok(Some(value))
}

/// A payroll row from the monthly hours template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollImportRow {
    /// The employee paid.
    pub employee_code: String,
    /// Payroll year.
    pub year: i32,
    /// Payroll month.
    pub month: u32,
    /// The month's variable inputs.
    pub inputs: PayrollInputs,
}

/// Imports monthly payroll inputs keyed by employee, year and month.
///
/// Existing payrolls are never overwritten; a repeated key is a duplicate.
/// Employees without a salary profile cannot be paid and count as not found.
#[derive(Debug, Clone)]
pub struct PayrollImport {
    payable_employees: HashSet<String>,
}

impl PayrollImport {
    /// Creates the profile from the codes of employees that have a salary
    /// profile.
    pub fn new(payable_employees: HashSet<String>) -> Self {
        Self { payable_employees }
    }
}

const PAYROLL_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required("employee_code", EMPLOYEE_CODE_ALIASES),
    ColumnSpec::required("year", &["Năm", "Year"]),
    ColumnSpec::required("month", &["Tháng", "Month"]),
    ColumnSpec::optional("regular_hours", &["Giờ công", "Regular Hours"]),
    ColumnSpec::optional(
        "weekday_overtime_hours",
        &["Tăng ca ngày thường", "Weekday OT", "OT 150"],
    ),
    ColumnSpec::optional(
        "weekend_overtime_hours",
        &["Tăng ca cuối tuần", "Weekend OT", "OT 200"],
    ),
    ColumnSpec::optional(
        "holiday_overtime_hours",
        &["Tăng ca ngày lễ", "Holiday OT", "OT 300"],
    ),
    ColumnSpec::optional(
        "night_overtime_hours",
        &["Tăng ca đêm", "Night OT", "OT 130"],
    ),
    ColumnSpec::optional("responsible_days", &["Ngày trách nhiệm", "Responsible Days"]),
    ColumnSpec::optional("penalty", &["Phạt", "Penalty"]),
    ColumnSpec::optional("union_fee", &["Công đoàn", "Union Fee"]),
    ColumnSpec::optional(
        "personal_income_tax",
        &["Thuế TNCN", "PIT", "Personal Income Tax"],
    ),
    ColumnSpec::optional("advance", &["Tạm ứng", "Advance"]),
];

impl ImportProfile for PayrollImport {
    type Record = PayrollImportRow;
    type Key = (String, i32, u32);

    fn columns(&self) -> &'static [ColumnSpec] {
        PAYROLL_COLUMNS
    }

    fn parse_row(&self, row: &SheetRow) -> Result<PayrollImportRow, String> {
        let employee_code = row.require("employee_code")?.to_string();
        let year: i32 = parse_integer(row.require("year")?)?;
        let month: u32 = parse_integer(row.require("month")?)?;
        if !(2000..=2100).contains(&year) {
            return Err(format!("year {} is out of range", year));
        }
        if !(1..=12).contains(&month) {
            return Err(format!("month {} is out of range", month));
        }

        let inputs = PayrollInputs {
            regular_hours: optional_amount(row, "regular_hours")?,
            weekday_overtime_hours: optional_amount(row, "weekday_overtime_hours")?,
            weekend_overtime_hours: optional_amount(row, "weekend_overtime_hours")?,
            holiday_overtime_hours: optional_amount(row, "holiday_overtime_hours")?,
            night_overtime_hours: optional_amount(row, "night_overtime_hours")?,
            responsible_days: optional_amount(row, "responsible_days")?,
            penalty: optional_amount(row, "penalty")?,
            union_fee: optional_amount(row, "union_fee")?,
            personal_income_tax: optional_amount(row, "personal_income_tax")?,
            advance: optional_amount(row, "advance")?,
        };

        Ok(PayrollImportRow {
            employee_code,
            year,
            month,
            inputs,
        })
    }

    fn key(&self, record: &PayrollImportRow) -> Self::Key {
        (record.employee_code.clone(), record.year, record.month)
    }

    fn check_references(&self, record: &PayrollImportRow) -> ReferenceCheck {
        if self.payable_employees.contains(&record.employee_code) {
            ReferenceCheck::Found
        } else {
            ReferenceCheck::NotFound(format!(
                "employee {} has no salary profile",
                record.employee_code
            ))
        }
    }
}

/// Imports 5S violation counts keyed by employee, violation and date.
///
/// Repeated keys are merged by adding their quantities, both within the
/// file and into records that already exist.
#[derive(Debug, Clone)]
pub struct ViolationImport {
    employees: HashSet<String>,
    violations: HashSet<String>,
}

impl ViolationImport {
    /// Creates the profile from the known employee and violation codes.
    pub fn new(employees: HashSet<String>, violations: HashSet<String>) -> Self {
        Self {
            employees,
            violations,
        }
    }
}

const VIOLATION_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required("employee_code", EMPLOYEE_CODE_ALIASES),
    ColumnSpec::required("violation_code", &["Mã lỗi", "Lỗi vi phạm", "Violation", "Violation Code"]),
    ColumnSpec::required("date", &["Ngày", "Ngày vi phạm", "Date"]),
    ColumnSpec::optional("qty", &["Số lượng", "Quantity", "Qty"]),
];

impl ImportProfile for ViolationImport {
    type Record = EmployeeViolation5S;
    type Key = (String, String, NaiveDate);

    fn columns(&self) -> &'static [ColumnSpec] {
        VIOLATION_COLUMNS
    }

    fn parse_row(&self, row: &SheetRow) -> Result<EmployeeViolation5S, String> {
        let employee_code = row.require("employee_code")?.to_string();
        let violation_code = row.require("violation_code")?.to_string();
        let date = parse_date(row.require("date")?)?;
        let qty: u32 = match row.get("qty") {
            Some(raw) => parse_integer(raw)?,
            None => 1,
        };
        if qty == 0 {
            return Err("qty must be at least 1".to_string());
        }

        Ok(EmployeeViolation5S {
            employee_code,
            violation_code,
            date,
            qty,
        })
    }

    fn key(&self, record: &EmployeeViolation5S) -> Self::Key {
        record.key()
    }

    fn check_references(&self, record: &EmployeeViolation5S) -> ReferenceCheck {
        if !self.employees.contains(&record.employee_code) {
            return ReferenceCheck::NotFound(format!(
                "employee {} does not exist",
                record.employee_code
            ));
        }
        if !self.violations.contains(&record.violation_code) {
            return ReferenceCheck::Invalid(format!(
                "unknown violation code {}",
                record.violation_code
            ));
        }
        ReferenceCheck::Found
    }

    fn policy(&self) -> DuplicatePolicy {
        DuplicatePolicy::Merge
    }

    fn merge(&self, target: &mut EmployeeViolation5S, incoming: &EmployeeViolation5S) {
        target.qty = target.qty.saturating_add(incoming.qty);
    }
}

/// Imports employees keyed by employee code.
#[derive(Debug, Clone, Default)]
pub struct EmployeeImport;

const EMPLOYEE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required("employee_code", EMPLOYEE_CODE_ALIASES),
    ColumnSpec::required("name", &["Họ tên", "Họ và tên", "Name", "Full Name"]),
    ColumnSpec::required("department", &["Bộ phận", "Phòng ban", "Department"]),
    ColumnSpec::required("hire_date", &["Ngày vào làm", "Hire Date"]),
];

impl ImportProfile for EmployeeImport {
    type Record = Employee;
    type Key = String;

    fn columns(&self) -> &'static [ColumnSpec] {
        EMPLOYEE_COLUMNS
    }

    fn parse_row(&self, row: &SheetRow) -> Result<Employee, String> {
        Ok(Employee {
            code: row.require("employee_code")?.to_string(),
            name: row.require("name")?.to_string(),
            department: row.require("department")?.to_string(),
            hire_date: parse_date(row.require("hire_date")?)?,
        })
    }

    fn key(&self, record: &Employee) -> String {
        record.code.clone()
    }

    fn check_references(&self, _record: &Employee) -> ReferenceCheck {
        ReferenceCheck::Found
    }
}
