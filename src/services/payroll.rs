//! Monthly payroll records.
//!
//! A payroll snapshots the employee's salary profile when it is created.
//! Its total is recomputed inside the same write whenever inputs change.

use tracing::info;

use crate::auth::Principal;
use crate::calculation::calculate_payroll;
use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{MonthlyPayroll, PayrollInputs, SalaryProfile};
use crate::store::{Database, check_version};
use crate::workflow::{PayrollStatus, ensure_editable, transition};

/// Builds a draft payroll from a salary profile and computes its total.
pub(crate) fn new_payroll(
    id: u64,
    profile: &SalaryProfile,
    year: i32,
    month: u32,
    inputs: PayrollInputs,
    config: &PayrollConfig,
) -> EngineResult<MonthlyPayroll> {
    let total_salary = calculate_payroll(profile, &inputs, config)?.total_salary;
    Ok(MonthlyPayroll {
        id,
        employee_code: profile.employee_code.clone(),
        year,
        month,
        base_salary: profile.base_salary,
        insurance_salary: profile.insurance_salary,
        responsibility_per_day: profile.responsibility_per_day,
        allowances: profile.allowances.clone(),
        inputs,
        total_salary,
        status: PayrollStatus::Draft,
        version: 1,
    })
}

fn validate_period(year: i32, month: u32) -> EngineResult<()> {
    if !(1..=12).contains(&month) {
        return Err(EngineError::InvalidInput {
            field: "month".to_string(),
            message: format!("{} is not a month", month),
        });
    }
    if !(2000..=2100).contains(&year) {
        return Err(EngineError::InvalidInput {
            field: "year".to_string(),
            message: format!("{} is out of range", year),
        });
    }
    Ok(())
}

/// Creates the payroll for an employee and month.
///
/// # Errors
///
/// * `EmployeeNotFound` / `SalaryProfileNotFound` when there is nothing to
///   snapshot
/// * `DuplicateRecord` when the month already has a payroll
pub fn create_payroll(
    db: &Database,
    config: &PayrollConfig,
    employee_code: &str,
    year: i32,
    month: u32,
    inputs: PayrollInputs,
) -> EngineResult<MonthlyPayroll> {
    validate_period(year, month)?;

    let payroll = db.transaction(|t| {
        if !t.employees.contains_key(employee_code) {
            return Err(EngineError::EmployeeNotFound {
                code: employee_code.to_string(),
            });
        }
        let profile = t.salaries.get(employee_code).cloned().ok_or_else(|| {
            EngineError::SalaryProfileNotFound {
                employee_code: employee_code.to_string(),
            }
        })?;
        if t.payroll_id(&(employee_code.to_string(), year, month)).is_some() {
            return Err(EngineError::DuplicateRecord {
                entity: "payroll",
                key: format!("{}/{}-{:02}", employee_code, year, month),
            });
        }

        let id = t.next_id();
        let payroll = new_payroll(id, &profile, year, month, inputs, config)?;
        t.insert_payroll(payroll.clone())?;
        Ok(payroll)
    })?;

    info!(
        payroll_id = payroll.id,
        employee_code = %payroll.employee_code,
        year,
        month,
        total_salary = %payroll.total_salary,
        "Created payroll"
    );
    Ok(payroll)
}

/// Replaces a payroll's inputs and recomputes its total.
///
/// # Errors
///
/// * `RecordLocked` when the status forbids edits
/// * `ConcurrencyConflict` when `expected_version` is stale
pub fn update_payroll_inputs(
    db: &Database,
    config: &PayrollConfig,
    id: u64,
    expected_version: u64,
    inputs: PayrollInputs,
) -> EngineResult<MonthlyPayroll> {
    let payroll = db.transaction(|t| {
        let payroll = t.payroll_mut(id)?;
        ensure_editable(payroll.status, id)?;
        check_version("payroll", id, expected_version, payroll.version)?;

        let breakdown = calculate_payroll(&payroll.salary_snapshot(), &inputs, config)?;
        payroll.inputs = inputs;
        payroll.total_salary = breakdown.total_salary;
        payroll.version += 1;
        Ok(payroll.clone())
    })?;

    info!(
        payroll_id = id,
        version = payroll.version,
        total_salary = %payroll.total_salary,
        "Updated payroll inputs"
    );
    Ok(payroll)
}

/// Moves a payroll to another status.
pub fn change_payroll_status(
    db: &Database,
    id: u64,
    expected_version: u64,
    to: PayrollStatus,
) -> EngineResult<MonthlyPayroll> {
    let payroll = db.transaction(|t| {
        let payroll = t.payroll_mut(id)?;
        check_version("payroll", id, expected_version, payroll.version)?;
        payroll.status = transition(payroll.status, to)?;
        payroll.version += 1;
        Ok(payroll.clone())
    })?;

    info!(payroll_id = id, status = %payroll.status, "Changed payroll status");
    Ok(payroll)
}

/// Lists a month's payrolls the caller may see.
pub fn list_payrolls(
    db: &Database,
    principal: &Principal,
    year: i32,
    month: u32,
) -> Vec<MonthlyPayroll> {
    db.read(|t| {
        t.payrolls
            .values()
            .filter(|p| p.year == year && p.month == month)
            .filter(|p| {
                t.employees
                    .get(&p.employee_code)
                    .is_some_and(|e| principal.can_view_department(&e.department))
            })
            .cloned()
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Allowances, Employee};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn seeded() -> Database {
        let db = Database::new();
        for (code, department) in [("NV0001", "Press"), ("NV0002", "Assembly")] {
            db.put_employee(Employee {
                code: code.to_string(),
                name: code.to_string(),
                department: department.to_string(),
                hire_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            });
            db.put_salary_profile(SalaryProfile {
                employee_code: code.to_string(),
                base_salary: Some(dec(7_500_000)),
                insurance_salary: None,
                responsibility_per_day: None,
                allowances: Allowances {
                    meal: Some(dec(500_000)),
                    ..Default::default()
                },
            });
        }
        db
    }

    fn hours(n: i64) -> PayrollInputs {
        PayrollInputs {
            regular_hours: Some(dec(n)),
            ..Default::default()
        }
    }

    fn principal(department: &str, permissions: &[&str]) -> Principal {
        Principal {
            employee_code: "NV9999".to_string(),
            department: department.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_create_snapshots_profile() {
        let db = seeded();
        let config = PayrollConfig::default();
        let payroll = create_payroll(&db, &config, "NV0001", 2024, 3, hours(200)).unwrap();

        assert_eq!(payroll.status, PayrollStatus::Draft);
        assert_eq!(payroll.version, 1);
        assert_eq!(payroll.allowances.meal, Some(dec(500_000)));
        assert_eq!(payroll.total_salary, dec(8_000_000));

        // Later profile changes leave the month alone.
        db.put_salary_profile(SalaryProfile {
            employee_code: "NV0001".to_string(),
            base_salary: Some(dec(9_000_000)),
            insurance_salary: None,
            responsibility_per_day: None,
            allowances: Allowances::default(),
        });
        let stored = db.read(|t| t.payrolls[&payroll.id].clone());
        assert_eq!(stored.base_salary, Some(dec(7_500_000)));
    }

    #[test]
    fn test_create_twice_is_duplicate() {
        let db = seeded();
        let config = PayrollConfig::default();
        create_payroll(&db, &config, "NV0001", 2024, 3, hours(200)).unwrap();
        assert!(matches!(
            create_payroll(&db, &config, "NV0001", 2024, 3, hours(100)),
            Err(EngineError::DuplicateRecord { .. })
        ));
    }

    #[test]
    fn test_create_without_profile() {
        let db = seeded();
        db.put_employee(Employee {
            code: "NV0003".to_string(),
            name: "New".to_string(),
            department: "Press".to_string(),
            hire_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        });
        assert!(matches!(
            create_payroll(&db, &PayrollConfig::default(), "NV0003", 2024, 3, hours(1)),
            Err(EngineError::SalaryProfileNotFound { .. })
        ));
    }

    #[test]
    fn test_update_recomputes_total_and_bumps_version() {
        let db = seeded();
        let config = PayrollConfig::default();
        let payroll = create_payroll(&db, &config, "NV0001", 2024, 3, hours(200)).unwrap();

        let updated = update_payroll_inputs(&db, &config, payroll.id, 1, hours(100)).unwrap();
        assert_eq!(updated.total_salary, dec(4_250_000));
        assert_eq!(updated.version, 2);
    }

    #[test]
    fn test_stale_version_conflicts() {
        let db = seeded();
        let config = PayrollConfig::default();
        let payroll = create_payroll(&db, &config, "NV0001", 2024, 3, hours(200)).unwrap();
        update_payroll_inputs(&db, &config, payroll.id, 1, hours(100)).unwrap();

        assert!(matches!(
            update_payroll_inputs(&db, &config, payroll.id, 1, hours(50)),
            Err(EngineError::ConcurrencyConflict { .. })
        ));
    }

    #[test]
    fn test_approved_payroll_cannot_be_edited() {
        let db = seeded();
        let config = PayrollConfig::default();
        let payroll = create_payroll(&db, &config, "NV0001", 2024, 3, hours(200)).unwrap();
        change_payroll_status(&db, payroll.id, 1, PayrollStatus::PendingApproval).unwrap();
        let approved = change_payroll_status(&db, payroll.id, 2, PayrollStatus::Approved).unwrap();

        let result = update_payroll_inputs(&db, &config, payroll.id, approved.version, hours(1));
        assert!(matches!(result, Err(EngineError::RecordLocked { .. })));

        let stored = db.read(|t| t.payrolls[&payroll.id].clone());
        assert_eq!(stored, approved);
    }

    #[test]
    fn test_list_filters_by_department() {
        let db = seeded();
        let config = PayrollConfig::default();
        create_payroll(&db, &config, "NV0001", 2024, 3, hours(200)).unwrap();
        create_payroll(&db, &config, "NV0002", 2024, 3, hours(200)).unwrap();
        create_payroll(&db, &config, "NV0002", 2024, 4, hours(200)).unwrap();

        let press = list_payrolls(&db, &principal("Press", &[]), 2024, 3);
        assert_eq!(press.len(), 1);
        assert_eq!(press[0].employee_code, "NV0001");

        let all = list_payrolls(&db, &principal("Press", &["ViewAll"]), 2024, 3);
        assert_eq!(all.len(), 2);
    }
}
