//! Bulk imports committed in one transaction.
//!
//! Each import reads the keys it plans against under a shared lock, parses
//! and plans the file without holding any lock, then writes every staged row
//! or none of them. Keys written by another request in between are checked
//! again inside the transaction.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::import::{
    EmployeeImport, ImportProfile, ImportSummary, PayrollImport, Sheet, ViolationImport,
    plan_import,
};
use crate::store::{Database, PayrollKey};

use super::payroll::new_payroll;

/// Imports monthly payroll inputs. Existing months are left untouched.
pub fn import_payroll(
    db: &Database,
    config: &EngineConfig,
    data: &str,
) -> EngineResult<ImportSummary> {
    let (payable, existing) = db.read(|t| {
        let payable: HashSet<String> = t.salaries.keys().cloned().collect();
        let existing: HashSet<PayrollKey> = t.payroll_keys().cloned().collect();
        (payable, existing)
    });
    let profile = PayrollImport::new(payable);
    let sheet = Sheet::parse_limited(data, profile.columns(), config.import().max_rows)?;
    let plan = plan_import(&profile, &sheet, &existing);

    let summary = db.transaction(|t| {
        let mut summary = plan.summary;
        for row in plan.inserts {
            let key = (row.employee_code.clone(), row.year, row.month);
            if t.payroll_id(&key).is_some() {
                debug!(
                    employee_code = %row.employee_code,
                    year = row.year,
                    month = row.month,
                    "Payroll created since planning"
                );
                summary.inserted -= 1;
                summary.duplicates += 1;
                continue;
            }
            let Some(salary) = t.salaries.get(&row.employee_code).cloned() else {
                summary.inserted -= 1;
                summary.not_found += 1;
                continue;
            };
            let id = t.next_id();
            let payroll =
                new_payroll(id, &salary, row.year, row.month, row.inputs, config.payroll())?;
            t.insert_payroll(payroll)?;
        }
        Ok(summary)
    })?;

    log_summary("payroll", &summary);
    Ok(summary)
}

/// Imports 5S violation counts, adding to counts already recorded.
pub fn import_violations(
    db: &Database,
    config: &EngineConfig,
    data: &str,
) -> EngineResult<ImportSummary> {
    let (employees, violation_types, existing) = db.read(|t| {
        let employees: HashSet<String> = t.employees.keys().cloned().collect();
        let violation_types: HashSet<String> = t.violation_types.keys().cloned().collect();
        let existing: HashSet<_> = t.violations.keys().cloned().collect();
        (employees, violation_types, existing)
    });
    let profile = ViolationImport::new(employees, violation_types);
    let sheet = Sheet::parse_limited(data, profile.columns(), config.import().max_rows)?;
    let plan = plan_import(&profile, &sheet, &existing);

    let summary = db.transaction(|t| {
        let mut summary = plan.summary;
        for record in plan.inserts {
            match t.violation_mut(&record.key()) {
                Some(stored) => {
                    stored.qty = stored.qty.saturating_add(record.qty);
                    summary.inserted -= 1;
                    summary.updated += 1;
                }
                None => t.insert_violation(record),
            }
        }
        for delta in plan.updates {
            match t.violation_mut(&delta.key()) {
                Some(stored) => stored.qty = stored.qty.saturating_add(delta.qty),
                None => t.insert_violation(delta),
            }
        }
        Ok(summary)
    })?;

    log_summary("violations", &summary);
    Ok(summary)
}

/// Imports employees. Existing codes are left untouched.
pub fn import_employees(
    db: &Database,
    config: &EngineConfig,
    data: &str,
) -> EngineResult<ImportSummary> {
    let existing: HashSet<String> = db.read(|t| t.employees.keys().cloned().collect());
    let profile = EmployeeImport;
    let sheet = Sheet::parse_limited(data, profile.columns(), config.import().max_rows)?;
    let plan = plan_import(&profile, &sheet, &existing);

    let summary = db.transaction(|t| {
        let mut summary = plan.summary;
        for employee in plan.inserts {
            if t.employees.contains_key(&employee.code) {
                summary.inserted -= 1;
                summary.duplicates += 1;
                continue;
            }
            t.insert_employee(employee);
        }
        Ok(summary)
    })?;

    log_summary("employees", &summary);
    Ok(summary)
}

fn log_summary(kind: &str, summary: &ImportSummary) {
    info!(
        import = kind,
        total_rows = summary.total_rows,
        inserted = summary.inserted,
        updated = summary.updated,
        duplicates = summary.duplicates,
        not_found = summary.not_found,
        errors = summary.errors.len(),
        "Committed import"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportConfig;
    use crate::error::EngineError;
    use crate::models::{Employee, SalaryProfile, Violation5S};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn seeded() -> Database {
        let db = Database::new();
        for code in ["NV0001", "NV0002"] {
            db.put_employee(Employee {
                code: code.to_string(),
                name: code.to_string(),
                department: "Press".to_string(),
                hire_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            });
        }
        db.put_salary_profile(SalaryProfile {
            employee_code: "NV0001".to_string(),
            base_salary: Some(Decimal::new(7_500_000, 0)),
            insurance_salary: None,
            responsibility_per_day: None,
            allowances: Default::default(),
        });
        db.put_violation_type(Violation5S {
            code: "5S-01".to_string(),
            name: "Untidy workstation".to_string(),
        });
        db
    }

    const PAYROLL_CSV: &str = "Mã NV,Năm,Tháng,Giờ công\n\
                               NV0001,2024,3,200\n\
                               NV0002,2024,3,200\n\
                               NV0404,2024,3,200\n";

    #[test]
    fn test_payroll_import_is_idempotent() {
        let db = seeded();
        let config = EngineConfig::default();

        let first = import_payroll(&db, &config, PAYROLL_CSV).unwrap();
        assert_eq!(first.inserted, 1);
        assert_eq!(first.not_found, 2);

        let second = import_payroll(&db, &config, PAYROLL_CSV).unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.duplicates, 1);
        assert_eq!(second.not_found, 2);
        assert_eq!(db.read(|t| t.payrolls.len()), 1);
    }

    #[test]
    fn test_imported_payroll_total_computed() {
        let db = seeded();
        import_payroll(&db, &EngineConfig::default(), PAYROLL_CSV).unwrap();
        let total = db.read(|t| t.payrolls.values().next().unwrap().total_salary);
        assert_eq!(total, Decimal::new(7_500_000, 0));
    }

    #[test]
    fn test_violation_import_merges_into_existing() {
        let db = seeded();
        let config = EngineConfig::default();
        let csv = "Employee Code,Violation,Date,Qty\nNV0001,5S-01,2024-01-15,2\n";

        import_violations(&db, &config, csv).unwrap();
        let second = import_violations(&db, &config, csv).unwrap();
        assert_eq!(second.updated, 1);

        let qty = db.read(|t| t.violations.values().next().unwrap().qty);
        assert_eq!(qty, 4);
    }

    #[test]
    fn test_missing_column_writes_nothing() {
        let db = seeded();
        let result = import_employees(&db, &EngineConfig::default(), "Mã NV,Họ tên\nNV0009,Binh\n");
        assert!(matches!(result, Err(EngineError::MissingColumn { .. })));
        assert_eq!(db.read(|t| t.employees.len()), 2);
    }

    #[test]
    fn test_employee_import_skips_existing_codes() {
        let db = seeded();
        let csv = "Employee Code,Name,Department,Hire Date\n\
                   NV0001,Dup,Press,2020-01-01\n\
                   NV0003,Chi,Paint,2023-05-02\n";
        let summary = import_employees(&db, &EngineConfig::default(), csv).unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(db.read(|t| t.employees["NV0001"].name.clone()), "NV0001");
    }

    #[test]
    fn test_file_over_row_limit_writes_nothing() {
        let db = seeded();
        let config = EngineConfig::new(
            Default::default(),
            Default::default(),
            Default::default(),
            ImportConfig { max_rows: 2 },
        );
        let result = import_payroll(&db, &config, PAYROLL_CSV);

        assert!(matches!(result, Err(EngineError::InvalidInput { ref field, .. }) if field == "file"));
        assert!(db.read(|t| t.payrolls.is_empty()));
    }

}
