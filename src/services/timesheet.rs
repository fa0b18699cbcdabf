//! Timesheet edits and approval.

use rust_decimal::Decimal;
use tracing::info;

use crate::auth::{Principal, TIMESHEET_APPROVE};
use crate::error::{EngineError, EngineResult};
use crate::models::Timesheet;
use crate::store::{Database, Tables, check_version};
use crate::workflow::{TimesheetStatus, ensure_editable, transition};

/// The owner may edit their own timesheet. Anyone else needs
/// `Timesheet.Approve` and visibility of the owner's department.
fn ensure_may_edit(tables: &Tables, principal: &Principal, owner: &str) -> EngineResult<()> {
    if principal.employee_code.eq_ignore_ascii_case(owner) {
        return Ok(());
    }
    let visible = tables
        .employees
        .get(owner)
        .is_some_and(|e| principal.can_view_department(&e.department));
    if visible {
        principal.require(TIMESHEET_APPROVE)
    } else {
        Err(EngineError::PermissionDenied {
            permission: TIMESHEET_APPROVE.to_string(),
        })
    }
}

/// Changes the hours booked on a timesheet.
///
/// Only draft and rejected timesheets can be edited.
///
/// # Errors
///
/// * `PermissionDenied` when the caller neither owns the timesheet nor may
///   approve timesheets of the owner's department
/// * `RecordLocked` when the status forbids edits
/// * `ConcurrencyConflict` when `expected_version` is stale
pub fn update_timesheet_hours(
    db: &Database,
    principal: &Principal,
    id: u64,
    expected_version: u64,
    hours: Decimal,
    overtime_hours: Decimal,
) -> EngineResult<Timesheet> {
    for (field, value) in [("hours", hours), ("overtime_hours", overtime_hours)] {
        if value < Decimal::ZERO || value > Decimal::from(24) {
            return Err(EngineError::InvalidInput {
                field: field.to_string(),
                message: "must be between 0 and 24".to_string(),
            });
        }
    }

    let timesheet = db.transaction(|t| {
        let owner = t
            .timesheets
            .get(&id)
            .map(|ts| ts.employee_code.clone())
            .ok_or_else(|| EngineError::RecordNotFound {
                entity: "timesheet",
                id: id.to_string(),
            })?;
        ensure_may_edit(t, principal, &owner)?;

        let timesheet = t.timesheet_mut(id)?;
        ensure_editable(timesheet.status, id)?;
        check_version("timesheet", id, expected_version, timesheet.version)?;
        timesheet.hours = hours;
        timesheet.overtime_hours = overtime_hours;
        timesheet.version += 1;
        Ok(timesheet.clone())
    })?;

    info!(
        timesheet_id = id,
        caller = %principal.employee_code,
        hours = %hours,
        "Updated timesheet"
    );
    Ok(timesheet)
}

/// Moves a timesheet to another status.
pub fn change_timesheet_status(
    db: &Database,
    id: u64,
    expected_version: u64,
    to: TimesheetStatus,
) -> EngineResult<Timesheet> {
    let timesheet = db.transaction(|t| {
        let timesheet = t.timesheet_mut(id)?;
        check_version("timesheet", id, expected_version, timesheet.version)?;
        timesheet.status = transition(timesheet.status, to)?;
        timesheet.version += 1;
        Ok(timesheet.clone())
    })?;

    info!(timesheet_id = id, status = %timesheet.status, "Changed timesheet status");
    Ok(timesheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Employee;
    use chrono::NaiveDate;

    fn principal(employee_code: &str, department: &str, permissions: &[&str]) -> Principal {
        Principal {
            employee_code: employee_code.to_string(),
            department: department.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn owner() -> Principal {
        principal("NV0001", "Press", &[])
    }

    fn seeded() -> (Database, u64) {
        let db = Database::new();
        db.put_employee(Employee {
            code: "NV0001".to_string(),
            name: "An".to_string(),
            department: "Press".to_string(),
            hire_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        });
        let id = db.insert_timesheet(Timesheet {
            id: 0,
            employee_code: "NV0001".to_string(),
            work_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            hours: Decimal::from(8),
            overtime_hours: Decimal::ZERO,
            status: TimesheetStatus::Draft,
            version: 0,
        });
        (db, id)
    }

    #[test]
    fn test_full_approval_path() {
        let (db, id) = seeded();
        change_timesheet_status(&db, id, 1, TimesheetStatus::Submitted).unwrap();
        change_timesheet_status(&db, id, 2, TimesheetStatus::Approved).unwrap();
        let closed = change_timesheet_status(&db, id, 3, TimesheetStatus::Closed).unwrap();
        assert_eq!(closed.status, TimesheetStatus::Closed);
        assert_eq!(closed.version, 4);
    }

    #[test]
    fn test_skipping_submission_rejected() {
        let (db, id) = seeded();
        assert!(matches!(
            change_timesheet_status(&db, id, 1, TimesheetStatus::Approved),
            Err(EngineError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_rejected_timesheet_editable_again() {
        let (db, id) = seeded();
        change_timesheet_status(&db, id, 1, TimesheetStatus::Submitted).unwrap();
        change_timesheet_status(&db, id, 2, TimesheetStatus::Rejected).unwrap();
        let edited =
            update_timesheet_hours(&db, &owner(), id, 3, Decimal::from(7), Decimal::ONE).unwrap();
        assert_eq!(edited.hours, Decimal::from(7));
    }

    #[test]
    fn test_approved_timesheet_edit_leaves_record_unchanged() {
        let (db, id) = seeded();
        change_timesheet_status(&db, id, 1, TimesheetStatus::Submitted).unwrap();
        let approved = change_timesheet_status(&db, id, 2, TimesheetStatus::Approved).unwrap();

        assert!(matches!(
            update_timesheet_hours(
                &db,
                &owner(),
                id,
                approved.version,
                Decimal::from(4),
                Decimal::ZERO
            ),
            Err(EngineError::RecordLocked { .. })
        ));
        assert_eq!(db.read(|t| t.timesheets[&id].clone()), approved);
    }

    #[test]
    fn test_hours_out_of_range() {
        let (db, id) = seeded();
        assert!(
            update_timesheet_hours(&db, &owner(), id, 1, Decimal::from(25), Decimal::ZERO).is_err()
        );
    }

    #[test]
    fn test_other_employee_cannot_edit() {
        let (db, id) = seeded();
        let before = db.read(|t| t.timesheets[&id].clone());

        let colleague = principal("NV0002", "Press", &[]);
        assert!(matches!(
            update_timesheet_hours(&db, &colleague, id, 1, Decimal::from(2), Decimal::ZERO),
            Err(EngineError::PermissionDenied { .. })
        ));
        assert_eq!(db.read(|t| t.timesheets[&id].clone()), before);
    }

    #[test]
    fn test_approver_edits_only_within_department() {
        let (db, id) = seeded();

        let elsewhere = principal("NV0900", "Paint", &["Timesheet.Approve"]);
        assert!(matches!(
            update_timesheet_hours(&db, &elsewhere, id, 1, Decimal::from(6), Decimal::ZERO),
            Err(EngineError::PermissionDenied { .. })
        ));

        let supervisor = principal("NV0900", "Press", &["Timesheet.Approve"]);
        let edited =
            update_timesheet_hours(&db, &supervisor, id, 1, Decimal::from(6), Decimal::ZERO)
                .unwrap();
        assert_eq!(edited.hours, Decimal::from(6));
    }
}
