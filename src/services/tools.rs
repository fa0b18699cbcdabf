//! Warehouse tool movements and their logs.

use chrono::NaiveDateTime;
use tracing::info;

use crate::calculation::apply_movement;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    IssueKind, IssueReturnLog, SupplyKind, Tool, ToolMovement, ToolSupplyLog,
};
use crate::store::Database;

/// Applies a movement to a stored tool and logs it.
///
/// Issues and returns name the employee involved; imports and scraps do not.
pub fn record_movement(
    db: &Database,
    tool_code: &str,
    movement: ToolMovement,
    employee_code: Option<&str>,
    at: NaiveDateTime,
) -> EngineResult<Tool> {
    let tool = db.transaction(|t| {
        let employee = match movement {
            ToolMovement::Issue(_) | ToolMovement::Return(_) => {
                let code = employee_code.ok_or_else(|| EngineError::InvalidInput {
                    field: "employee_code".to_string(),
                    message: "required for issue and return".to_string(),
                })?;
                if !t.employees.contains_key(code) {
                    return Err(EngineError::EmployeeNotFound {
                        code: code.to_string(),
                    });
                }
                Some(code.to_string())
            }
            ToolMovement::Import(_) | ToolMovement::Scrap(_) => None,
        };

        let tool = t.tool_mut(tool_code)?;
        apply_movement(tool, movement)?;
        let tool = tool.clone();

        let qty = movement.qty();
        let supply = |kind| ToolSupplyLog {
            tool_code: tool_code.to_string(),
            kind,
            qty,
            at,
        };
        let issue = |kind, employee_code: String| IssueReturnLog {
            tool_code: tool_code.to_string(),
            employee_code,
            kind,
            qty,
            at,
        };
        match (movement, employee) {
            (ToolMovement::Import(_), _) => t.push_supply_log(supply(SupplyKind::Import)),
            (ToolMovement::Scrap(_), _) => t.push_supply_log(supply(SupplyKind::Scrap)),
            (ToolMovement::Issue(_), Some(code)) => {
                t.push_issue_log(issue(IssueKind::Issue, code))
            }
            (ToolMovement::Return(_), Some(code)) => {
                t.push_issue_log(issue(IssueKind::Return, code))
            }
            (ToolMovement::Issue(_) | ToolMovement::Return(_), None) => {}
        }

        Ok(tool)
    })?;

    info!(
        tool_code = %tool_code,
        movement = ?movement,
        available_qty = tool.available_qty,
        "Recorded tool movement"
    );
    Ok(tool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Employee;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn seeded() -> Database {
        let db = Database::new();
        db.put_employee(Employee {
            code: "NV0001".to_string(),
            name: "An".to_string(),
            department: "Press".to_string(),
            hire_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        });
        db.put_tool(Tool {
            code: "DRL-01".to_string(),
            name: "Drill bit 6mm".to_string(),
            initial_qty: 10,
            imported_qty: 0,
            scrapped_qty: 0,
            issued_qty: 0,
            returned_qty: 0,
            available_qty: 0,
        })
        .unwrap();
        db
    }

    #[test]
    fn test_put_tool_recomputes_available() {
        let db = seeded();
        assert_eq!(db.read(|t| t.tools["DRL-01"].available_qty), 10);
    }

    #[test]
    fn test_issue_logs_employee() {
        let db = seeded();
        let tool =
            record_movement(&db, "DRL-01", ToolMovement::Issue(3), Some("NV0001"), at()).unwrap();
        assert_eq!(tool.available_qty, 7);

        let logs = db.read(|t| t.issue_logs.clone());
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].kind, IssueKind::Issue);
        assert_eq!(logs[0].employee_code, "NV0001");
    }

    #[test]
    fn test_import_and_scrap_log_supply() {
        let db = seeded();
        record_movement(&db, "DRL-01", ToolMovement::Import(5), None, at()).unwrap();
        let tool = record_movement(&db, "DRL-01", ToolMovement::Scrap(2), None, at()).unwrap();
        assert_eq!(tool.available_qty, 13);

        let kinds: Vec<SupplyKind> = db.read(|t| t.supply_logs.iter().map(|l| l.kind).collect());
        assert_eq!(kinds, vec![SupplyKind::Import, SupplyKind::Scrap]);
    }

    #[test]
    fn test_issue_requires_employee() {
        let db = seeded();
        assert!(matches!(
            record_movement(&db, "DRL-01", ToolMovement::Issue(1), None, at()),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_rejected_movement_writes_no_log() {
        let db = seeded();
        assert!(
            record_movement(&db, "DRL-01", ToolMovement::Issue(11), Some("NV0001"), at()).is_err()
        );
        assert!(db.read(|t| t.issue_logs.is_empty()));
        assert_eq!(db.read(|t| t.tools["DRL-01"].available_qty), 10);
    }
}
