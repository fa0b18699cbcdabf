//! The authenticated caller.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::UserAccount;

/// Permission that lifts the own-department restriction on listings.
pub const VIEW_ALL: &str = "ViewAll";
/// Create payrolls and edit their inputs.
pub const PAYROLL_EDIT: &str = "Payroll.Edit";
/// Approve or dispute payrolls.
pub const PAYROLL_APPROVE: &str = "Payroll.Approve";
/// Approve, reject or close timesheets.
pub const TIMESHEET_APPROVE: &str = "Timesheet.Approve";
/// Maintain exam questions.
pub const EXAM_EDIT: &str = "Exam.Edit";
/// Record tool movements.
pub const TOOL_EDIT: &str = "Tool.Edit";
/// Run bulk imports.
pub const IMPORT: &str = "Import";

/// Who is making a request and what they may do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The caller's employee code.
    pub employee_code: String,
    /// The caller's department.
    pub department: String,
    /// Granted permission strings.
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Principal {
    /// Whether the caller holds a permission. Names compare
    /// case-insensitively.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p.eq_ignore_ascii_case(permission))
    }

    /// Fails with `PermissionDenied` unless the caller holds `permission`.
    pub fn require(&self, permission: &str) -> EngineResult<()> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(EngineError::PermissionDenied {
                permission: permission.to_string(),
            })
        }
    }

    /// Whether the caller may see records of `department`.
    pub fn can_view_department(&self, department: &str) -> bool {
        self.department.eq_ignore_ascii_case(department) || self.has_permission(VIEW_ALL)
    }
}

impl From<&UserAccount> for Principal {
    fn from(account: &UserAccount) -> Self {
        Self {
            employee_code: account.employee_code.clone(),
            department: account.department.clone(),
            permissions: account.permissions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(department: &str, permissions: &[&str]) -> Principal {
        Principal {
            employee_code: "NV0001".to_string(),
            department: department.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_own_department_visible() {
        let p = principal("Press", &[]);
        assert!(p.can_view_department("Press"));
        assert!(p.can_view_department("press"));
        assert!(!p.can_view_department("Assembly"));
    }

    #[test]
    fn test_view_all_sees_every_department() {
        let p = principal("Press", &["viewall"]);
        assert!(p.can_view_department("Assembly"));
    }

    #[test]
    fn test_has_permission() {
        let p = principal("Press", &["Payroll.Edit"]);
        assert!(p.has_permission("Payroll.Edit"));
        assert!(!p.has_permission("Payroll.Approve"));
        assert!(p.require(PAYROLL_EDIT).is_ok());
        assert!(matches!(
            p.require(IMPORT),
            Err(EngineError::PermissionDenied { .. })
        ));
    }
}
