//! Approval workflows for status-bearing records.
//!
//! Payrolls and timesheets move through a small set of statuses. Each status
//! enum implements [`Workflow`], and every status change goes through
//! [`transition`] so the allowed moves live in one place.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A status enum with a fixed set of allowed moves.
pub trait Workflow: Copy + Eq + fmt::Display + 'static {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    /// Statuses reachable from `self` in one step.
    fn allowed_transitions(self) -> &'static [Self];

    /// Whether the record's inputs may still be edited.
    fn is_editable(self) -> bool;

    /// The persisted integer code.
    fn code(self) -> u8;

    /// Parses a persisted integer code.
    fn from_code(code: u8) -> Option<Self>;
}

/// Validates a status change and returns the new status.
///
/// # Examples
///
/// ```
/// use workforce_engine::workflow::{transition, PayrollStatus};
///
/// let next = transition(PayrollStatus::Draft, PayrollStatus::PendingApproval).unwrap();
/// assert_eq!(next, PayrollStatus::PendingApproval);
/// assert!(transition(PayrollStatus::Draft, PayrollStatus::Approved).is_err());
/// ```
pub fn transition<S: Workflow>(from: S, to: S) -> EngineResult<S> {
    if from.allowed_transitions().contains(&to) {
        Ok(to)
    } else {
        Err(EngineError::InvalidTransition {
            entity: S::ENTITY,
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// Rejects edits to a record whose status is locked.
pub fn ensure_editable<S: Workflow>(status: S, id: impl fmt::Display) -> EngineResult<()> {
    if status.is_editable() {
        Ok(())
    } else {
        Err(EngineError::RecordLocked {
            entity: S::ENTITY,
            id: id.to_string(),
            status: status.to_string(),
        })
    }
}

/// Status of a monthly payroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    /// Being prepared; inputs can change.
    Draft,
    /// Sent to the approver.
    PendingApproval,
    /// Signed off; final.
    Approved,
    /// Employee or approver raised a dispute.
    Disputed,
}

impl Workflow for PayrollStatus {
    const ENTITY: &'static str = "payroll";

    fn allowed_transitions(self) -> &'static [Self] {
        match self {
            PayrollStatus::Draft => &[PayrollStatus::PendingApproval],
            PayrollStatus::PendingApproval => &[PayrollStatus::Approved, PayrollStatus::Disputed],
            PayrollStatus::Disputed => &[PayrollStatus::PendingApproval, PayrollStatus::Draft],
            PayrollStatus::Approved => &[],
        }
    }

    fn is_editable(self) -> bool {
        matches!(self, PayrollStatus::Draft | PayrollStatus::Disputed)
    }

    fn code(self) -> u8 {
        match self {
            PayrollStatus::Draft => 0,
            PayrollStatus::PendingApproval => 1,
            PayrollStatus::Approved => 2,
            PayrollStatus::Disputed => 3,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(PayrollStatus::Draft),
            1 => Some(PayrollStatus::PendingApproval),
            2 => Some(PayrollStatus::Approved),
            3 => Some(PayrollStatus::Disputed),
            _ => None,
        }
    }
}

impl fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PayrollStatus::Draft => "draft",
            PayrollStatus::PendingApproval => "pending_approval",
            PayrollStatus::Approved => "approved",
            PayrollStatus::Disputed => "disputed",
        };
        f.write_str(name)
    }
}

/// Status of a timesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimesheetStatus {
    /// Being filled in.
    Draft,
    /// Waiting for the line manager.
    Submitted,
    /// Accepted by the line manager.
    Approved,
    /// Sent back for correction.
    Rejected,
    /// Closed into payroll.
    Closed,
}

impl Workflow for TimesheetStatus {
    const ENTITY: &'static str = "timesheet";

    fn allowed_transitions(self) -> &'static [Self] {
        match self {
            TimesheetStatus::Draft => &[TimesheetStatus::Submitted],
            TimesheetStatus::Submitted => &[TimesheetStatus::Approved, TimesheetStatus::Rejected],
            TimesheetStatus::Approved => &[TimesheetStatus::Closed],
            TimesheetStatus::Rejected => &[TimesheetStatus::Draft],
            TimesheetStatus::Closed => &[],
        }
    }

    fn is_editable(self) -> bool {
        matches!(self, TimesheetStatus::Draft | TimesheetStatus::Rejected)
    }

    fn code(self) -> u8 {
        match self {
            TimesheetStatus::Draft => 0,
            TimesheetStatus::Submitted => 1,
            TimesheetStatus::Approved => 2,
            TimesheetStatus::Rejected => 3,
            TimesheetStatus::Closed => 4,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TimesheetStatus::Draft),
            1 => Some(TimesheetStatus::Submitted),
            2 => Some(TimesheetStatus::Approved),
            3 => Some(TimesheetStatus::Rejected),
            4 => Some(TimesheetStatus::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for TimesheetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimesheetStatus::Draft => "draft",
            TimesheetStatus::Submitted => "submitted",
            TimesheetStatus::Approved => "approved",
            TimesheetStatus::Rejected => "rejected",
            TimesheetStatus::Closed => "closed",
        };
        f.write_str(name)
    }
}
