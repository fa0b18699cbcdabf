//! Core data models for the workforce engine.
//!
//! This module contains all the domain models used throughout the engine.

mod account;
mod calculation_result;
mod employee;
mod exam;
mod payroll;
mod salary;
mod timesheet;
mod tool;
mod violation;

pub use account::UserAccount;
pub use calculation_result::{
    AuditStep, Deductions, OvertimeCategory, OvertimeLine, PayrollBreakdown,
};
pub use employee::Employee;
pub use exam::{Exam, ExamAnswer, ExamKind, Question, ScoreTally};
pub use payroll::{MonthlyPayroll, PayrollInputs};
pub use salary::{Allowances, SalaryProfile};
pub use timesheet::Timesheet;
pub use tool::{
    IssueKind, IssueReturnLog, SupplyKind, Tool, ToolMovement, ToolSupplyLog,
};
pub use violation::{EmployeeViolation5S, Violation5S};
