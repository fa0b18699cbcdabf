//! Operations that read and write the [`Database`](crate::store::Database).
//!
//! Each operation runs in one store transaction, validates status and
//! version before writing, and recomputes derived totals in the same write.

mod exams;
mod imports;
mod payroll;
mod timesheet;
mod tools;

pub use exams::{grade_essay, replace_questions, submit_answer};
pub use imports::{import_employees, import_payroll, import_violations};
pub use payroll::{change_payroll_status, create_payroll, list_payrolls, update_payroll_inputs};
pub use timesheet::{change_timesheet_status, update_timesheet_hours};
pub use tools::record_movement;
