//! Calculation logic for the workforce engine.
//!
//! This module contains the pure business rules: monthly salary
//! calculation, exam answer scoring and the tool stock ledger. None of them
//! touch storage; services load the inputs and persist the results.

mod exam_scoring;
mod payroll;
mod tool_ledger;

pub use exam_scoring::{
    ExamOutcome, grade_attempt, parse_answers, score_simple, score_trial_run,
};
pub use payroll::{calculate_payroll, hourly_base};
pub use tool_ledger::{apply_movement, available_quantity, recompute_available};
