//! Request types for the workforce API.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{PayrollInputs, Question, SalaryProfile, ToolMovement};
use crate::workflow::{PayrollStatus, TimesheetStatus};

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

/// Body of `POST /payroll/calculate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// Salary figures to calculate with.
    pub salary: SalaryProfile,
    /// The month's inputs.
    #[serde(default)]
    pub inputs: PayrollInputs,
}

/// Body of `POST /payrolls`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePayrollRequest {
    /// The employee paid.
    pub employee_code: String,
    /// Payroll year.
    pub year: i32,
    /// Payroll month.
    pub month: u32,
    /// Initial inputs.
    #[serde(default)]
    pub inputs: PayrollInputs,
}

/// Body of `PUT /payrolls/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePayrollRequest {
    /// Version the caller last read.
    pub version: u64,
    /// Replacement inputs.
    pub inputs: PayrollInputs,
}

/// Body of `POST /payrolls/:id/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollStatusRequest {
    /// Version the caller last read.
    pub version: u64,
    /// Requested status.
    pub status: PayrollStatus,
}

/// Query string of `GET /payrolls`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollListQuery {
    /// Payroll year.
    pub year: i32,
    /// Payroll month.
    pub month: u32,
}

/// Body of `PUT /timesheets/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTimesheetRequest {
    /// Version the caller last read.
    pub version: u64,
    /// Hours worked.
    pub hours: Decimal,
    /// Overtime hours worked.
    #[serde(default)]
    pub overtime_hours: Decimal,
}

/// Body of `POST /timesheets/:id/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimesheetStatusRequest {
    /// Version the caller last read.
    pub version: u64,
    /// Requested status.
    pub status: TimesheetStatus,
}

/// Body of `POST /exams/:id/answers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    /// Answer string, e.g. `"1.A-2.C"`.
    pub answers: String,
    /// Essay score, when graded on submission.
    #[serde(default)]
    pub essay_points: Option<Decimal>,
}

/// Body of `PUT /exams/:id/answers/:answer_id/essay`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeEssayRequest {
    /// Hand-graded essay score.
    pub essay_points: Decimal,
}

/// Body of `PUT /exams/:id/questions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceQuestionsRequest {
    /// The new question set.
    pub questions: Vec<Question>,
}

/// Body of `POST /tools/:code/movements`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMovementRequest {
    /// The movement, e.g. `{"kind": "issue", "qty": 2}`.
    pub movement: ToolMovement,
    /// Employee receiving or returning the tool.
    #[serde(default)]
    pub employee_code: Option<String>,
    /// When the movement happened; defaults to now.
    #[serde(default)]
    pub at: Option<NaiveDateTime>,
}
