//! HTTP API for the workforce engine.
//!
//! JSON endpoints over the calculators and services, plus CSV import
//! endpoints. The caller's identity arrives in `X-*` headers.

mod extract;
mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    CalculationRequest, CreatePayrollRequest, GradeEssayRequest, LoginRequest, PayrollListQuery,
    PayrollStatusRequest, ReplaceQuestionsRequest, SubmitAnswerRequest, TimesheetStatusRequest,
    ToolMovementRequest, UpdatePayrollRequest, UpdateTimesheetRequest,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
