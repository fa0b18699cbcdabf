//! HTTP request handlers for the workforce API.
//!
//! Every handler tags its log lines with a fresh correlation id and turns
//! [`EngineError`]s into JSON error bodies through [`ApiErrorResponse`].

use std::time::Instant;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{
    EXAM_EDIT, IMPORT, PAYROLL_APPROVE, PAYROLL_EDIT, Principal, TIMESHEET_APPROVE, TOOL_EDIT,
    authenticate,
};
use crate::calculation::calculate_payroll;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::import::ImportSummary;
use crate::services;
use crate::store::Database;
use crate::workflow::{PayrollStatus, TimesheetStatus};

use super::request::{
    CalculationRequest, CreatePayrollRequest, GradeEssayRequest, LoginRequest, PayrollListQuery,
    PayrollStatusRequest, ReplaceQuestionsRequest, SubmitAnswerRequest, TimesheetStatusRequest,
    ToolMovementRequest, UpdatePayrollRequest, UpdateTimesheetRequest,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/auth/login", post(login_handler))
        .route("/payroll/calculate", post(calculate_handler))
        .route(
            "/payrolls",
            post(create_payroll_handler).get(list_payrolls_handler),
        )
        .route("/payrolls/:id", put(update_payroll_handler))
        .route("/payrolls/:id/status", post(payroll_status_handler))
        .route("/timesheets/:id", put(update_timesheet_handler))
        .route("/timesheets/:id/status", post(timesheet_status_handler))
        .route("/exams/:id/answers", post(submit_answer_handler))
        .route(
            "/exams/:id/answers/:answer_id/essay",
            put(grade_essay_handler),
        )
        .route("/exams/:id/questions", put(replace_questions_handler))
        .route("/tools/:code/movements", post(tool_movement_handler))
        .route("/imports/payroll", post(import_payroll_handler))
        .route("/imports/violations", post(import_violations_handler))
        .route("/imports/employees", post(import_employees_handler))
        .with_state(state)
}

/// Unwraps a JSON body or builds the 400 response for it.
fn json_body<T>(
    correlation_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, Response> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's field-level message.
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::bad_request(error).into_response())
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    ApiErrorResponse::from(err).into_response()
}

fn respond<T: Serialize>(
    correlation_id: Uuid,
    status: StatusCode,
    result: EngineResult<T>,
) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Runs blocking work (password hashing, large imports) off the async
/// workers.
async fn blocking<T, F>(work: F) -> EngineResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> EngineResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .unwrap_or_else(|e| {
            Err(EngineError::Internal {
                message: e.to_string(),
            })
        })
}

/// Handler for POST /auth/login.
async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match json_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!(correlation_id = %correlation_id, username = %request.username, "Processing login");

    let db = state.db().clone();
    let guard = state.login_guard().clone();
    let result =
        blocking(move || authenticate(&db, &guard, &request.username, &request.password)).await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /payroll/calculate.
///
/// Stateless: calculates from the salary figures in the body.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll calculation");
    let request = match json_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    let result = calculate_payroll(&request.salary, &request.inputs, state.config().payroll());
    if let Ok(breakdown) = &result {
        info!(
            correlation_id = %correlation_id,
            employee_code = %breakdown.employee_code,
            total_salary = %breakdown.total_salary,
            duration_us = start_time.elapsed().as_micros(),
            "Calculation completed successfully"
        );
    }
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /payrolls.
async fn create_payroll_handler(
    State(state): State<AppState>,
    principal: Principal,
    payload: Result<Json<CreatePayrollRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match json_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!(
        correlation_id = %correlation_id,
        caller = %principal.employee_code,
        employee_code = %request.employee_code,
        "Creating payroll"
    );

    let result = principal.require(PAYROLL_EDIT).and_then(|()| {
        services::create_payroll(
            state.db(),
            state.config().payroll(),
            &request.employee_code,
            request.year,
            request.month,
            request.inputs,
        )
    });
    respond(correlation_id, StatusCode::CREATED, result)
}

/// Handler for GET /payrolls?year&month.
async fn list_payrolls_handler(
    State(state): State<AppState>,
    principal: Principal,
    query: Result<Query<PayrollListQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            return ApiErrorResponse::bad_request(ApiError::new(
                "VALIDATION_ERROR",
                rejection.body_text(),
            ))
            .into_response();
        }
    };

    let payrolls = services::list_payrolls(state.db(), &principal, query.year, query.month);
    info!(
        correlation_id = %correlation_id,
        caller = %principal.employee_code,
        year = query.year,
        month = query.month,
        count = payrolls.len(),
        "Listed payrolls"
    );
    (StatusCode::OK, Json(payrolls)).into_response()
}

/// Handler for PUT /payrolls/:id.
async fn update_payroll_handler(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<u64>,
    payload: Result<Json<UpdatePayrollRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match json_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!(correlation_id = %correlation_id, payroll_id = id, version = request.version, "Updating payroll");

    let result = principal.require(PAYROLL_EDIT).and_then(|()| {
        services::update_payroll_inputs(
            state.db(),
            state.config().payroll(),
            id,
            request.version,
            request.inputs,
        )
    });
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /payrolls/:id/status.
async fn payroll_status_handler(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<u64>,
    payload: Result<Json<PayrollStatusRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match json_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!(correlation_id = %correlation_id, payroll_id = id, status = %request.status, "Changing payroll status");

    let permission = match request.status {
        PayrollStatus::Approved | PayrollStatus::Disputed => PAYROLL_APPROVE,
        PayrollStatus::Draft | PayrollStatus::PendingApproval => PAYROLL_EDIT,
    };
    let result = principal.require(permission).and_then(|()| {
        services::change_payroll_status(state.db(), id, request.version, request.status)
    });
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for PUT /timesheets/:id.
async fn update_timesheet_handler(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<u64>,
    payload: Result<Json<UpdateTimesheetRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match json_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!(correlation_id = %correlation_id, caller = %principal.employee_code, timesheet_id = id, "Updating timesheet");

    let result = services::update_timesheet_hours(
        state.db(),
        &principal,
        id,
        request.version,
        request.hours,
        request.overtime_hours,
    );
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /timesheets/:id/status.
async fn timesheet_status_handler(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<u64>,
    payload: Result<Json<TimesheetStatusRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match json_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!(correlation_id = %correlation_id, timesheet_id = id, status = %request.status, "Changing timesheet status");

    let allowed = match request.status {
        TimesheetStatus::Draft | TimesheetStatus::Submitted => Ok(()),
        TimesheetStatus::Approved | TimesheetStatus::Rejected | TimesheetStatus::Closed => {
            principal.require(TIMESHEET_APPROVE)
        }
    };
    let result = allowed.and_then(|()| {
        services::change_timesheet_status(state.db(), id, request.version, request.status)
    });
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /exams/:id/answers.
///
/// The answer is recorded for the calling employee.
async fn submit_answer_handler(
    State(state): State<AppState>,
    principal: Principal,
    Path(exam_id): Path<u64>,
    payload: Result<Json<SubmitAnswerRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match json_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!(correlation_id = %correlation_id, exam_id, employee_code = %principal.employee_code, "Submitting exam answer");

    let result = services::submit_answer(
        state.db(),
        state.config().exams(),
        exam_id,
        &principal.employee_code,
        &request.answers,
        request.essay_points,
    );
    respond(correlation_id, StatusCode::CREATED, result)
}

/// Handler for PUT /exams/:id/answers/:answer_id/essay.
async fn grade_essay_handler(
    State(state): State<AppState>,
    principal: Principal,
    Path((exam_id, answer_id)): Path<(u64, u64)>,
    payload: Result<Json<GradeEssayRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match json_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!(correlation_id = %correlation_id, exam_id, answer_id, "Grading essay");

    let result = principal.require(EXAM_EDIT).and_then(|()| {
        services::grade_essay(
            state.db(),
            state.config().exams(),
            exam_id,
            answer_id,
            request.essay_points,
        )
    });
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for PUT /exams/:id/questions.
async fn replace_questions_handler(
    State(state): State<AppState>,
    principal: Principal,
    Path(exam_id): Path<u64>,
    payload: Result<Json<ReplaceQuestionsRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match json_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!(correlation_id = %correlation_id, exam_id, questions = request.questions.len(), "Replacing exam questions");

    let result = principal
        .require(EXAM_EDIT)
        .and_then(|()| services::replace_questions(state.db(), exam_id, request.questions));
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /tools/:code/movements.
async fn tool_movement_handler(
    State(state): State<AppState>,
    principal: Principal,
    Path(tool_code): Path<String>,
    payload: Result<Json<ToolMovementRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match json_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    info!(correlation_id = %correlation_id, tool_code = %tool_code, movement = ?request.movement, "Recording tool movement");

    let at = request.at.unwrap_or_else(|| Utc::now().naive_utc());
    let result = principal.require(TOOL_EDIT).and_then(|()| {
        services::record_movement(
            state.db(),
            &tool_code,
            request.movement,
            request.employee_code.as_deref(),
            at,
        )
    });
    respond(correlation_id, StatusCode::OK, result)
}

type ImportFn = fn(&Database, &EngineConfig, &str) -> EngineResult<ImportSummary>;

async fn run_import(
    state: AppState,
    principal: Principal,
    kind: &'static str,
    import: ImportFn,
    body: Bytes,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        caller = %principal.employee_code,
        import = kind,
        bytes = body.len(),
        "Processing import"
    );

    if let Err(err) = principal.require(IMPORT) {
        return error_response(correlation_id, err);
    }
    let data = match String::from_utf8(body.to_vec()) {
        Ok(data) => data,
        Err(_) => {
            return error_response(
                correlation_id,
                EngineError::UnreadableImport {
                    message: "file is not UTF-8 text".to_string(),
                },
            );
        }
    };

    let result = blocking(move || import(state.db(), state.config().config(), &data)).await;
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /imports/payroll.
async fn import_payroll_handler(
    State(state): State<AppState>,
    principal: Principal,
    body: Bytes,
) -> Response {
    run_import(state, principal, "payroll", services::import_payroll, body).await
}

/// Handler for POST /imports/violations.
async fn import_violations_handler(
    State(state): State<AppState>,
    principal: Principal,
    body: Bytes,
) -> Response {
    run_import(state, principal, "violations", services::import_violations, body).await
}

/// Handler for POST /imports/employees.
async fn import_employees_handler(
    State(state): State<AppState>,
    principal: Principal,
    body: Bytes,
) -> Response {
    run_import(state, principal, "employees", services::import_employees, body).await
}
