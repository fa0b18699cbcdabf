//! Reads the caller's identity from request headers.
//!
//! The fronting gateway authenticates the session and forwards the claims as
//! `X-Employee-Code`, `X-Department` and a comma-separated `X-Permissions`.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::auth::Principal;

use super::response::ApiErrorResponse;

const EMPLOYEE_CODE_HEADER: &str = "x-employee-code";
const DEPARTMENT_HEADER: &str = "x-department";
const PERMISSIONS_HEADER: &str = "x-permissions";

fn header<'a>(parts: &'a Parts, name: &str) -> Result<Option<&'a str>, ApiErrorResponse> {
    match parts.headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|v| Some(v.trim()).filter(|v| !v.is_empty()))
            .map_err(|_| ApiErrorResponse::unauthorized(format!("{} is not valid text", name))),
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let employee_code = header(parts, EMPLOYEE_CODE_HEADER)?
            .ok_or_else(|| ApiErrorResponse::unauthorized("missing X-Employee-Code header"))?;
        let department = header(parts, DEPARTMENT_HEADER)?
            .ok_or_else(|| ApiErrorResponse::unauthorized("missing X-Department header"))?;
        let permissions = header(parts, PERMISSIONS_HEADER)?
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Principal {
            employee_code: employee_code.to_string(),
            department: department.to_string(),
            permissions,
        })
    }
}
