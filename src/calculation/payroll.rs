//! Monthly salary calculation.
//!
//! The salary formula is fixed:
//!
//! ```text
//! hourly_base = base_salary / standard_days / standard_hours
//! gross       = regular_hours * hourly_base
//!             + Σ overtime_hours_i * hourly_base * factor_i
//!             + fixed allowances + responsible_days * responsibility_per_day
//! insurance   = insurance_salary * insurance_rate
//! final       = gross - (penalty + union_fee + personal_income_tax + insurance) - advance
//! ```
//!
//! Every nullable input counts as zero. Intermediate values keep full decimal
//! precision; only the final salary is rounded to `rounding_scale` places,
//! midpoint away from zero.

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, Deductions, OvertimeCategory, OvertimeLine, PayrollBreakdown, PayrollInputs,
    SalaryProfile,
};

fn or_zero(value: Option<Decimal>) -> Decimal {
    value.unwrap_or_default()
}

/// Unwraps a checked result, naming the step whose amount left the decimal
/// range.
fn in_range(value: Option<Decimal>, step: &str) -> EngineResult<Decimal> {
    value.ok_or_else(|| EngineError::InvalidInput {
        field: step.to_string(),
        message: "amount is too large to calculate".to_string(),
    })
}

/// Returns `base_salary / standard_days / standard_hours`.
///
/// # Examples
///
/// ```
/// use workforce_engine::calculation::hourly_base;
/// use workforce_engine::config::PayrollConfig;
/// use rust_decimal::Decimal;
///
/// let rate = hourly_base(Some(Decimal::new(7_500_000, 0)), &PayrollConfig::default()).unwrap();
/// assert_eq!(rate, Decimal::new(37_500, 0));
/// ```
pub fn hourly_base(base_salary: Option<Decimal>, config: &PayrollConfig) -> EngineResult<Decimal> {
    if config.standard_days.is_zero() || config.standard_hours.is_zero() {
        return Err(EngineError::CalculationError {
            message: "standard_days and standard_hours must be non-zero".to_string(),
        });
    }
    in_range(
        or_zero(base_salary)
            .checked_div(config.standard_days)
            .and_then(|daily| daily.checked_div(config.standard_hours)),
        "hourly_base",
    )
}

fn ensure_non_negative(field: &str, value: Option<Decimal>) -> EngineResult<()> {
    match value {
        Some(v) if v.is_sign_negative() && !v.is_zero() => Err(EngineError::InvalidInput {
            field: field.to_string(),
            message: "must not be negative".to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_inputs(inputs: &PayrollInputs) -> EngineResult<()> {
    ensure_non_negative("regular_hours", inputs.regular_hours)?;
    ensure_non_negative("weekday_overtime_hours", inputs.weekday_overtime_hours)?;
    ensure_non_negative("weekend_overtime_hours", inputs.weekend_overtime_hours)?;
    ensure_non_negative("holiday_overtime_hours", inputs.holiday_overtime_hours)?;
    ensure_non_negative("night_overtime_hours", inputs.night_overtime_hours)?;
    ensure_non_negative("responsible_days", inputs.responsible_days)?;
    ensure_non_negative("penalty", inputs.penalty)?;
    ensure_non_negative("union_fee", inputs.union_fee)?;
    ensure_non_negative("personal_income_tax", inputs.personal_income_tax)?;
    ensure_non_negative("advance", inputs.advance)
}

/// Calculates an employee's monthly salary.
///
/// # Arguments
///
/// * `salary` - The salary snapshot (base, insurance salary, allowances)
/// * `inputs` - The month's hours, responsible days and deductions
/// * `config` - Standard days/hours, overtime factors and insurance rate
///
/// # Errors
///
/// Returns `InvalidInput` if any hour, day or deduction value is negative.
///
/// # Examples
///
/// ```
/// use workforce_engine::calculation::calculate_payroll;
/// use workforce_engine::config::PayrollConfig;
/// use workforce_engine::models::{PayrollInputs, SalaryProfile};
/// use rust_decimal::Decimal;
///
/// let salary = SalaryProfile {
///     employee_code: "NV0001".to_string(),
///     base_salary: Some(Decimal::new(7_500_000, 0)),
///     insurance_salary: None,
///     responsibility_per_day: None,
///     allowances: Default::default(),
/// };
/// let inputs = PayrollInputs {
///     regular_hours: Some(Decimal::new(200, 0)),
///     ..Default::default()
/// };
///
/// let result = calculate_payroll(&salary, &inputs, &PayrollConfig::default()).unwrap();
/// assert_eq!(result.total_salary, Decimal::new(7_500_000, 0));
/// ```
pub fn calculate_payroll(
    salary: &SalaryProfile,
    inputs: &PayrollInputs,
    config: &PayrollConfig,
) -> EngineResult<PayrollBreakdown> {
    validate_inputs(inputs)?;

    let mut steps: Vec<AuditStep> = Vec::new();
    let mut step_number: u32 = 1;

    // Hourly base
    let base_salary = or_zero(salary.base_salary);
    let hourly = hourly_base(salary.base_salary, config)?;
    steps.push(AuditStep {
        step_number,
        rule_id: "hourly_base".to_string(),
        rule_name: "Hourly Base".to_string(),
        input: serde_json::json!({
            "base_salary": base_salary.normalize().to_string(),
            "standard_days": config.standard_days.normalize().to_string(),
            "standard_hours": config.standard_hours.normalize().to_string()
        }),
        output: serde_json::json!({ "hourly_base": hourly.normalize().to_string() }),
        reasoning: format!(
            "{} / {} / {} = {}",
            base_salary.normalize(),
            config.standard_days.normalize(),
            config.standard_hours.normalize(),
            hourly.normalize()
        ),
    });
    step_number += 1;

    // Regular hours
    let regular_hours = or_zero(inputs.regular_hours);
    let regular_pay = in_range(regular_hours.checked_mul(hourly), "regular_pay")?;
    steps.push(AuditStep {
        step_number,
        rule_id: "regular_pay".to_string(),
        rule_name: "Regular Pay".to_string(),
        input: serde_json::json!({ "regular_hours": regular_hours.normalize().to_string() }),
        output: serde_json::json!({ "regular_pay": regular_pay.normalize().to_string() }),
        reasoning: format!(
            "{}h x {} = {}",
            regular_hours.normalize(),
            hourly.normalize(),
            regular_pay.normalize()
        ),
    });
    step_number += 1;

    // Overtime
    let factors = &config.overtime;
    let overtime: Vec<OvertimeLine> = [
        (OvertimeCategory::Weekday, inputs.weekday_overtime_hours, factors.weekday),
        (OvertimeCategory::Weekend, inputs.weekend_overtime_hours, factors.weekend),
        (
            OvertimeCategory::PublicHoliday,
            inputs.holiday_overtime_hours,
            factors.public_holiday,
        ),
        (OvertimeCategory::Night, inputs.night_overtime_hours, factors.night),
    ]
    .into_iter()
    .map(|(category, hours, factor)| -> EngineResult<OvertimeLine> {
        let hours = or_zero(hours);
        let amount = hours
            .checked_mul(hourly)
            .and_then(|pay| pay.checked_mul(factor));
        Ok(OvertimeLine {
            category,
            hours,
            factor,
            amount: in_range(amount, "overtime_pay")?,
        })
    })
    .collect::<EngineResult<_>>()?;
    let overtime_total = in_range(
        overtime
            .iter()
            .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.amount)),
        "overtime_pay",
    )?;
    let overtime_input: Vec<serde_json::Value> = overtime
        .iter()
        .map(|line| {
            serde_json::json!({
                "category": line.category,
                "hours": line.hours.normalize().to_string(),
                "factor": line.factor.normalize().to_string()
            })
        })
        .collect();
    steps.push(AuditStep {
        step_number,
        rule_id: "overtime_pay".to_string(),
        rule_name: "Overtime Pay".to_string(),
        input: serde_json::Value::Array(overtime_input),
        output: serde_json::json!({ "overtime_total": overtime_total.normalize().to_string() }),
        reasoning: overtime
            .iter()
            .filter(|line| !line.hours.is_zero())
            .map(|line| {
                format!(
                    "{:?}: {}h x {} x {} = {}",
                    line.category,
                    line.hours.normalize(),
                    hourly.normalize(),
                    line.factor.normalize(),
                    line.amount.normalize()
                )
            })
            .collect::<Vec<_>>()
            .join("; "),
    });
    step_number += 1;

    // Allowances
    let fixed_allowances = in_range(salary.allowances.total(), "allowances")?;
    let responsible_days = or_zero(inputs.responsible_days);
    let total_allowances = in_range(
        responsible_days
            .checked_mul(or_zero(salary.responsibility_per_day))
            .and_then(|pay| pay.checked_add(fixed_allowances)),
        "allowances",
    )?;
    steps.push(AuditStep {
        step_number,
        rule_id: "allowances".to_string(),
        rule_name: "Allowances".to_string(),
        input: serde_json::json!({
            "fixed_allowances": fixed_allowances.normalize().to_string(),
            "responsible_days": responsible_days.normalize().to_string(),
            "responsibility_per_day": or_zero(salary.responsibility_per_day).normalize().to_string()
        }),
        output: serde_json::json!({ "total_allowances": total_allowances.normalize().to_string() }),
        reasoning: format!(
            "{} + {} days x {} = {}",
            fixed_allowances.normalize(),
            responsible_days.normalize(),
            or_zero(salary.responsibility_per_day).normalize(),
            total_allowances.normalize()
        ),
    });
    step_number += 1;

    let gross_salary = in_range(
        regular_pay
            .checked_add(overtime_total)
            .and_then(|gross| gross.checked_add(total_allowances)),
        "gross_salary",
    )?;

    // Deductions
    let insurance_salary = or_zero(salary.insurance_salary);
    let deductions = Deductions {
        penalty: or_zero(inputs.penalty),
        union_fee: or_zero(inputs.union_fee),
        personal_income_tax: or_zero(inputs.personal_income_tax),
        insurance: in_range(insurance_salary.checked_mul(config.insurance_rate), "deductions")?,
        advance: or_zero(inputs.advance),
    };
    let total_deductions = in_range(deductions.total(), "deductions")?;
    steps.push(AuditStep {
        step_number,
        rule_id: "deductions".to_string(),
        rule_name: "Deductions".to_string(),
        input: serde_json::json!({
            "insurance_salary": insurance_salary.normalize().to_string(),
            "insurance_rate": config.insurance_rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "insurance": deductions.insurance.normalize().to_string(),
            "total_deductions": total_deductions.normalize().to_string()
        }),
        reasoning: format!(
            "penalty {} + union fee {} + PIT {} + insurance {} + advance {} = {}",
            deductions.penalty.normalize(),
            deductions.union_fee.normalize(),
            deductions.personal_income_tax.normalize(),
            deductions.insurance.normalize(),
            deductions.advance.normalize(),
            total_deductions.normalize()
        ),
    });
    step_number += 1;

    let unrounded = in_range(gross_salary.checked_sub(total_deductions), "total_salary")?;
    let total_salary = unrounded
        .round_dp_with_strategy(config.rounding_scale, RoundingStrategy::MidpointAwayFromZero);
    steps.push(AuditStep {
        step_number,
        rule_id: "total_salary".to_string(),
        rule_name: "Total Salary".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.normalize().to_string(),
            "total_deductions": total_deductions.normalize().to_string()
        }),
        output: serde_json::json!({ "total_salary": total_salary.normalize().to_string() }),
        reasoning: format!(
            "{} - {} = {} (rounded to {} places)",
            gross_salary.normalize(),
            total_deductions.normalize(),
            unrounded.normalize(),
            config.rounding_scale
        ),
    });

    Ok(PayrollBreakdown {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        employee_code: salary.employee_code.clone(),
        hourly_base: hourly,
        regular_pay,
        overtime,
        total_allowances,
        gross_salary,
        deductions,
        total_salary,
        audit_steps: steps,
    })
}
