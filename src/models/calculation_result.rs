//! Payroll calculation result models.
//!
//! This module contains the [`PayrollBreakdown`] type and its associated
//! structures that capture every component of a salary calculation along
//! with an audit trail explaining how each figure was reached.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The overtime category of a pay line.
///
/// # Example
///
/// ```
/// use workforce_engine::models::OvertimeCategory;
///
/// let category = OvertimeCategory::Weekday;
/// assert_eq!(format!("{:?}", category), "Weekday");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvertimeCategory {
    /// Overtime on a normal working day.
    Weekday,
    /// Overtime on a weekly rest day.
    Weekend,
    /// Overtime on a public holiday.
    PublicHoliday,
    /// Night shift overtime.
    Night,
}

/// A single overtime line: hours, the multiplier used, and the amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeLine {
    /// The overtime category.
    pub category: OvertimeCategory,
    /// Hours worked in this category.
    pub hours: Decimal,
    /// Multiplier applied to the hourly base.
    pub factor: Decimal,
    /// `hours * hourly_base * factor`.
    pub amount: Decimal,
}

/// Deductions withheld from gross salary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    /// Disciplinary penalty.
    pub penalty: Decimal,
    /// Trade union fee.
    pub union_fee: Decimal,
    /// Personal income tax.
    pub personal_income_tax: Decimal,
    /// Employee social insurance contribution.
    pub insurance: Decimal,
    /// Salary advance already paid.
    pub advance: Decimal,
}

impl Deductions {
    /// Sum of every deduction, including the advance, or `None` when it
    /// overflows.
    pub fn total(&self) -> Option<Decimal> {
        [
            self.union_fee,
            self.personal_income_tax,
            self.insurance,
            self.advance,
        ]
        .into_iter()
        .try_fold(self.penalty, |sum, amount| sum.checked_add(amount))
    }
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The complete result of a payroll calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollBreakdown {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// The employee the calculation is for.
    pub employee_code: String,
    /// `base_salary / standard_days / standard_hours`.
    pub hourly_base: Decimal,
    /// Pay for regular hours.
    pub regular_pay: Decimal,
    /// One line per overtime category.
    pub overtime: Vec<OvertimeLine>,
    /// Fixed allowances plus responsibility pay.
    pub total_allowances: Decimal,
    /// Regular pay, overtime and allowances.
    pub gross_salary: Decimal,
    /// Amounts withheld.
    pub deductions: Deductions,
    /// Final salary after deductions, rounded.
    pub total_salary: Decimal,
    /// Every rule applied, in order.
    pub audit_steps: Vec<AuditStep>,
}

impl PayrollBreakdown {
    /// Sum of all overtime lines.
    pub fn overtime_total(&self) -> Decimal {
        self.overtime.iter().map(|line| line.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_deductions_total_includes_advance() {
        let deductions = Deductions {
            penalty: dec("50000"),
            union_fee: dec("20000"),
            personal_income_tax: dec("0"),
            insurance: dec("525000"),
            advance: dec("1000000"),
        };
        assert_eq!(deductions.total(), Some(dec("1595000")));
    }

    #[test]
    fn test_overtime_category_serialization() {
        assert_eq!(
            serde_json::to_string(&OvertimeCategory::PublicHoliday).unwrap(),
            "\"public_holiday\""
        );
    }

    #[test]
    fn test_audit_step_serializes_json_values() {
        let step = AuditStep {
            step_number: 1,
            rule_id: "hourly_base".to_string(),
            rule_name: "Hourly Base".to_string(),
            input: serde_json::json!({"base_salary": "7500000"}),
            output: serde_json::json!({"hourly_base": "37500"}),
            reasoning: "7500000 / 25 / 8 = 37500".to_string(),
        };

        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["input"]["base_salary"], "7500000");
        assert_eq!(json["output"]["hourly_base"], "37500");
    }
}
