//! Salary profile model.
//!
//! A [`SalaryProfile`] is the per-employee pay profile. Monthly payrolls copy
//! its allowances when they are created, so later profile changes never
//! rewrite an existing month.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fixed monthly allowances.
///
/// Every field is nullable; a missing allowance counts as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Allowances {
    /// Position (title) allowance.
    pub position: Option<Decimal>,
    /// Seniority allowance.
    pub seniority: Option<Decimal>,
    /// Hazardous work allowance.
    pub hazardous: Option<Decimal>,
    /// Full attendance allowance.
    pub attendance: Option<Decimal>,
    /// Housing allowance.
    pub housing: Option<Decimal>,
    /// Travel allowance.
    pub travel: Option<Decimal>,
    /// Phone allowance.
    pub phone: Option<Decimal>,
    /// Meal allowance.
    pub meal: Option<Decimal>,
    /// Fuel allowance.
    pub fuel: Option<Decimal>,
    /// Child support allowance.
    pub child_support: Option<Decimal>,
    /// Skill certificate allowance.
    pub skill: Option<Decimal>,
    /// Foreign language allowance.
    pub language: Option<Decimal>,
    /// Shift work allowance.
    pub shift: Option<Decimal>,
    /// Working environment allowance.
    pub environment: Option<Decimal>,
    /// Performance allowance.
    pub performance: Option<Decimal>,
    /// Fixed monthly bonus.
    pub bonus: Option<Decimal>,
    /// Anything not covered above.
    pub other: Option<Decimal>,
}

impl Allowances {
    /// Returns every allowance by name, with nulls as zero.
    pub fn entries(&self) -> [(&'static str, Decimal); 17] {
        let v = |x: Option<Decimal>| x.unwrap_or_default();
        [
            ("position", v(self.position)),
            ("seniority", v(self.seniority)),
            ("hazardous", v(self.hazardous)),
            ("attendance", v(self.attendance)),
            ("housing", v(self.housing)),
            ("travel", v(self.travel)),
            ("phone", v(self.phone)),
            ("meal", v(self.meal)),
            ("fuel", v(self.fuel)),
            ("child_support", v(self.child_support)),
            ("skill", v(self.skill)),
            ("language", v(self.language)),
            ("shift", v(self.shift)),
            ("environment", v(self.environment)),
            ("performance", v(self.performance)),
            ("bonus", v(self.bonus)),
            ("other", v(self.other)),
        ]
    }

    /// Sum of all fixed allowances, or `None` when it overflows.
    ///
    /// # Examples
    ///
    /// ```
    /// use workforce_engine::models::Allowances;
    /// use rust_decimal::Decimal;
    ///
    /// let allowances = Allowances {
    ///     meal: Some(Decimal::new(730_000, 0)),
    ///     phone: Some(Decimal::new(200_000, 0)),
    ///     ..Default::default()
    /// };
    /// assert_eq!(allowances.total(), Some(Decimal::new(930_000, 0)));
    /// ```
    pub fn total(&self) -> Option<Decimal> {
        self.entries()
            .iter()
            .try_fold(Decimal::ZERO, |sum, (_, amount)| sum.checked_add(*amount))
    }
}

/// Per-employee pay profile, one-to-one with [`Employee`](super::Employee).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryProfile {
    /// The employee this profile belongs to.
    pub employee_code: String,
    /// Monthly base salary.
    #[serde(default)]
    pub base_salary: Option<Decimal>,
    /// Salary on which social insurance is contributed.
    #[serde(default)]
    pub insurance_salary: Option<Decimal>,
    /// Responsibility allowance paid per responsible day.
    #[serde(default)]
    pub responsibility_per_day: Option<Decimal>,
    /// Fixed monthly allowances.
    #[serde(default)]
    pub allowances: Allowances,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_allowances_total_zero() {
        assert_eq!(Allowances::default().total(), Some(Decimal::ZERO));
    }

    #[test]
    fn test_allowances_total_sums_every_field() {
        let allowances = Allowances {
            position: Some(Decimal::ONE),
            seniority: Some(Decimal::ONE),
            hazardous: Some(Decimal::ONE),
            attendance: Some(Decimal::ONE),
            housing: Some(Decimal::ONE),
            travel: Some(Decimal::ONE),
            phone: Some(Decimal::ONE),
            meal: Some(Decimal::ONE),
            fuel: Some(Decimal::ONE),
            child_support: Some(Decimal::ONE),
            skill: Some(Decimal::ONE),
            language: Some(Decimal::ONE),
            shift: Some(Decimal::ONE),
            environment: Some(Decimal::ONE),
            performance: Some(Decimal::ONE),
            bonus: Some(Decimal::ONE),
            other: Some(Decimal::ONE),
        };
        assert_eq!(allowances.total(), Some(Decimal::new(17, 0)));
    }

    #[test]
    fn test_deserialize_profile_with_missing_fields() {
        let json = r#"{
            "employee_code": "NV0001",
            "base_salary": "7500000",
            "allowances": { "meal": "730000" }
        }"#;

        let profile: SalaryProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.base_salary, Some(Decimal::new(7_500_000, 0)));
        assert_eq!(profile.insurance_salary, None);
        assert_eq!(profile.allowances.meal, Some(Decimal::new(730_000, 0)));
        assert_eq!(profile.allowances.total(), Some(Decimal::new(730_000, 0)));
    }
}
