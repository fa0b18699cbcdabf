//! Employee model.
//!
//! Nearly every other record refers to an employee through its `code`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Represents an employee of the plant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique business key (e.g., "NV0001").
    pub code: String,
    /// Full name.
    pub name: String,
    /// Department the employee belongs to.
    pub department: String,
    /// The date the employee was hired.
    pub hire_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_employee() {
        let json = r#"{
            "code": "NV0001",
            "name": "Nguyen Van An",
            "department": "Assembly",
            "hire_date": "2021-03-01"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.code, "NV0001");
        assert_eq!(employee.department, "Assembly");
        assert_eq!(
            employee.hire_date,
            NaiveDate::from_ymd_opt(2021, 3, 1).unwrap()
        );
    }
}
