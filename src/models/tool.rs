//! Warehouse tool models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A stocked tool and its running quantities.
///
/// `available_qty` is derived; see
/// [`recompute_available`](crate::calculation::recompute_available).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    /// Unique tool code.
    pub code: String,
    /// Tool name.
    pub name: String,
    /// Quantity on hand when the tool was registered.
    pub initial_qty: i64,
    /// Quantity received from suppliers since.
    #[serde(default)]
    pub imported_qty: i64,
    /// Quantity written off.
    #[serde(default)]
    pub scrapped_qty: i64,
    /// Quantity handed out to employees.
    #[serde(default)]
    pub issued_qty: i64,
    /// Quantity handed back by employees.
    #[serde(default)]
    pub returned_qty: i64,
    /// Quantity in the warehouse.
    #[serde(default)]
    pub available_qty: i64,
}

/// A change to a tool's stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "qty", rename_all = "snake_case")]
pub enum ToolMovement {
    /// Stock received from a supplier.
    Import(i64),
    /// Stock handed to an employee.
    Issue(i64),
    /// Stock handed back by an employee.
    Return(i64),
    /// Stock written off.
    Scrap(i64),
}

impl ToolMovement {
    /// The quantity moved.
    pub fn qty(self) -> i64 {
        match self {
            ToolMovement::Import(q)
            | ToolMovement::Issue(q)
            | ToolMovement::Return(q)
            | ToolMovement::Scrap(q) => q,
        }
    }
}

/// Whether a supply log row records a receipt or a write-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyKind {
    /// Received from a supplier.
    Import,
    /// Written off.
    Scrap,
}

/// Log row for a supply-side movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSupplyLog {
    /// The tool moved.
    pub tool_code: String,
    /// Receipt or write-off.
    pub kind: SupplyKind,
    /// Quantity moved.
    pub qty: i64,
    /// When the movement happened.
    pub at: NaiveDateTime,
}

/// Whether an issue/return log row records an issue or a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Handed out.
    Issue,
    /// Handed back.
    Return,
}

/// Log row for an employee-side movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueReturnLog {
    /// The tool moved.
    pub tool_code: String,
    /// The employee receiving or returning the tool.
    pub employee_code: String,
    /// Issue or return.
    pub kind: IssueKind,
    /// Quantity moved.
    pub qty: i64,
    /// When the movement happened.
    pub at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_deserializes_tagged() {
        let movement: ToolMovement =
            serde_json::from_str(r#"{"kind": "issue", "qty": 3}"#).unwrap();
        assert_eq!(movement, ToolMovement::Issue(3));
        assert_eq!(movement.qty(), 3);
    }
}
