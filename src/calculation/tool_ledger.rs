//! Tool stock ledger.
//!
//! The available quantity of a tool is never stored independently: it is
//! recomputed from the running totals after every accepted movement.

use crate::error::{EngineError, EngineResult};
use crate::models::{Tool, ToolMovement};

fn overflow(tool_code: &str) -> EngineError {
    EngineError::InvalidInput {
        field: "qty".to_string(),
        message: format!("quantity of tool {} is out of range", tool_code),
    }
}

/// Returns `initial + imported - scrapped - issued + returned`.
///
/// # Errors
///
/// Returns `InvalidInput` when the totals do not fit in an `i64`.
pub fn available_quantity(tool: &Tool) -> EngineResult<i64> {
    tool.initial_qty
        .checked_add(tool.imported_qty)
        .and_then(|q| q.checked_sub(tool.scrapped_qty))
        .and_then(|q| q.checked_sub(tool.issued_qty))
        .and_then(|q| q.checked_add(tool.returned_qty))
        .ok_or_else(|| overflow(&tool.code))
}

/// Writes the derived available quantity back onto the tool.
pub fn recompute_available(tool: &mut Tool) -> EngineResult<()> {
    tool.available_qty = available_quantity(tool)?;
    Ok(())
}

/// Applies a movement to a tool.
///
/// Issue and scrap cannot take more than is available; a return cannot
/// bring back more than is still out (`issued - returned`). A rejected
/// movement leaves the tool untouched.
///
/// # Examples
///
/// ```
/// use workforce_engine::calculation::apply_movement;
/// use workforce_engine::models::{Tool, ToolMovement};
///
/// let mut tool = Tool {
///     code: "DRL-01".to_string(),
///     name: "Drill bit 6mm".to_string(),
///     initial_qty: 10,
///     imported_qty: 0,
///     scrapped_qty: 0,
///     issued_qty: 0,
///     returned_qty: 0,
///     available_qty: 10,
/// };
///
/// apply_movement(&mut tool, ToolMovement::Issue(4)).unwrap();
/// apply_movement(&mut tool, ToolMovement::Return(1)).unwrap();
/// assert_eq!(tool.available_qty, 7);
/// assert!(apply_movement(&mut tool, ToolMovement::Return(5)).is_err());
/// assert_eq!(tool.available_qty, 7);
/// ```
pub fn apply_movement(tool: &mut Tool, movement: ToolMovement) -> EngineResult<()> {
    let qty = movement.qty();
    if qty <= 0 {
        return Err(EngineError::InvalidInput {
            field: "qty".to_string(),
            message: "must be positive".to_string(),
        });
    }

    let available = available_quantity(tool)?;
    let outstanding = tool
        .issued_qty
        .checked_sub(tool.returned_qty)
        .ok_or_else(|| overflow(&tool.code))?;
    let insufficient = |allowed: i64| EngineError::InsufficientQuantity {
        tool_code: tool.code.clone(),
        requested: qty,
        allowed,
    };

    let mut next = tool.clone();
    let total = match movement {
        ToolMovement::Import(_) => &mut next.imported_qty,
        ToolMovement::Issue(_) => {
            if qty > available {
                return Err(insufficient(available));
            }
            &mut next.issued_qty
        }
        ToolMovement::Return(_) => {
            if qty > outstanding {
                return Err(insufficient(outstanding));
            }
            &mut next.returned_qty
        }
        ToolMovement::Scrap(_) => {
            if qty > available {
                return Err(insufficient(available));
            }
            &mut next.scrapped_qty
        }
    };
    *total = total.checked_add(qty).ok_or_else(|| overflow(&tool.code))?;

    recompute_available(&mut next)?;
    *tool = next;
    Ok(())
}
