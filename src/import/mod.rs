//! Spreadsheet imports.
//!
//! An import reads a CSV export of one of the import templates, plans every
//! row against the records already stored ([`plan_import`]), and hands the
//! plan to the store to commit in one transaction.
//!
//! # Example
//!
//! ```
//! use std::collections::HashSet;
//! use workforce_engine::import::{plan_import, EmployeeImport, ImportProfile, Sheet};
//!
//! let profile = EmployeeImport;
//! let sheet = Sheet::parse(
//!     "Employee Code,Name,Department,Hire Date\nNV0001,An,Press,2023-01-02\n",
//!     profile.columns(),
//! )?;
//! let plan = plan_import(&profile, &sheet, &HashSet::new());
//! assert_eq!(plan.summary.inserted, 1);
//! # Ok::<(), workforce_engine::error::EngineError>(())
//! ```

mod cells;
mod dedup;
mod profiles;
mod sheet;

pub use cells::{parse_date, parse_decimal, parse_integer, serial_to_date};
pub use dedup::{
    DuplicatePolicy, ImportPlan, ImportProfile, ImportSummary, ReferenceCheck, RowError,
    plan_import,
};
pub use profiles::{EmployeeImport, PayrollImport, PayrollImportRow, ViolationImport};
pub use sheet::{ColumnSpec, Sheet, SheetRow};
