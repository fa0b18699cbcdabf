//! Row-by-row import planning with duplicate detection.
//!
//! [`plan_import`] walks a [`Sheet`] once and sorts every row into exactly
//! one bucket: inserted, updated (merged), duplicate, not found, or error.
//! Nothing is written here; the caller commits the returned [`ImportPlan`]
//! in a single transaction.
//!
//! Row-level problems never abort the import. Only structural failures
//! (unreadable file, missing required column, too many rows) do.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::sheet::{ColumnSpec, Sheet, SheetRow};

/// What to do with a row whose key is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Leave the existing record alone and count the row as a duplicate.
    Skip,
    /// Fold the row into the existing record.
    Merge,
}

/// Outcome of checking a parsed record's references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceCheck {
    /// All referenced records exist.
    Found,
    /// The referenced employee (or equivalent parent) is unknown.
    NotFound(String),
    /// A reference is invalid in a way that counts as a row error.
    Invalid(String),
}

/// Describes how one kind of import file maps onto records.
pub trait ImportProfile {
    /// The record staged for each accepted row.
    type Record: Clone + Debug;
    /// The composite identity of a record.
    type Key: Eq + Hash + Clone + Debug;

    /// Columns the file is read with.
    fn columns(&self) -> &'static [ColumnSpec];

    /// Converts a row to a record, or explains why it cannot.
    fn parse_row(&self, row: &SheetRow) -> Result<Self::Record, String>;

    /// The record's identity.
    fn key(&self, record: &Self::Record) -> Self::Key;

    /// Checks foreign keys against prefetched reference data.
    fn check_references(&self, record: &Self::Record) -> ReferenceCheck;

    /// How key collisions are handled.
    fn policy(&self) -> DuplicatePolicy {
        DuplicatePolicy::Skip
    }

    /// Folds `incoming` into `target`. Only called under
    /// [`DuplicatePolicy::Merge`].
    fn merge(&self, _target: &mut Self::Record, _incoming: &Self::Record) {}
}

/// A row that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// Line number in the file.
    pub line: usize,
    /// What was wrong.
    pub message: String,
}

/// Counts reported back to the user after an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Non-blank data rows read.
    pub total_rows: usize,
    /// Rows that created a new record.
    pub inserted: usize,
    /// Rows merged into an existing or earlier record.
    pub updated: usize,
    /// Rows skipped because the key was taken.
    pub duplicates: usize,
    /// Rows skipped because a referenced record is unknown.
    pub not_found: usize,
    /// Rows rejected with an error.
    pub errors: Vec<RowError>,
}

/// Records staged for commit plus the summary.
#[derive(Debug, Clone)]
pub struct ImportPlan<R> {
    /// New records.
    pub inserts: Vec<R>,
    /// Deltas to merge into persisted records, one per key.
    pub updates: Vec<R>,
    /// The per-bucket counts.
    pub summary: ImportSummary,
}

enum Staged {
    Insert(usize),
    Update(usize),
}

/// Plans an import without writing anything.
///
/// # Arguments
///
/// * `profile` - How rows map to records
/// * `sheet` - The parsed file
/// * `existing` - Keys already persisted
pub fn plan_import<P: ImportProfile>(
    profile: &P,
    sheet: &Sheet,
    existing: &HashSet<P::Key>,
) -> ImportPlan<P::Record> {
    let mut inserts: Vec<P::Record> = Vec::new();
    let mut updates: Vec<P::Record> = Vec::new();
    let mut staged: HashMap<P::Key, Staged> = HashMap::new();
    let mut summary = ImportSummary {
        total_rows: sheet.len(),
        ..Default::default()
    };

    for row in sheet.rows() {
        let record = match profile.parse_row(row) {
            Ok(record) => record,
            Err(message) => {
                debug!(line = row.line, %message, "Rejected import row");
                summary.errors.push(RowError {
                    line: row.line,
                    message,
                });
                continue;
            }
        };

        match profile.check_references(&record) {
            ReferenceCheck::Found => {}
            ReferenceCheck::NotFound(message) => {
                debug!(line = row.line, %message, "Import row references unknown record");
                summary.not_found += 1;
                continue;
            }
            ReferenceCheck::Invalid(message) => {
                summary.errors.push(RowError {
                    line: row.line,
                    message,
                });
                continue;
            }
        }

        let key = profile.key(&record);
        let merging = profile.policy() == DuplicatePolicy::Merge;

        if let Some(slot) = staged.get(&key) {
            if merging {
                let target = match slot {
                    Staged::Insert(i) => &mut inserts[*i],
                    Staged::Update(i) => &mut updates[*i],
                };
                profile.merge(target, &record);
                summary.updated += 1;
            } else {
                summary.duplicates += 1;
            }
            continue;
        }

        if existing.contains(&key) {
            if merging {
                staged.insert(key, Staged::Update(updates.len()));
                updates.push(record);
                summary.updated += 1;
            } else {
                summary.duplicates += 1;
            }
            continue;
        }

        staged.insert(key, Staged::Insert(inserts.len()));
        inserts.push(record);
        summary.inserted += 1;
    }

    info!(
        total_rows = summary.total_rows,
        inserted = summary.inserted,
        updated = summary.updated,
        duplicates = summary.duplicates,
        not_found = summary.not_found,
        errors = summary.errors.len(),
        "Planned import"
    );

    ImportPlan {
        inserts,
        updates,
        summary,
    }
}
