//! Header-driven reading of tabular import files.
//!
//! Files are CSV exports of the import templates. The first record is the
//! header row; each profile declares its columns with every header spelling
//! seen in the templates (Vietnamese and English).

use crate::error::{EngineError, EngineResult};

/// A column an import profile reads.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    /// Canonical column name used by the profile.
    pub name: &'static str,
    /// Accepted header spellings, matched case-insensitively.
    pub aliases: &'static [&'static str],
    /// Whether the import aborts when the column is absent.
    pub required: bool,
}

impl ColumnSpec {
    /// A column the file must contain.
    pub const fn required(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            name,
            aliases,
            required: true,
        }
    }

    /// A column the file may omit.
    pub const fn optional(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            name,
            aliases,
            required: false,
        }
    }

    fn matches(&self, header: &str) -> bool {
        let header = normalize_header(header);
        header == self.name || self.aliases.iter().any(|a| normalize_header(a) == header)
    }
}

fn normalize_header(header: &str) -> String {
    header.trim().trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// One data row with its cells resolved to the profile's columns.
#[derive(Debug, Clone)]
pub struct SheetRow {
    /// Line number in the file (the header is line 1).
    pub line: usize,
    columns: &'static [ColumnSpec],
    cells: Vec<Option<String>>,
}

impl SheetRow {
    /// Returns the non-empty value of a column.
    pub fn get(&self, column: &str) -> Option<&str> {
        let index = self.columns.iter().position(|c| c.name == column)?;
        self.cells.get(index)?.as_deref()
    }

    /// Returns the value of a column or a row error naming it.
    pub fn require(&self, column: &str) -> Result<&str, String> {
        self.get(column)
            .ok_or_else(|| format!("missing value for '{}'", column))
    }
}

/// A parsed import file.
#[derive(Debug, Clone)]
pub struct Sheet {
    rows: Vec<SheetRow>,
}

impl Sheet {
    /// Reads CSV text against a column layout.
    ///
    /// Blank rows are dropped. Returns `MissingColumn` when a required column
    /// has no matching header and `UnreadableImport` when the text is not
    /// valid CSV or has no header row.
    pub fn parse(data: &str, columns: &'static [ColumnSpec]) -> EngineResult<Self> {
        Self::parse_limited(data, columns, usize::MAX)
    }

    /// Like [`Sheet::parse`], but stops reading with `InvalidInput` as soon
    /// as the file holds more than `max_rows` data rows.
    pub fn parse_limited(
        data: &str,
        columns: &'static [ColumnSpec],
        max_rows: usize,
    ) -> EngineResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| EngineError::UnreadableImport {
                message: e.to_string(),
            })?
            .clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(EngineError::UnreadableImport {
                message: "header row is empty".to_string(),
            });
        }

        let mut positions = Vec::with_capacity(columns.len());
        for column in columns {
            let position = headers.iter().position(|h| column.matches(h));
            if position.is_none() && column.required {
                return Err(EngineError::MissingColumn {
                    column: column.name.to_string(),
                });
            }
            positions.push(position);
        }

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|e| EngineError::UnreadableImport {
                message: e.to_string(),
            })?;
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            if rows.len() == max_rows {
                return Err(EngineError::InvalidInput {
                    field: "file".to_string(),
                    message: format!("more than {} rows", max_rows),
                });
            }

            let cells = positions
                .iter()
                .map(|position| {
                    position
                        .and_then(|i| record.get(i))
                        .map(str::trim)
                        .filter(|cell| !cell.is_empty())
                        .map(str::to_string)
                })
                .collect();

            let line = record
                .position()
                .map_or(index + 2, |position| position.line() as usize);
            rows.push(SheetRow {
                line,
                columns,
                cells,
            });
        }

        Ok(Self { rows })
    }

    /// The data rows in file order.
    pub fn rows(&self) -> &[SheetRow] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the file has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
