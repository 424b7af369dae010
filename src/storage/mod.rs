//! In-memory tables and the CSV backend that reads and writes them.

pub mod csv_backend;
pub mod records;

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::errors::{PipelineError, PipelineResult};

pub use csv_backend::CsvStorage;

/// Header names, compared after trimming and ignoring ASCII case.
pub mod columns {
    pub const LINE_ITEM: &str = "LINE ITEM";
    pub const SMS_TYPE: &str = "SMS TYPE";
    pub const LOCATION: &str = "LOCATION";
    pub const AMOUNT: &str = "AMOUNT";
    pub const CURRENCY: &str = "CURRENCY";
    pub const SUBSIDIARY: &str = "Subsidiary";
    pub const CLIENT: &str = "CLIENT";
    pub const TYPE: &str = "Type";
    pub const REGION: &str = "Region";

    pub const DEBIT: &str = "Debit";
    pub const CREDIT: &str = "Credit";

    /// Columns a raw export must carry before classification starts.
    pub const CLASSIFIER_INPUT: &[&str] = &[
        LINE_ITEM, SMS_TYPE, LOCATION, AMOUNT, CURRENCY, SUBSIDIARY, CLIENT,
    ];
    /// Columns a processed file must carry for aggregation.
    pub const SUMMARY_INPUT: &[&str] = &[SUBSIDIARY, LOCATION, AMOUNT, TYPE, CURRENCY];
    /// Columns a processed file must carry for journal generation.
    pub const JOURNAL_INPUT: &[&str] = &[SUBSIDIARY, LOCATION, AMOUNT, CURRENCY, CLIENT, TYPE];

    pub const JOURNAL_HEADERS: &[&str] = &[
        "Entry No.",
        "Date",
        "Subsidiary",
        "Location",
        "Currency",
        "Account",
        "Memo",
        DEBIT,
        CREDIT,
        "Department",
        "Cost Centre",
        "Mgmt P&L",
        "Name",
    ];
}

/// A header row plus string records, as read from or written to disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn from_strs(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        )
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Position of a column, matching on trimmed, case-insensitive names.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(wanted))
    }

    /// Fails with every absent column named, before any row is interpreted.
    pub fn require_columns(&self, table: &str, required: &[&str]) -> PipelineResult<()> {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::MissingColumns {
                table: table.to_string(),
                columns: missing,
            })
        }
    }

    /// Index of a column that must exist.
    pub fn require_index(&self, table: &str, name: &str) -> PipelineResult<usize> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::MissingColumns {
                table: table.to_string(),
                columns: vec![name.to_string()],
            })
    }

    /// Cell accessor tolerant of short rows.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Spreadsheet-style line number of a data row (the header is line 1).
pub fn line_number(row: usize) -> usize {
    row + 2
}

/// Parses an amount cell. Thousands separators and padding are accepted.
pub fn parse_amount(raw: &str, row: usize) -> PipelineResult<Decimal> {
    let cleaned: String = raw.trim().chars().filter(|ch| *ch != ',').collect();
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| PipelineError::InvalidAmount {
            row: line_number(row),
            value: raw.to_string(),
        })
}
