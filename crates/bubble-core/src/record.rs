// File: crates/bubble-core/src/record.rs
// Summary: SurnameRecord model and row validation for generation CSV files.

use std::collections::HashSet;

use crate::error::DataError;
use crate::types::UNKNOWN_NATIONALITY;

pub const COL_SURNAME: &str = "Surname";
pub const COL_COUNT: &str = "Count";
pub const COL_NATIONALITY: &str = "Nationality";

/// One surname's head count within a generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurnameRecord {
    pub surname: String,
    pub count: u64,
    pub nationality: String,
}

impl SurnameRecord {
    /// Build a record; an empty or blank nationality resolves to `"Unknown"`.
    pub fn new(surname: impl Into<String>, count: u64, nationality: Option<&str>) -> Self {
        Self {
            surname: surname.into(),
            count,
            nationality: resolve_nationality(nationality),
        }
    }
}

pub fn resolve_nationality(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => UNKNOWN_NATIONALITY.to_string(),
    }
}

/// Column positions resolved from a header row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Columns {
    pub surname: usize,
    pub count: usize,
    pub nationality: Option<usize>,
}

impl Columns {
    pub fn from_headers(headers: &csv::StringRecord) -> Result<Self, DataError> {
        let idx = |want: &str| headers.iter().position(|h| h.trim() == want);
        let surname = idx(COL_SURNAME).ok_or(DataError::MissingColumn(COL_SURNAME))?;
        let count = idx(COL_COUNT).ok_or(DataError::MissingColumn(COL_COUNT))?;
        Ok(Self { surname, count, nationality: idx(COL_NATIONALITY) })
    }
}

/// Validates rows one at a time and enforces surname uniqueness across them.
#[derive(Debug)]
pub struct RowValidator {
    columns: Columns,
    seen: HashSet<String>,
}

impl RowValidator {
    pub fn new(columns: Columns) -> Self {
        Self { columns, seen: HashSet::new() }
    }

    pub fn validate(&mut self, line: u64, row: &csv::StringRecord) -> Result<SurnameRecord, DataError> {
        let surname = row.get(self.columns.surname).map(str::trim).unwrap_or("");
        if surname.is_empty() {
            return Err(DataError::EmptySurname { line });
        }

        let raw_count = row.get(self.columns.count).map(str::trim).unwrap_or("");
        let count = raw_count.parse::<u64>().map_err(|_| DataError::InvalidCount {
            line,
            surname: surname.to_string(),
            value: raw_count.to_string(),
        })?;

        if !self.seen.insert(surname.to_string()) {
            return Err(DataError::DuplicateSurname { line, surname: surname.to_string() });
        }

        let nationality = self.columns.nationality.and_then(|ix| row.get(ix));
        Ok(SurnameRecord::new(surname, count, nationality))
    }
}
