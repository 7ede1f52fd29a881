//! Pre-flight parsing and validation of batch CSV uploads
//!
//! The backend is authoritative; this only gives the operator a quick count of
//! rows that will obviously be rejected before anything is sent.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

/// Maximum number of human-readable errors kept in a [`ValidationResult`]
pub const MAX_ERRORS: usize = 10;

pub const SERIAL_NUMBER: &str = "serial_number";
pub const PRODUCT_CODE: &str = "product_code";

/// One data line keyed by normalized header name, in header order
pub type CsvRow = IndexMap<String, String>;

/// How rows with both required fields blank are counted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidCounting {
    /// Each blank required field counts once, so a row missing both counts twice.
    /// This is what the operator portal has always reported.
    #[default]
    PerField,
    /// A row counts at most once however many fields are blank
    PerRow,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub total: usize,
    /// `total - invalid - duplicates`; negative when the per-field double count
    /// exceeds the row count
    pub valid: i64,
    pub invalid: usize,
    pub duplicates: usize,
    pub errors: Vec<String>,
    /// 0..=100
    pub risk_score: u8,
}

impl ValidationResult {
    /// Derive `valid` and `risk_score` from raw counters
    #[must_use]
    pub fn from_counts(total: usize, invalid: usize, duplicates: usize, errors: Vec<String>) -> Self {
        Self {
            total,
            valid: total as i64 - invalid as i64 - duplicates as i64,
            invalid,
            duplicates,
            errors,
            risk_score: risk_score(total, invalid, duplicates),
        }
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.invalid == 0 && self.duplicates == 0
    }
}

/// `min(100, round(100 * (invalid + duplicates) / total))`, 0 for an empty file
#[must_use]
pub fn risk_score(total: usize, invalid: usize, duplicates: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = (invalid + duplicates) as f64 / total as f64;
    (ratio * 100.0).round().min(100.0) as u8
}

/// Lower-case and replace every whitespace character with `_`
#[must_use]
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Split comma-delimited text into rows. The first line is the header.
///
/// Quoting is not interpreted. Fewer than two lines yields no rows. Cells
/// missing at the end of a line are empty strings; extra cells are dropped.
#[must_use]
pub fn parse_csv(text: &str) -> Vec<CsvRow> {
    let lines: Vec<&str> = text
        .trim()
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    if lines.len() < 2 {
        return Vec::new();
    }

    let headers: Vec<String> = lines[0].split(',').map(normalize_header).collect();

    lines[1..]
        .iter()
        .map(|line| {
            let values: Vec<&str> = line.split(',').map(str::trim).collect();
            let mut row = CsvRow::with_capacity(headers.len());
            for (j, header) in headers.iter().enumerate() {
                row.insert(header.clone(), values.get(j).copied().unwrap_or("").to_string());
            }
            row
        })
        .collect()
}

/// Count blank and duplicate serials and blank product codes.
#[must_use]
pub fn validate_csv(rows: &[CsvRow]) -> ValidationResult {
    validate_csv_with(rows, InvalidCounting::default())
}

#[must_use]
pub fn validate_csv_with(rows: &[CsvRow], counting: InvalidCounting) -> ValidationResult {
    let mut errors = Vec::new();
    let mut serials: HashSet<&str> = HashSet::new();
    let mut invalid = 0usize;
    let mut duplicates = 0usize;

    for (i, row) in rows.iter().enumerate() {
        // +1 for 1-based numbering, +1 for the header line
        let line = i + 2;
        let mut row_invalid = false;

        match non_blank(row, SERIAL_NUMBER) {
            None => {
                invalid += 1;
                row_invalid = true;
                push_error(&mut errors, line, SERIAL_NUMBER);
            }
            Some(sn) => {
                if !serials.insert(sn) {
                    duplicates += 1;
                }
            }
        }

        if non_blank(row, PRODUCT_CODE).is_none() {
            if counting == InvalidCounting::PerField || !row_invalid {
                invalid += 1;
            }
            push_error(&mut errors, line, PRODUCT_CODE);
        }
    }

    ValidationResult::from_counts(rows.len(), invalid, duplicates, errors)
}

/// Header names of the first row, used as batch metadata
#[must_use]
pub fn columns(rows: &[CsvRow]) -> Vec<String> {
    rows.first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default()
}

fn push_error(errors: &mut Vec<String>, line: usize, field: &str) {
    if errors.len() < MAX_ERRORS {
        errors.push(format!("Linha {line}: {field} vazio"));
    }
}

fn non_blank<'a>(row: &'a CsvRow, field: &str) -> Option<&'a str> {
    row.get(field).map(|v| v.trim()).filter(|v| !v.is_empty())
}
