//! CSV ingest of a product's sales history.
//!
//! Expected shape: a header row with a `date` column and a quantity column
//! (`quantity`, or one of the aliases `qty`, `units`, `sales`). Header names are
//! matched case-insensitively and a UTF-8 BOM on the first header is ignored.
//! Extra columns are allowed and ignored.
//!
//! - Missing columns are a schema error (exit code 2).
//! - Bad rows are collected as `RowError`s. In strict mode the first one fails
//!   the run as an input error (exit code 3); in lenient mode they are skipped
//!   and reported.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{RawSalesRecord, SalesObservation};
use crate::error::{AppError, InputError};

const QUANTITY_COLUMNS: [&str; 4] = ["quantity", "qty", "units", "sales"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based line number in the file (the header is line 1).
    pub line: usize,
    pub message: String,
}

/// Ingest output: validated observations + what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedSales {
    pub observations: Vec<SalesObservation>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl IngestedSales {
    pub fn rows_used(&self) -> usize {
        self.observations.len()
    }
}

/// Load a sales CSV from disk.
pub fn load_sales_csv(path: &Path, lenient: bool) -> Result<IngestedSales, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_sales_csv(file, lenient)
}

/// Parse a sales CSV from any reader.
pub fn read_sales_csv<R: Read>(input: R, lenient: bool) -> Result<IngestedSales, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = *header_map
        .get("date")
        .ok_or_else(|| AppError::new(2, "Missing required column: `date`"))?;
    let qty_idx = QUANTITY_COLUMNS
        .iter()
        .find_map(|name| header_map.get(*name).copied())
        .ok_or_else(|| {
            AppError::new(
                2,
                "Missing required column: `quantity` (or one of `qty`, `units`, `sales`)",
            )
        })?;

    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, date_idx, qty_idx, idx));
        match parsed {
            Ok(obs) => observations.push(obs),
            Err(message) => {
                if !lenient {
                    return Err(InputError::Other(format!("CSV line {line}: {message}")).into());
                }
                debug!(line, %message, "skipping sales row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    if !row_errors.is_empty() {
        warn!(skipped = row_errors.len(), rows_read, "skipped invalid sales rows");
    }
    if observations.is_empty() {
        return Err(InputError::EmptyHistory.into());
    }

    Ok(IngestedSales {
        observations,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often put a BOM in front of the first header.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(
    record: &StringRecord,
    date_idx: usize,
    qty_idx: usize,
    index: usize,
) -> Result<SalesObservation, String> {
    let date = get_field(record, date_idx).map(str::to_string);
    let quantity = match get_field(record, qty_idx) {
        Some(s) => Some(
            s.parse::<f64>()
                .map_err(|_| format!("Invalid quantity '{s}'."))?,
        ),
        None => None,
    };
    RawSalesRecord { date, quantity }
        .validate(index)
        .map_err(|e| e.to_string())
}

fn get_field(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn reads_aliases_bom_and_extra_columns() {
        let csv = "\u{feff}Date,SKU,Units\n2025-01-01,A,3\n2025-01-02,A,4.5\n";
        let out = read_sales_csv(csv.as_bytes(), false).unwrap();
        assert_eq!(out.rows_read, 2);
        assert_eq!(out.rows_used(), 2);
        assert_eq!(
            out.observations[1],
            SalesObservation {
                date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
                quantity: 4.5
            }
        );
    }

    #[test]
    fn missing_quantity_column_is_a_schema_error() {
        let err = read_sales_csv("date,price\n2025-01-01,3\n".as_bytes(), false).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn strict_mode_fails_on_first_bad_row() {
        let csv = "date,quantity\n2025-01-01,3\n2025-01-02,\n2025-01-03,-1\n";
        let err = read_sales_csv(csv.as_bytes(), false).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("line 3"), "{err}");
    }

    #[test]
    fn lenient_mode_skips_and_reports_bad_rows() {
        let csv = "date,quantity\n2025-01-01,3\nnot-a-date,2\n2025-01-03,abc\n2025-01-04,-1\n2025-01-05,6\n";
        let out = read_sales_csv(csv.as_bytes(), true).unwrap();
        assert_eq!(out.rows_read, 5);
        assert_eq!(out.rows_used(), 2);
        let lines: Vec<usize> = out.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
    }

    #[test]
    fn all_rows_invalid_is_empty_history() {
        let csv = "date,quantity\n,3\n";
        let err = read_sales_csv(csv.as_bytes(), true).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
