//! Connection CSV reader
//!
//! Expected header (any order, extra columns allowed):
//!
//! ```text
//! site,device_name,hostname,protocol,port,username,password
//! ```
//!
//! `device_name` becomes the connection name and `protocol` its kind. The
//! remaining required columns, plus every extra column with a non-empty value,
//! become connection parameters.

use super::error::InputError;
use crate::models::ImportRow;
use std::path::Path;

/// Columns every file must declare and every row must fill
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "site",
    "device_name",
    "hostname",
    "protocol",
    "port",
    "username",
    "password",
];

/// Columns that are not passed through as parameters
const STRUCTURAL_COLUMNS: [&str; 3] = ["site", "device_name", "protocol"];

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A row left out of the import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line in the file (the header is line 1)
    pub line: u64,
    pub reason: String,
}

/// Rows ready for import plus the ones that were skipped
#[derive(Debug, Clone, Default)]
pub struct ParsedCsv {
    pub rows: Vec<ImportRow>,
    pub skipped: Vec<SkippedRow>,
}

/// Read and parse a connection CSV file
pub fn read_rows(path: &Path) -> Result<ParsedCsv, InputError> {
    let data = std::fs::read(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = parse_rows(&data)?;
    tracing::info!(
        "Parsed {} connections from {} ({} rows skipped)",
        parsed.rows.len(),
        path.display(),
        parsed.skipped.len()
    );
    Ok(parsed)
}

/// Parse connection CSV content
pub fn parse_rows(data: &[u8]) -> Result<ParsedCsv, InputError> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(InputError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h.as_str() == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(InputError::MissingHeaders(missing));
    }

    let mut parsed = ParsedCsv::default();
    for (index, result) in reader.records().enumerate() {
        let fallback_line = index as u64 + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map_or(fallback_line, |p| p.line());
                tracing::warn!("Skipping row {}: {}", line, e);
                parsed.skipped.push(SkippedRow {
                    line,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let line = record.position().map_or(fallback_line, |p| p.line());

        match row_from_record(&headers, &record) {
            Ok(row) => parsed.rows.push(row),
            Err(reason) => {
                tracing::warn!("Skipping row {}: {}", line, reason);
                parsed.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    Ok(parsed)
}

fn field<'r>(headers: &[String], record: &'r csv::StringRecord, column: &str) -> &'r str {
    headers
        .iter()
        .position(|h| h.as_str() == column)
        .and_then(|idx| record.get(idx))
        .unwrap_or("")
}

fn row_from_record(headers: &[String], record: &csv::StringRecord) -> Result<ImportRow, String> {
    if let Some(empty) = REQUIRED_COLUMNS
        .iter()
        .find(|c| field(headers, record, c).is_empty())
    {
        return Err(format!("missing required field: {empty}"));
    }

    let mut row = ImportRow::new(
        field(headers, record, "site"),
        field(headers, record, "device_name"),
        field(headers, record, "protocol"),
    );
    for (idx, header) in headers.iter().enumerate() {
        if header.is_empty() || STRUCTURAL_COLUMNS.contains(&header.as_str()) {
            continue;
        }
        match record.get(idx) {
            Some(v) if !v.is_empty() => {
                row.attributes.insert(header.clone(), v.to_string());
            }
            _ => {}
        }
    }
    Ok(row)
}
