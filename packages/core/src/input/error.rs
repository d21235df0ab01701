//! CSV Input Error Types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that make a whole CSV file unusable
///
/// Problems with single rows never surface here; those rows are skipped and
/// reported in [`ParsedCsv::skipped`](super::ParsedCsv::skipped).
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read CSV file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV file is empty")]
    Empty,

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required CSV columns: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),
}
