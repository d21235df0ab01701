//! CSV Input
//!
//! Turns a connection CSV into [`ImportRow`](crate::models::ImportRow)s for
//! the import orchestrator. Header problems reject the file; row problems
//! skip the row with a warning.

mod csv_reader;
mod error;

pub use csv_reader::{parse_rows, read_rows, ParsedCsv, SkippedRow, REQUIRED_COLUMNS};
pub use error::InputError;
