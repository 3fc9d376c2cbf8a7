//! Export module for the expense tracker
//!
//! Expenses are exported as CSV, one row per expense in its own currency.

pub mod csv;

pub use self::csv::{export_expenses_csv, to_csv_rows, write_csv, CsvRow, CSV_HEADERS};
