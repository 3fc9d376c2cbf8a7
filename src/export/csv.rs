//! CSV export of expenses

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::Expense;

/// Column order of the exported file
pub const CSV_HEADERS: [&str; 7] = [
    "Date",
    "Category",
    "Amount",
    "Currency",
    "Tags",
    "Payment Method",
    "Note",
];

/// One exported expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Category")]
    pub category: String,
    /// Amount in the expense's own currency, two decimals
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "Currency")]
    pub currency: String,
    /// Tags joined with `;`
    #[serde(rename = "Tags")]
    pub tags: String,
    #[serde(rename = "Payment Method")]
    pub payment_method: String,
    #[serde(rename = "Note")]
    pub note: String,
}

impl From<&Expense> for CsvRow {
    fn from(expense: &Expense) -> Self {
        Self {
            date: expense.date.format("%Y-%m-%d").to_string(),
            category: expense.category.to_string(),
            amount: expense.amount.to_string(),
            currency: expense.currency.code().to_string(),
            tags: expense
                .tags
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(";"),
            payment_method: expense.payment_method.label().to_string(),
            note: expense.note.clone(),
        }
    }
}

/// Rows for `expenses`, ordered by date then id
pub fn to_csv_rows<'e, I>(expenses: I) -> Vec<CsvRow>
where
    I: IntoIterator<Item = &'e Expense>,
{
    let mut sorted: Vec<&Expense> = expenses.into_iter().collect();
    sorted.sort_by_key(|e| (e.date, e.id));
    sorted.into_iter().map(CsvRow::from).collect()
}

/// Write a header and `rows` as UTF-8 CSV.
///
/// The header is written even when there are no rows.
pub fn write_csv<W: Write>(writer: W, rows: &[CsvRow]) -> ExpenseResult<()> {
    let mut csv_writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(CSV_HEADERS).map_err(export_error)?;
    for row in rows {
        csv_writer.serialize(row).map_err(export_error)?;
    }
    csv_writer
        .flush()
        .map_err(|e| ExpenseError::Export(e.to_string()))?;
    Ok(())
}

/// Export `expenses` to a CSV file at `path`; returns the number of rows
pub fn export_expenses_csv<'e, I>(expenses: I, path: &Path) -> ExpenseResult<usize>
where
    I: IntoIterator<Item = &'e Expense>,
{
    let rows = to_csv_rows(expenses);
    let file = File::create(path).map_err(|e| {
        ExpenseError::Export(format!("Failed to create {}: {}", path.display(), e))
    })?;
    write_csv(file, &rows)?;
    debug!(path = %path.display(), rows = rows.len(), "Exported expenses to CSV");
    Ok(rows.len())
}

fn export_error(e: ::csv::Error) -> ExpenseError {
    ExpenseError::Export(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Currency, ExpenseId, Money, NewExpense, PaymentMethod};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn expense(id: u64, day: u32, minor: i64, currency: Currency, note: &str) -> Expense {
        let new = NewExpense::new(
            NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            Money::from_minor(minor),
            currency,
            Category::Food,
        )
        .with_note(note);
        Expense::from_new(ExpenseId::new(id), new)
    }

    fn sample() -> Vec<Expense> {
        let mut croissants = expense(3, 12, 4_550, Currency::Eur, "Croissants, coffee");
        croissants.tags = ["dining".to_string(), "trip".to_string()].into();
        croissants.payment_method = PaymentMethod::CreditCard;

        vec![
            croissants,
            expense(1, 10, 25_000, Currency::Inr, "Groceries"),
            expense(2, 10, 1_299, Currency::Usd, ""),
        ]
    }

    #[test]
    fn test_rows_keep_original_currencies_in_order() {
        let expenses = sample();
        let rows = to_csv_rows(&expenses);

        assert_eq!(rows.len(), 3);
        let summary: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.amount.as_str(), r.currency.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![("250.00", "INR"), ("12.99", "USD"), ("45.50", "EUR")]
        );
        assert_eq!(rows[2].tags, "dining;trip");
        assert_eq!(rows[2].payment_method, "Credit Card");
    }

    #[test]
    fn test_write_csv_output() {
        let expenses = sample();
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &to_csv_rows(&expenses)).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Date,Category,Amount,Currency,Tags,Payment Method,Note");
        assert_eq!(lines[1], "2025-01-10,Food,250.00,INR,,Cash,Groceries");
        assert_eq!(
            lines[3],
            "2025-01-12,Food,45.50,EUR,dining;trip,Credit Card,\"Croissants, coffee\""
        );
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &[]).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "Date,Category,Amount,Currency,Tags,Payment Method,Note\n"
        );
    }

    #[test]
    fn test_export_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.csv");
        let expenses = sample();

        assert_eq!(export_expenses_csv(&expenses, &path).unwrap(), 3);

        let mut reader = ::csv::Reader::from_path(&path).unwrap();
        let currencies: Vec<String> = reader
            .records()
            .map(|r| r.unwrap()[3].to_string())
            .collect();
        assert_eq!(currencies, vec!["INR", "USD", "EUR"]);
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("report.csv");
        let err = export_expenses_csv(&sample(), &path).unwrap_err();
        assert!(matches!(err, ExpenseError::Export(_)));
    }
}
