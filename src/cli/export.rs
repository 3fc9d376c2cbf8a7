//! CLI commands for data export

use std::path::PathBuf;

use clap::Subcommand;

use super::{parse_category, parse_optional_date, Context};
use crate::error::ExpenseResult;
use crate::export::export_expenses_csv;
use crate::services::{ExpenseFilter, ExpenseService};

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export expenses to CSV, amounts in their original currency
    Csv {
        /// Output file path
        output: PathBuf,
        /// Only expenses on or after this date
        #[arg(long)]
        from: Option<String>,
        /// Only expenses on or before this date
        #[arg(long)]
        to: Option<String>,
        /// Only expenses in this category
        #[arg(short, long)]
        category: Option<String>,
        /// Only expenses with this tag
        #[arg(short, long)]
        tag: Option<String>,
    },
}

/// Handle export commands
pub fn handle_export_command(ctx: &mut Context, cmd: ExportCommands) -> ExpenseResult<()> {
    match cmd {
        ExportCommands::Csv {
            output,
            from,
            to,
            category,
            tag,
        } => {
            let mut filter = ExpenseFilter::between(
                parse_optional_date(from.as_deref(), ctx.today)?,
                parse_optional_date(to.as_deref(), ctx.today)?,
            );
            filter.category = category.as_deref().map(parse_category).transpose()?;
            filter.tag = tag;

            let service = ExpenseService::new(&mut ctx.store);
            let count = export_expenses_csv(service.list(&filter), &output)?;
            println!("Exported {} expense(s) to {}", count, output.display());
        }
    }

    Ok(())
}
