//! Report CLI commands
//!
//! Spending summaries, share charts and monthly trends over a date range,
//! shown in one currency.

use clap::{Args, Subcommand, ValueEnum};

use super::{parse_currency, parse_optional_date, Context};
use crate::display::{render_share_chart, render_trend_chart};
use crate::error::ExpenseResult;
use crate::models::{Currency, YearMonth};
use crate::reports::{MonthlyTrend, ReportRange, SpendingReport};
use crate::storage::Store;

/// Date range presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RangePreset {
    /// The calendar month containing today
    #[value(name = "current-month")]
    CurrentMonth,
    /// The 90 days up to today
    #[value(name = "last-3-months")]
    LastThreeMonths,
    /// Every expense
    #[value(name = "all")]
    All,
}

#[derive(Debug, Clone, Args)]
pub struct RangeArgs {
    /// Range preset; ignored when --from or --to is given
    #[arg(short, long, value_enum, default_value_t = RangePreset::CurrentMonth)]
    pub range: RangePreset,
    /// Start of a custom range (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,
    /// End of a custom range (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
    /// Currency to report in (defaults to the configured currency)
    #[arg(long)]
    pub currency: Option<String>,
}

impl RangeArgs {
    fn resolve(&self, ctx: &Context) -> ExpenseResult<(ReportRange, Currency)> {
        let from = parse_optional_date(self.from.as_deref(), ctx.today)?;
        let to = parse_optional_date(self.to.as_deref(), ctx.today)?;
        let range = if from.is_some() || to.is_some() {
            ReportRange::custom(from, to)?
        } else {
            match self.range {
                RangePreset::CurrentMonth => ReportRange::current_month(ctx.today),
                RangePreset::LastThreeMonths => ReportRange::last_three_months(ctx.today),
                RangePreset::All => ReportRange::all_time(),
            }
        };
        let currency = parse_currency(self.currency.as_deref(), &ctx.settings)?;
        Ok((range, currency))
    }
}

/// Report subcommands
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Category breakdown with budget status and recurring expenses
    Summary {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Share of spending per category as a bar chart
    Chart {
        #[command(flatten)]
        range: RangeArgs,
        /// Width of the longest bar
        #[arg(short, long, default_value = "40")]
        width: usize,
    },

    /// Spending per month
    Trend {
        #[command(flatten)]
        range: RangeArgs,
        /// Width of the longest bar
        #[arg(short, long, default_value = "40")]
        width: usize,
    },
}

/// Handle a report command
pub fn handle_report_command(ctx: &mut Context, cmd: ReportCommands) -> ExpenseResult<()> {
    match cmd {
        ReportCommands::Summary { range } => {
            let report = spending_report(ctx, &range)?;
            print!("{}", report.format_terminal());
        }

        ReportCommands::Chart { range, width } => {
            let report = spending_report(ctx, &range)?;
            println!("Spending by category, {} ({})", report.range, report.currency);
            print!("{}", render_share_chart(&report, width));
        }

        ReportCommands::Trend { range, width } => {
            let (range, currency) = range.resolve(ctx)?;
            let converter = ctx.converter_for(report_currencies(&ctx.store, range), currency);
            let trend =
                MonthlyTrend::generate(ctx.store.expenses(), range, currency, converter.as_ref())?;
            println!("Monthly spending, {} ({})", range, currency);
            print!("{}", render_trend_chart(&trend, width));
        }
    }

    Ok(())
}

fn spending_report(ctx: &Context, args: &RangeArgs) -> ExpenseResult<SpendingReport> {
    let (range, currency) = args.resolve(ctx)?;
    let converter = ctx.converter_for(report_currencies(&ctx.store, range), currency);
    SpendingReport::generate(
        &ctx.store,
        range,
        currency,
        converter.as_ref(),
        ctx.settings.display_name(),
    )
}

/// Every currency a report over `range` may have to convert from
fn report_currencies(store: &Store, range: ReportRange) -> Vec<Currency> {
    let expenses = store
        .expenses()
        .iter()
        .filter(|e| range.overlaps(YearMonth::from_date(e.date)))
        .map(|e| e.currency);
    let rules = store.rules().iter().filter(|r| r.active).map(|r| r.currency);
    let budgets = store
        .budgets()
        .iter()
        .filter(|b| b.active && range.overlaps(b.month))
        .map(|b| b.currency);
    expenses.chain(rules).chain(budgets).collect()
}
