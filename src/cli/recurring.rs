//! Recurring expense CLI commands

use chrono::NaiveDate;
use clap::Subcommand;

use super::{
    parse_amount, parse_category, parse_currency, parse_date, parse_method, parse_optional_date,
    parse_tags, Context,
};
use crate::display::rule_table;
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Interval, NewRecurringRule, RuleId};
use crate::services::RecurrenceService;

/// Recurring expense subcommands
#[derive(Subcommand)]
pub enum RecurringCommands {
    /// Add a recurring expense rule
    Add {
        /// Amount per occurrence
        amount: String,
        /// Category
        category: String,
        /// Interval: daily, weekly, monthly, quarterly, yearly or <N>d
        #[arg(short, long, default_value = "monthly")]
        interval: String,
        /// First due date (defaults to today)
        #[arg(short, long)]
        start: Option<String>,
        /// Currency code (defaults to the configured currency)
        #[arg(long)]
        currency: Option<String>,
        /// Tags (repeatable or comma-separated)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Payment method
        #[arg(short, long)]
        method: Option<String>,
        /// Note copied onto each expense
        #[arg(short, long)]
        note: Option<String>,
    },

    /// List recurring rules
    List {
        /// Include deactivated rules
        #[arg(short, long)]
        all: bool,
    },

    /// Record every due occurrence up to a date
    Run {
        /// Catch up to this date, no later than today (defaults to today)
        #[arg(long)]
        until: Option<String>,
    },

    /// Resume a deactivated rule
    Activate {
        /// Rule ID (e.g., "3" or "rule-3")
        id: String,
    },

    /// Stop a rule from producing expenses
    Deactivate {
        /// Rule ID
        id: String,
    },
}

/// Handle a recurring command
pub fn handle_recurring_command(ctx: &mut Context, cmd: RecurringCommands) -> ExpenseResult<()> {
    match cmd {
        RecurringCommands::Add {
            amount,
            category,
            interval,
            start,
            currency,
            tags,
            method,
            note,
        } => {
            let amount = parse_amount(&amount)?;
            let category = parse_category(&category)?;
            let interval: Interval = interval.parse()?;
            let start = match start {
                Some(s) => parse_date(&s, ctx.today)?,
                None => ctx.today,
            };
            let currency = parse_currency(currency.as_deref(), &ctx.settings)?;
            let method = parse_method(method.as_deref())?;

            let new = NewRecurringRule::new(category, amount, currency, interval, start)
                .with_tags(parse_tags(&tags))
                .with_payment_method(method)
                .with_note(note.unwrap_or_default());

            let rule = RecurrenceService::new(&mut ctx.store).add(new)?;
            println!(
                "Added recurring expense {}: {} {} for {}, next due {}",
                rule.id,
                rule.currency.format(rule.amount),
                rule.interval,
                rule.category,
                rule.next_due
            );
            if rule.is_due(ctx.today) {
                println!("Run 'extrack recurring run' to record occurrences that are already due");
            }
        }

        RecurringCommands::List { all } => {
            let service = RecurrenceService::new(&mut ctx.store);
            print!("{}", rule_table(&service.list(!all)));
        }

        RecurringCommands::Run { until } => {
            let as_of = catch_up_date(until.as_deref(), ctx.today)?;
            let produced = RecurrenceService::new(&mut ctx.store).run_due(as_of)?;

            if produced.is_empty() {
                println!("No recurring expenses due as of {}", as_of);
            } else {
                for m in &produced {
                    println!("Recorded {} from {} on {}", m.expense_id, m.rule_id, m.date);
                }
                println!("{} recurring expense(s) recorded", produced.len());
            }
        }

        RecurringCommands::Activate { id } => {
            let id: RuleId = id.parse()?;
            let (rule, skipped) =
                RecurrenceService::new(&mut ctx.store).activate(id, ctx.today)?;
            println!("Activated {} (next due {})", rule.id, rule.next_due);
            if skipped > 0 {
                println!("Skipped {} occurrence(s) that fell due while inactive", skipped);
            }
        }

        RecurringCommands::Deactivate { id } => {
            let id: RuleId = id.parse()?;
            let rule = RecurrenceService::new(&mut ctx.store).deactivate(id)?;
            println!("Deactivated {}", rule.id);
        }
    }

    Ok(())
}

/// Date to catch up to; expenses are never recorded for dates after `today`
fn catch_up_date(until: Option<&str>, today: NaiveDate) -> ExpenseResult<NaiveDate> {
    let as_of = parse_optional_date(until, today)?.unwrap_or(today);
    if as_of > today {
        return Err(ExpenseError::Validation(format!(
            "Cannot record recurring expenses after today ({}), got {}",
            today, as_of
        )));
    }
    Ok(as_of)
}
