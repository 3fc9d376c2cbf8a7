//! Expense CLI commands
//!
//! Implements CLI commands for recording, listing, editing and deleting
//! expenses.

use std::io::{self, BufRead, Write};

use chrono::NaiveDate;
use clap::Subcommand;

use super::{
    parse_amount, parse_category, parse_currency, parse_date, parse_method, parse_optional_date,
    parse_tags, Context, Prompter,
};
use crate::config::Settings;
use crate::display::{expense_details, expense_table, format_budget_alert};
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{
    infer_category, Budget, BudgetScope, Currency, Expense, ExpenseId, ExpenseUpdate, NewExpense,
    PaymentMethod, TagRules, YearMonth,
};
use crate::services::{BudgetTracker, ExpenseFilter, ExpenseService};

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense (prompts for details when no amount is given)
    Add {
        /// Amount (e.g., "250" or "1,299.50")
        amount: Option<String>,
        /// Currency code (defaults to the configured currency)
        #[arg(long)]
        currency: Option<String>,
        /// Category; inferred from tags or note when omitted
        #[arg(short, long)]
        category: Option<String>,
        /// Date (YYYY-MM-DD, "today" or "yesterday")
        #[arg(short, long)]
        date: Option<String>,
        /// Tags (repeatable or comma-separated)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Payment method (e.g., "cash", "credit-card", "upi")
        #[arg(short, long)]
        method: Option<String>,
        /// Note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// List expenses
    List {
        /// Only expenses on or after this date
        #[arg(long)]
        from: Option<String>,
        /// Only expenses on or before this date
        #[arg(long)]
        to: Option<String>,
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
        /// Filter by tag
        #[arg(short, long)]
        tag: Option<String>,
        /// Filter by currency
        #[arg(long)]
        currency: Option<String>,
        /// Show only the most recent N expenses
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show expense details
    Show {
        /// Expense ID (e.g., "12" or "exp-12")
        id: String,
    },

    /// Edit an expense
    Edit {
        /// Expense ID
        id: String,
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        /// Replace all tags (repeatable or comma-separated)
        #[arg(short, long = "tag")]
        tags: Option<Vec<String>>,
        #[arg(short, long)]
        method: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle an expense command
pub fn handle_expense_command(ctx: &mut Context, cmd: ExpenseCommands) -> ExpenseResult<()> {
    match cmd {
        ExpenseCommands::Add {
            amount,
            currency,
            category,
            date,
            tags,
            method,
            note,
        } => {
            let Some(amount) = amount else {
                let has_fields = currency.is_some()
                    || category.is_some()
                    || date.is_some()
                    || !tags.is_empty()
                    || method.is_some()
                    || note.is_some();
                if has_fields {
                    return Err(ExpenseError::Validation(
                        "An amount is required when other fields are given".into(),
                    ));
                }
                let stdin = io::stdin();
                let mut prompter = Prompter::new(stdin.lock(), io::stdout());
                let new = prompt_new_expense(
                    &mut prompter,
                    ctx.store.tag_rules(),
                    &ctx.settings,
                    ctx.today,
                )?;
                return add_expense(ctx, new);
            };

            let amount = parse_amount(&amount)?;
            let currency = parse_currency(currency.as_deref(), &ctx.settings)?;
            let date = parse_optional_date(date.as_deref(), ctx.today)?.unwrap_or(ctx.today);
            let tags = parse_tags(&tags);
            let method = parse_method(method.as_deref())?;
            let note = note.unwrap_or_default();
            let explicit = category.as_deref().map(parse_category).transpose()?;

            let category =
                ExpenseService::new(&mut ctx.store).resolve_category(explicit, &tags, &note);
            let new = NewExpense::new(date, amount, currency, category)
                .with_tags(tags)
                .with_payment_method(method)
                .with_note(note);
            add_expense(ctx, new)?;
        }

        ExpenseCommands::List {
            from,
            to,
            category,
            tag,
            currency,
            limit,
        } => {
            let mut filter = ExpenseFilter::between(
                parse_optional_date(from.as_deref(), ctx.today)?,
                parse_optional_date(to.as_deref(), ctx.today)?,
            );
            filter.category = category.as_deref().map(parse_category).transpose()?;
            filter.tag = tag;
            filter.currency = currency.as_deref().map(Currency::from_code).transpose()?;
            filter.limit = limit;

            let date_format = ctx.settings.date_format.clone();
            let service = ExpenseService::new(&mut ctx.store);
            let expenses = service.list(&filter);
            print!("{}", expense_table(&expenses, &date_format));
            if !expenses.is_empty() {
                println!("{} expense(s)", expenses.len());
            }
        }

        ExpenseCommands::Show { id } => {
            let id: ExpenseId = id.parse()?;
            let expense = ExpenseService::new(&mut ctx.store).get(id)?;
            print!("{}", expense_details(&expense, &ctx.settings.date_format));
        }

        ExpenseCommands::Edit {
            id,
            amount,
            currency,
            category,
            date,
            tags,
            method,
            note,
        } => {
            let id: ExpenseId = id.parse()?;
            let update = ExpenseUpdate {
                date: parse_optional_date(date.as_deref(), ctx.today)?,
                amount: amount.as_deref().map(parse_amount).transpose()?,
                currency: currency.as_deref().map(Currency::from_code).transpose()?,
                category: category.as_deref().map(parse_category).transpose()?,
                tags: tags.map(|t| parse_tags(&t)),
                payment_method: method
                    .as_deref()
                    .map(|m| m.parse::<PaymentMethod>())
                    .transpose()?,
                note,
            };

            let expense = ExpenseService::new(&mut ctx.store).edit(id, &update)?;
            println!("Updated expense {}", expense.id);
            print!("{}", expense_details(&expense, &ctx.settings.date_format));
            print_budget_alerts(ctx, &expense)?;
        }

        ExpenseCommands::Delete { id, force } => {
            let id: ExpenseId = id.parse()?;
            let mut service = ExpenseService::new(&mut ctx.store);

            if !force {
                let expense = service.get(id)?;
                println!("About to delete: {}", expense);
                println!("Use --force to confirm deletion");
                return Ok(());
            }

            let removed = service.delete(id)?;
            println!("Deleted expense {}: {}", removed.id, removed);
        }
    }

    Ok(())
}

fn add_expense(ctx: &mut Context, new: NewExpense) -> ExpenseResult<()> {
    let expense = ExpenseService::new(&mut ctx.store).add(new)?;
    println!(
        "Added expense {}: {} for {} on {}",
        expense.id,
        expense.currency.format(expense.amount),
        expense.category,
        expense.date.format(&ctx.settings.date_format)
    );
    print_budget_alerts(ctx, &expense)
}

/// Print an alert for every budget of the expense's month at warning or above.
///
/// The expense is already saved, so a missing rate only produces a warning.
fn print_budget_alerts(ctx: &mut Context, expense: &Expense) -> ExpenseResult<()> {
    let month = YearMonth::from_date(expense.date);
    let scopes = [BudgetScope::Category(expense.category), BudgetScope::Overall];
    let budgets: Vec<&Budget> = scopes
        .iter()
        .filter_map(|scope| ctx.store.active_budget(*scope, month))
        .collect();
    let converter = ctx.budget_converter(budgets);

    let tracker = BudgetTracker::new(&mut ctx.store, converter.as_ref());
    match tracker.alerts_for(expense) {
        Ok(alerts) => {
            for status in alerts {
                println!("{}", format_budget_alert(&status));
            }
            Ok(())
        }
        Err(e) if e.is_recoverable() => {
            eprintln!("Warning: could not check budgets: {}", e);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Ask for each field of a new expense.
///
/// Blank answers take the shown default; a blank category is inferred from
/// the tags and note.
pub fn prompt_new_expense<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    tag_rules: &TagRules,
    settings: &Settings,
    today: NaiveDate,
) -> ExpenseResult<NewExpense> {
    let amount = prompter.ask_with("Amount", None, parse_amount)?;
    let currency = prompter.ask_with(
        "Currency",
        Some(settings.default_currency.code()),
        Currency::from_code,
    )?;
    let today_str = today.format("%Y-%m-%d").to_string();
    let date = prompter.ask_with("Date", Some(&today_str), |s| parse_date(s, today))?;
    let note = prompter.ask("Note", Some(""))?;
    let tags = parse_tags(&[prompter.ask("Tags (comma-separated)", Some(""))?]);

    let inferred = infer_category(tag_rules, &tags, &note);
    let category = prompter.ask_with("Category", Some(inferred.name()), parse_category)?;
    let method = prompter.ask_with(
        "Payment method",
        Some(PaymentMethod::default().label()),
        |s| s.parse::<PaymentMethod>(),
    )?;

    Ok(NewExpense::new(date, amount, currency, category)
        .with_tags(tags)
        .with_payment_method(method)
        .with_note(note))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_tag_rules, Category, Money};
    use std::io::Cursor;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn run_prompt(input: &str) -> (ExpenseResult<NewExpense>, String) {
        let mut prompter = Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let result = prompt_new_expense(
            &mut prompter,
            &default_tag_rules(),
            &Settings::default(),
            date(2025, 1, 15),
        );
        let output = String::from_utf8(prompter.into_output()).unwrap();
        (result, output)
    }

    #[test]
    fn test_prompt_with_defaults() {
        let (result, _) = run_prompt("450\n\n\nWeekly groceries\ngroceries\n\n\n");
        let new = result.unwrap();
        assert_eq!(new.amount, Money::from_minor(45_000));
        assert_eq!(new.currency, Currency::Inr);
        assert_eq!(new.date, date(2025, 1, 15));
        assert_eq!(new.category, Category::Food);
        assert_eq!(new.payment_method, PaymentMethod::default());
        assert!(new.tags.contains("groceries"));
    }

    #[test]
    fn test_prompt_reasks_invalid_answers() {
        let input = "-5\nabc\n12.50\nXYZ\nusd\n2025-02-30\n2025-01-10\nTaxi\n\nTravel\nupi\n";
        let (result, output) = run_prompt(input);
        let new = result.unwrap();

        assert_eq!(new.amount, Money::from_minor(1_250));
        assert_eq!(new.currency, Currency::Usd);
        assert_eq!(new.date, date(2025, 1, 10));
        assert_eq!(new.category, Category::Travel);
        assert_eq!(new.payment_method, PaymentMethod::Upi);
        assert_eq!(output.matches("Amount: ").count(), 3);
        assert!(output.contains("Unsupported currency: XYZ"));
    }

    #[test]
    fn test_prompt_aborts_on_closed_input() {
        let (result, _) = run_prompt("100\n");
        assert!(result.is_err());
    }
}
