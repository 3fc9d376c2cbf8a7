use std::process::ExitCode;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use expense_tracker::cli::{
    handle_budget_command, handle_config_command, handle_expense_command, handle_export_command,
    handle_rates_command, handle_recurring_command, handle_report_command, handle_tag_command,
    BudgetCommands, ConfigCommands, Context, ExpenseCommands, ExportCommands, RatesCommands,
    RecurringCommands, ReportCommands, TagCommands,
};
use expense_tracker::config::{ExpensePaths, Settings};
use expense_tracker::logging::init_logging;
use expense_tracker::models::Currency;
use expense_tracker::services::run_due;
use expense_tracker::storage::Store;
use expense_tracker::ExpenseError;

#[derive(Parser)]
#[command(
    name = "extrack",
    version,
    about = "Single-user expense tracker",
    long_about = "Record expenses in several currencies, set monthly budgets with \
                  threshold alerts, schedule recurring expenses and export or \
                  chart your spending from the command line."
)]
struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Move a corrupt data file aside and start with an empty store
    #[arg(long, global = true)]
    reset_corrupt: bool,

    /// Do not record due recurring expenses on startup
    #[arg(long, global = true)]
    no_recurring: bool,

    /// Never fetch exchange rates; use cached rates only
    #[arg(long, global = true, env = "EXPENSE_TRACKER_OFFLINE")]
    offline: bool,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true, hide = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and settings
    Init {
        /// Your name, shown in reports
        #[arg(short, long)]
        name: Option<String>,
        /// Default currency code
        #[arg(long)]
        currency: Option<String>,
    },

    /// Show or change configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Expense management commands
    #[command(subcommand, alias = "exp")]
    Expense(ExpenseCommands),

    /// Recurring expense commands
    #[command(subcommand)]
    Recurring(RecurringCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Spending reports and charts
    #[command(subcommand)]
    Report(ReportCommands),

    /// Export expenses
    #[command(subcommand)]
    Export(ExportCommands),

    /// Exchange rate commands
    #[command(subcommand)]
    Rates(RatesCommands),

    /// Tag rules used to infer categories
    #[command(subcommand)]
    Tag(TagCommands),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let recoverable = err
                .downcast_ref::<ExpenseError>()
                .is_some_and(ExpenseError::is_recoverable);
            ExitCode::from(if recoverable { 2 } else { 1 })
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        println!("extrack - single-user expense tracker");
        println!();
        println!("Run 'extrack init' to get started.");
        println!("Run 'extrack --help' for usage information.");
        return Ok(());
    };

    let paths = ExpensePaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());

    if let Commands::Init { name, currency } = &command {
        return init(&paths, &mut settings, name.as_deref(), currency.as_deref());
    }

    let store = match command {
        Commands::Config(_) => Store::empty(paths.data_file()),
        _ => open_store(&paths, cli.reset_corrupt)?,
    };

    let mut ctx = Context {
        paths,
        settings,
        store,
        today,
        offline: cli.offline,
    };

    if !cli.no_recurring && !matches!(command, Commands::Config(_)) {
        let produced = run_due(&mut ctx.store, today)?;
        if !produced.is_empty() {
            eprintln!("Recorded {} due recurring expense(s)", produced.len());
        }
    }

    match command {
        Commands::Init { .. } => {}
        Commands::Config(cmd) => handle_config_command(&mut ctx, cmd)?,
        Commands::Expense(cmd) => handle_expense_command(&mut ctx, cmd)?,
        Commands::Recurring(cmd) => handle_recurring_command(&mut ctx, cmd)?,
        Commands::Budget(cmd) => handle_budget_command(&mut ctx, cmd)?,
        Commands::Report(cmd) => handle_report_command(&mut ctx, cmd)?,
        Commands::Export(cmd) => handle_export_command(&mut ctx, cmd)?,
        Commands::Rates(cmd) => handle_rates_command(&mut ctx, cmd)?,
        Commands::Tag(cmd) => handle_tag_command(&mut ctx, cmd)?,
    }

    Ok(())
}

fn open_store(paths: &ExpensePaths, reset_corrupt: bool) -> Result<Store, ExpenseError> {
    if !reset_corrupt {
        return Store::open(paths.data_file());
    }

    let (store, moved) = Store::open_or_reset(paths.data_file())?;
    if let Some(backup) = moved {
        eprintln!(
            "Data file was corrupt; moved it to {} and started empty",
            backup.display()
        );
    }
    Ok(store)
}

fn init(
    paths: &ExpensePaths,
    settings: &mut Settings,
    name: Option<&str>,
    currency: Option<&str>,
) -> Result<()> {
    println!("Initializing expense tracker at: {}", paths.base_dir().display());

    if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
        settings.user_name = Some(name.to_string());
    }
    if let Some(code) = currency {
        let currency = Currency::from_code(code)?;
        settings.default_currency = currency;
        settings.rates.base = currency;
    }

    paths.ensure_directories()?;
    settings.save(paths)?;

    let data_file = paths.data_file();
    if data_file.exists() {
        // Refuse to continue over a file we cannot read
        Store::open(&data_file)?;
        println!("Existing data file kept: {}", data_file.display());
    } else {
        Store::empty(&data_file).save()?;
        println!("Created data file: {}", data_file.display());
    }

    println!("Initialization complete!");
    println!();
    println!("Default currency: {}", settings.default_currency);
    println!("Run 'extrack expense add' to record your first expense.");
    Ok(())
}
