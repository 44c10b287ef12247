//! Command-line front end. Validation and formatting live here; the store
//! and aggregation services stay free of presentation concerns.

pub mod output;
pub mod report;

use std::{fs, path::PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::{
    config::{Config, ConfigManager},
    core::{
        services::InsightOptions,
        utils::app_data_dir,
        ExpenseLedger, LedgerSnapshot,
    },
    domain::{Category, ExpenseRecord},
    errors::CliError,
    storage::CsvExpenseStore,
    utils::build_info,
};

use output::money;

#[derive(Parser, Debug)]
#[command(name = "expense_ledger_cli")]
#[command(about = "Record expenses and see where the money goes")]
pub struct Cli {
    /// Expense file to use (also read from `EXPENSE_LEDGER_FILE`).
    #[arg(long, global = true, env = "EXPENSE_LEDGER_FILE")]
    pub file: Option<PathBuf>,

    /// Disable coloured output.
    #[arg(long, global = true)]
    pub plain: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the expense file if it does not exist yet.
    Init,
    /// Record a new expense dated today.
    Add(AddArgs),
    /// Print every recorded expense in the order it was added.
    List,
    /// Totals, remaining budget, and per-category and per-day breakdowns.
    Summary(BudgetArgs),
    /// Observations about spending habits.
    Insights(BudgetArgs),
    /// Plain-text report suitable for saving or sharing.
    Report(ReportArgs),
    /// Show the known categories.
    Categories,
    /// Inspect or change saved preferences.
    Config(ConfigArgs),
    /// Print build information.
    Version,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(allow_negative_numbers = true)]
    pub amount: f64,
    pub category: String,
    #[arg(long, short, default_value = "")]
    pub note: String,
}

#[derive(Args, Debug)]
pub struct BudgetArgs {
    /// Budget to compare against; falls back to the saved monthly budget.
    #[arg(long)]
    pub budget: Option<f64>,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub budget: BudgetArgs,
    /// Write the report to this file instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Show,
    SetBudget { amount: f64 },
    ClearBudget,
    SetCurrency { symbol: String },
}

/// Parses process arguments and runs the selected command.
pub fn run_cli() -> Result<(), CliError> {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        file,
        plain,
        command,
    } = cli;
    output::set_plain(plain);

    let base = app_data_dir();
    let config_manager = ConfigManager::from_env();
    let config = config_manager.load()?;

    let command = match command {
        Command::Config(args) => return run_config(&config_manager, config, args.command),
        Command::Version => {
            output::info(build_info::current().summary_line());
            return Ok(());
        }
        Command::Categories => {
            for category in Category::ALL {
                output::info(category);
            }
            return Ok(());
        }
        other => other,
    };

    let ledger_path = file.unwrap_or_else(|| config.resolve_ledger_file(&base));
    tracing::debug!(path = %ledger_path.display(), "using expense file");
    let ledger = ExpenseLedger::open(Box::new(CsvExpenseStore::new(ledger_path.clone())))?;
    let currency = config.currency_symbol.as_str();

    match command {
        Command::Init => {
            output::success(format!("Expense file ready at {}", ledger_path.display()));
        }
        Command::Add(args) => {
            let record = ledger.record_expense(args.amount, &args.category, &args.note)?;
            output::success(format!(
                "Added {} to {} on {}",
                money(currency, record.amount),
                record.category,
                record.date
            ));
        }
        Command::List => {
            let records = ledger.records()?;
            print_records(&records, currency);
        }
        Command::Summary(args) => {
            let snapshot = ledger.snapshot(&insight_options(&config, &args))?;
            print_summary(&snapshot, currency);
        }
        Command::Insights(args) => {
            let snapshot = ledger.snapshot(&insight_options(&config, &args))?;
            print_insights(&snapshot, currency);
        }
        Command::Report(args) => {
            let snapshot = ledger.snapshot(&insight_options(&config, &args.budget))?;
            let text = report::render_report(&snapshot, currency);
            match args.output {
                Some(path) => {
                    fs::write(&path, text)?;
                    output::success(format!("Report written to {}", path.display()));
                }
                None => print!("{text}"),
            }
        }
        Command::Config(_) | Command::Version | Command::Categories => {}
    }
    Ok(())
}

fn insight_options(config: &Config, args: &BudgetArgs) -> InsightOptions {
    InsightOptions {
        budget: args.budget.or(config.monthly_budget),
        dominant_share: config.dominant_share_threshold,
    }
}

fn run_config(
    manager: &ConfigManager,
    mut config: Config,
    command: ConfigCommand,
) -> Result<(), CliError> {
    match command {
        ConfigCommand::Show => {
            let json = serde_json::to_string_pretty(&config)
                .map_err(|err| CliError::Input(err.to_string()))?;
            output::info(json);
            return Ok(());
        }
        ConfigCommand::SetBudget { amount } => {
            if !amount.is_finite() || amount < 0.0 {
                return Err(CliError::Input(format!(
                    "budget must be zero or a positive number, got {amount}"
                )));
            }
            config.monthly_budget = (amount > 0.0).then_some(amount);
        }
        ConfigCommand::ClearBudget => config.monthly_budget = None,
        ConfigCommand::SetCurrency { symbol } => config.currency_symbol = symbol,
    }
    manager.save(&config)?;
    output::success(format!("Configuration saved to {}", manager.path().display()));
    Ok(())
}

fn print_records(records: &[ExpenseRecord], currency: &str) {
    if records.is_empty() {
        output::info("No expenses added yet.");
        return;
    }
    for record in records {
        output::info(format!(
            "{}  {:>12}  {:<14} {}",
            record.date,
            money(currency, record.amount),
            record.category,
            record.note
        ));
    }
}

fn print_summary(snapshot: &LedgerSnapshot, currency: &str) {
    if snapshot.is_empty() {
        output::info("No expenses added yet.");
        return;
    }
    output::section("Expense Summary");
    output::info(format!("Total Spent: {}", money(currency, snapshot.total_spent)));
    if let Some(remaining) = snapshot.remaining_budget {
        let line = format!("Remaining Budget: {}", money(currency, remaining));
        if remaining < 0.0 {
            output::warning(line);
        } else {
            output::info(line);
        }
    }

    output::section("Category-wise Spending");
    for (category, amount) in report::sorted_categories(snapshot) {
        output::info(format!("{category:<16}{:>12}", money(currency, amount)));
    }

    output::section("Daily Spending Trend");
    for (date, amount) in &snapshot.by_day {
        output::info(format!("{date}  {:>12}", money(currency, *amount)));
    }
}

fn print_insights(snapshot: &LedgerSnapshot, currency: &str) {
    if snapshot.insights.is_empty() {
        output::info("No insights yet. Add an expense first.");
        return;
    }
    for insight in &snapshot.insights {
        let line = format!("• {}", insight.render(currency));
        if insight.is_warning() {
            output::warning(line);
        } else {
            output::info(line);
        }
    }
}
