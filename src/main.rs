use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use rust_decimal::Decimal;
use xpense::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for xpense::AppCommand {
    fn from(cmd: Commands) -> xpense::AppCommand {
        match cmd {
            Commands::Summary { as_of, json } => xpense::AppCommand::Summary { as_of, json },
            Commands::List => xpense::AppCommand::List,
            Commands::Add {
                amount,
                category,
                date,
                notes,
            } => xpense::AppCommand::Add(xpense::AddExpense {
                amount,
                category,
                date,
                notes,
            }),
            Commands::Delete { id } => xpense::AppCommand::Delete { id },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the spending dashboard
    Summary {
        /// Reference date for the monthly total (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all expenses
    List,
    /// Record a new expense
    Add {
        /// Amount spent, e.g. 12.50
        #[arg(short, long)]
        amount: Decimal,
        /// Category name from the configuration
        #[arg(short = 'C', long)]
        category: String,
        /// Date of the expense (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Delete an expense by id
    Delete {
        /// Expense id as shown by `list`
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => xpense::cli::setup::setup(),
        Some(cmd) => xpense::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
