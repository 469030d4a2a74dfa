pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::Dashboard;
use crate::core::config::AppConfig;
use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Fields of a new expense as entered on the command line.
#[derive(Debug, Clone)]
pub struct AddExpense {
    pub amount: Decimal,
    pub category: String,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

pub enum AppCommand {
    Summary {
        as_of: Option<NaiveDate>,
        json: bool,
    },
    List,
    Add(AddExpense),
    Delete {
        id: String,
    },
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Expense tracker starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let repository = store::open_repository(&config)?;
    let dashboard =
        Dashboard::new(repository, config.session()).with_options(config.summary_options());
    let currency = config.currency.as_str();

    match command {
        AppCommand::Summary { as_of, json } => {
            cli::summary::run(&dashboard, as_of.unwrap_or_else(today), currency, json).await
        }
        AppCommand::List => cli::list::run(&dashboard, currency).await,
        AppCommand::Add(add) => {
            let today = today();
            let expense = cli::manage::new_expense(
                &config,
                add.amount,
                &add.category,
                add.date.unwrap_or(today),
                add.notes,
            )?;
            cli::manage::add(&dashboard, expense, today, currency).await
        }
        AppCommand::Delete { id } => cli::manage::delete(&dashboard, &id, today(), currency).await,
    }
}
