use super::ui;
use crate::core::config::AppConfig;
use crate::core::{Dashboard, MonthWindow, NewExpense};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Builds the insert payload, resolving the category against the config.
pub fn new_expense(
    config: &AppConfig,
    amount: Decimal,
    category: &str,
    date: NaiveDate,
    notes: Option<String>,
) -> Result<NewExpense> {
    let category = config.find_category(category).with_context(|| {
        let known: Vec<&str> = config.categories.iter().map(|c| c.name.as_str()).collect();
        format!(
            "Unknown category '{category}'. Known categories: {}",
            known.join(", ")
        )
    })?;
    let expense = NewExpense {
        amount,
        date,
        category: category.clone(),
        notes: notes.filter(|n| !n.trim().is_empty()),
    };
    expense.validate()?;
    Ok(expense)
}

pub async fn add(
    dashboard: &Dashboard,
    expense: NewExpense,
    as_of: NaiveDate,
    currency: &str,
) -> Result<()> {
    let (created, summary) = dashboard.add(expense, as_of).await?;
    println!(
        "Added {} {} on {} ({})",
        ui::format_amount(created.amount, currency),
        created.category.name,
        created.date,
        ui::style_text(&created.id, ui::StyleType::Subtle)
    );
    println!(
        "\n{}",
        summary.display_as_table(currency, &MonthWindow::containing(as_of))
    );
    Ok(())
}

pub async fn delete(dashboard: &Dashboard, id: &str, as_of: NaiveDate, currency: &str) -> Result<()> {
    let summary = dashboard.remove(id, as_of).await?;
    println!("Deleted expense {id}");
    println!(
        "\n{}",
        summary.display_as_table(currency, &MonthWindow::containing(as_of))
    );
    Ok(())
}
