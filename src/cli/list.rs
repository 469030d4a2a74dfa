use super::ui;
use crate::core::{Dashboard, ExpenseRecord};
use anyhow::Result;
use comfy_table::{Cell, Color, Table};

/// Renders expenses newest first; ties keep the store's order.
pub fn expenses_table(expenses: &[ExpenseRecord], currency: &str) -> Table {
    let mut sorted: Vec<&ExpenseRecord> = expenses.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Category"),
        ui::header_cell("Amount"),
        ui::header_cell("Notes"),
        ui::header_cell("Id"),
    ]);
    for expense in sorted {
        table.add_row(vec![
            Cell::new(expense.date.format("%Y-%m-%d")),
            ui::category_cell(
                &expense.category.name,
                &expense.category.icon,
                &expense.category.color,
            ),
            ui::amount_cell(expense.amount, currency),
            Cell::new(expense.notes.as_deref().unwrap_or("")),
            Cell::new(&expense.id).fg(Color::DarkGrey),
        ]);
    }
    table
}

pub async fn run(dashboard: &Dashboard, currency: &str) -> Result<()> {
    let pb = ui::new_spinner("Fetching expenses...");
    let result = dashboard.expenses().await;
    pb.finish_and_clear();
    let expenses = result?;

    if expenses.is_empty() {
        println!("No expenses recorded yet.");
        return Ok(());
    }
    println!("{}", expenses_table(&expenses, currency));
    Ok(())
}
