use super::ui;
use crate::core::{Dashboard, DashboardSummary, MonthWindow};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Cell, CellAlignment};

impl DashboardSummary {
    pub fn display_as_table(&self, currency: &str, window: &MonthWindow) -> String {
        let mut cards = ui::new_styled_table();
        cards.set_header(vec![
            ui::header_cell("Total Spent"),
            ui::header_cell(&format!("This Month ({window})")),
            ui::header_cell("Transactions"),
            ui::header_cell("Average"),
        ]);
        cards.add_row(vec![
            ui::amount_cell(self.total_amount, currency),
            ui::amount_cell(self.monthly_amount, currency),
            Cell::new(self.transaction_count).set_alignment(CellAlignment::Right),
            ui::amount_cell(self.average_amount, currency),
        ]);

        let mut output = format!(
            "{}\n\n{}",
            ui::style_text("Dashboard", ui::StyleType::Title),
            cards
        );

        if self.category_totals.is_empty() {
            output.push_str(&format!(
                "\n\n{}",
                ui::style_text("No expenses recorded yet.", ui::StyleType::Subtle)
            ));
            return output;
        }

        let mut categories = ui::new_styled_table();
        categories.set_header(vec![
            ui::header_cell("Category"),
            ui::header_cell(&format!("Spent ({currency})")),
            ui::header_cell("Share (%)"),
        ]);
        for (category, share) in self.category_shares() {
            categories.add_row(vec![
                ui::category_cell(&category.name, &category.icon, &category.color),
                ui::amount_cell(category.amount, currency),
                ui::format_percentage_cell(share),
            ]);
        }

        output.push_str(&format!(
            "\n\n{}\n\n{}",
            ui::style_text("Spending by Category", ui::StyleType::Title),
            categories
        ));
        output.push_str(&format!(
            "\n\n{}: {}",
            ui::style_text("Total", ui::StyleType::TotalLabel),
            ui::style_text(
                &ui::format_amount(self.total_amount, currency),
                ui::StyleType::TotalValue
            )
        ));
        output
    }
}

pub async fn run(dashboard: &Dashboard, as_of: NaiveDate, currency: &str, json: bool) -> Result<()> {
    let pb = ui::new_spinner("Fetching expenses...");
    let result = dashboard.refresh(as_of).await;
    pb.finish_and_clear();
    let summary = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{}",
            summary.display_as_table(currency, &MonthWindow::containing(as_of))
        );
    }
    Ok(())
}
