//! Derives dashboard metrics from a list of expense records.
//!
//! Everything here is a pure calculation: no I/O, no clock, no logging.
//! Callers pass the reference date explicitly and re-run the calculation
//! whenever the underlying records change.
use crate::core::error::{RecordField, ValidationError};
use crate::core::expense::{CategoryRef, ExpenseRecord};
use crate::core::money::Money;
use crate::core::period::MonthWindow;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How expense records are grouped into category totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// Group by category name.
    #[default]
    Name,
    /// Group by the category's stable id, falling back to the name for
    /// records that carry no id.
    CategoryId,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryOptions {
    pub group_by: GroupBy,
}

/// Total spent in one category. Color and icon come from the first record
/// seen for the category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    pub amount: Decimal,
    pub color: String,
    pub icon: String,
}

impl CategoryTotal {
    /// Percentage of `total` this category accounts for, to two decimal
    /// places. Zero when `total` is zero.
    pub fn share_of(&self, total: Decimal) -> Decimal {
        if total.is_zero() {
            return Decimal::ZERO;
        }
        (self.amount * Decimal::ONE_HUNDRED / total)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// All metrics shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_amount: Decimal,
    pub monthly_amount: Decimal,
    pub transaction_count: usize,
    pub average_amount: Decimal,
    /// In order of first appearance in the input, not sorted by amount.
    pub category_totals: Vec<CategoryTotal>,
}

impl DashboardSummary {
    pub fn empty() -> Self {
        Self {
            total_amount: Money::ZERO.to_decimal(),
            monthly_amount: Money::ZERO.to_decimal(),
            transaction_count: 0,
            average_amount: Money::ZERO.to_decimal(),
            category_totals: Vec::new(),
        }
    }

    /// Each category paired with its percentage share of the total.
    pub fn category_shares(&self) -> Vec<(&CategoryTotal, Decimal)> {
        self.category_totals
            .iter()
            .map(|c| (c, c.share_of(self.total_amount)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum GroupKey<'a> {
    Name(&'a str),
    Id(&'a str),
}

impl GroupBy {
    fn key(self, category: &CategoryRef) -> GroupKey<'_> {
        match (self, category.id.as_deref()) {
            (GroupBy::CategoryId, Some(id)) => GroupKey::Id(id),
            _ => GroupKey::Name(&category.name),
        }
    }
}

struct Group<'a> {
    category: &'a CategoryRef,
    amount: Money,
}

/// Summarizes `expenses` with default options, grouping categories by name.
pub fn summarize(
    expenses: &[ExpenseRecord],
    as_of: NaiveDate,
) -> Result<DashboardSummary, ValidationError> {
    summarize_with(expenses, as_of, &SummaryOptions::default())
}

/// Summarizes `expenses` relative to the month containing `as_of`.
///
/// Fails on the first malformed record; no partial summary is produced.
pub fn summarize_with(
    expenses: &[ExpenseRecord],
    as_of: NaiveDate,
    options: &SummaryOptions,
) -> Result<DashboardSummary, ValidationError> {
    let window = MonthWindow::containing(as_of);

    let mut total = Money::ZERO;
    let mut monthly = Money::ZERO;
    let mut index: HashMap<GroupKey<'_>, usize> = HashMap::new();
    let mut groups: Vec<Group<'_>> = Vec::new();

    for expense in expenses {
        let amount = expense.validate()?;

        // Every amount is positive, so no partial sum can exceed the total.
        total = total.checked_add(amount).ok_or_else(|| {
            ValidationError::new(
                &expense.id,
                RecordField::Amount,
                "running total exceeds the representable range",
            )
        })?;

        if window.contains(expense.date) {
            monthly += amount;
        }

        let key = options.group_by.key(&expense.category);
        match index.get(&key).copied() {
            Some(i) => groups[i].amount += amount,
            None => {
                index.insert(key, groups.len());
                groups.push(Group {
                    category: &expense.category,
                    amount,
                });
            }
        }
    }

    let category_totals = groups
        .into_iter()
        .map(|g| CategoryTotal {
            name: g.category.name.clone(),
            amount: g.amount.to_decimal(),
            color: g.category.color.clone(),
            icon: g.category.icon.clone(),
        })
        .collect();

    Ok(DashboardSummary {
        total_amount: total.to_decimal(),
        monthly_amount: monthly.to_decimal(),
        transaction_count: expenses.len(),
        average_amount: total.average_over(expenses.len()).to_decimal(),
        category_totals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn expense(id: &str, amount: &str, day: NaiveDate, category: &str) -> ExpenseRecord {
        ExpenseRecord {
            id: id.to_string(),
            amount: dec(amount),
            date: day,
            category: CategoryRef::new(category, "#FF6384", "🍔"),
            notes: None,
        }
    }

    #[test]
    fn test_empty_input() {
        let summary = summarize(&[], date(2024, 6, 15)).unwrap();

        assert_eq!(summary.total_amount, Decimal::ZERO);
        assert_eq!(summary.monthly_amount, Decimal::ZERO);
        assert_eq!(summary.transaction_count, 0);
        assert_eq!(summary.average_amount, Decimal::ZERO);
        assert!(summary.category_totals.is_empty());
        assert_eq!(summary, DashboardSummary::empty());
    }

    #[test]
    fn test_average() {
        let day = date(2024, 6, 1);
        let expenses = vec![
            expense("1", "10", day, "Food"),
            expense("2", "20", day, "Food"),
            expense("3", "30", day, "Food"),
        ];

        let summary = summarize(&expenses, day).unwrap();
        assert_eq!(summary.total_amount, dec("60"));
        assert_eq!(summary.transaction_count, 3);
        assert_eq!(summary.average_amount, dec("20"));
    }

    #[test]
    fn test_category_grouping_keeps_first_seen_order() {
        let day = date(2024, 6, 1);
        let expenses = vec![
            expense("1", "10", day, "Food"),
            expense("2", "5", day, "Transport"),
            expense("3", "7", day, "Food"),
        ];

        let summary = summarize(&expenses, day).unwrap();
        let totals: Vec<(&str, Decimal)> = summary
            .category_totals
            .iter()
            .map(|c| (c.name.as_str(), c.amount))
            .collect();
        assert_eq!(totals, vec![("Food", dec("17")), ("Transport", dec("5"))]);
    }

    #[test]
    fn test_order_is_not_sorted_by_amount() {
        let day = date(2024, 6, 1);
        let expenses = vec![
            expense("1", "1", day, "Health"),
            expense("2", "500", day, "Bills"),
            expense("3", "2", day, "Food"),
        ];

        let summary = summarize(&expenses, day).unwrap();
        let names: Vec<&str> = summary
            .category_totals
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Health", "Bills", "Food"]);
    }

    #[test]
    fn test_sum_invariant() {
        let day = date(2024, 6, 1);
        let expenses = vec![
            expense("1", "0.10", day, "Food"),
            expense("2", "0.20", day, "Transport"),
            expense("3", "19.99", day, "Food"),
            expense("4", "1000.01", day, "Bills"),
            expense("5", "3.33", date(2023, 1, 1), "Transport"),
        ];

        let summary = summarize(&expenses, day).unwrap();
        let by_category: Decimal = summary.category_totals.iter().map(|c| c.amount).sum();
        assert_eq!(summary.total_amount, by_category);
        assert_eq!(summary.total_amount, dec("1023.63"));
    }

    #[test]
    fn test_month_boundaries() {
        let as_of = date(2024, 2, 14);
        let expenses = vec![
            expense("before", "1", date(2024, 1, 31), "Food"),
            expense("first", "10", date(2024, 2, 1), "Food"),
            expense("last", "100", date(2024, 2, 29), "Food"),
            expense("after", "1000", date(2024, 3, 1), "Food"),
        ];

        let summary = summarize(&expenses, as_of).unwrap();
        assert_eq!(summary.monthly_amount, dec("110"));
        // Lifetime metrics ignore the window
        assert_eq!(summary.total_amount, dec("1111"));
        assert_eq!(summary.transaction_count, 4);
    }

    #[test]
    fn test_same_month_in_other_year_is_excluded() {
        let expenses = vec![expense("1", "9", date(2023, 6, 15), "Food")];
        let summary = summarize(&expenses, date(2024, 6, 15)).unwrap();
        assert_eq!(summary.monthly_amount, Decimal::ZERO);
    }

    #[test]
    fn test_non_positive_amount_fails() {
        let day = date(2024, 6, 1);
        for bad in ["-1", "0"] {
            let expenses = vec![
                expense("ok", "10", day, "Food"),
                expense("bad", bad, day, "Food"),
            ];
            let err = summarize(&expenses, day).unwrap_err();
            assert_eq!(err.record_id, "bad");
            assert_eq!(err.field, RecordField::Amount);
        }
    }

    #[test]
    fn test_sub_cent_amount_fails() {
        let day = date(2024, 6, 1);
        let err = summarize(&[expense("x", "1.005", day, "Food")], day).unwrap_err();
        assert_eq!(err.field, RecordField::Amount);
    }

    #[test]
    fn test_missing_category_name_fails() {
        let day = date(2024, 6, 1);
        let err = summarize(&[expense("x", "1", day, "")], day).unwrap_err();
        assert_eq!(err.record_id, "x");
        assert_eq!(err.field, RecordField::Category);
    }

    #[test]
    fn test_first_seen_snapshot_wins() {
        let day = date(2024, 6, 1);
        let mut recolored = expense("2", "5", day, "Food");
        recolored.category.color = "#000000".to_string();
        recolored.category.icon = "🥗".to_string();
        let expenses = vec![expense("1", "10", day, "Food"), recolored];

        let summary = summarize(&expenses, day).unwrap();
        assert_eq!(summary.category_totals.len(), 1);
        assert_eq!(summary.category_totals[0].color, "#FF6384");
        assert_eq!(summary.category_totals[0].icon, "🍔");
        assert_eq!(summary.category_totals[0].amount, dec("15"));
    }

    #[test]
    fn test_group_by_category_id() {
        let day = date(2024, 6, 1);
        let mut before_rename = expense("1", "10", day, "Groceries");
        before_rename.category.id = Some("c1".to_string());
        let mut after_rename = expense("2", "5", day, "Food");
        after_rename.category.id = Some("c1".to_string());
        let mut other_food = expense("3", "2", day, "Food");
        other_food.category.id = Some("c2".to_string());
        let no_id = expense("4", "1", day, "Food");
        let expenses = vec![before_rename, after_rename, other_food, no_id];

        let options = SummaryOptions {
            group_by: GroupBy::CategoryId,
        };
        let summary = summarize_with(&expenses, day, &options).unwrap();
        let totals: Vec<(&str, Decimal)> = summary
            .category_totals
            .iter()
            .map(|c| (c.name.as_str(), c.amount))
            .collect();
        assert_eq!(
            totals,
            vec![("Groceries", dec("15")), ("Food", dec("2")), ("Food", dec("1"))]
        );

        // The same records grouped by name
        let summary = summarize(&expenses, day).unwrap();
        let names: Vec<&str> = summary
            .category_totals
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Groceries", "Food"]);
        assert_eq!(summary.category_totals[1].amount, dec("8"));
    }

    #[test]
    fn test_category_shares() {
        let day = date(2024, 6, 1);
        let expenses = vec![
            expense("1", "10", day, "Food"),
            expense("2", "20", day, "Transport"),
        ];

        let summary = summarize(&expenses, day).unwrap();
        let shares: Vec<Decimal> = summary
            .category_shares()
            .into_iter()
            .map(|(_, share)| share)
            .collect();
        assert_eq!(shares, vec![dec("33.33"), dec("66.67")]);
    }

    #[test]
    fn test_share_of_zero_total() {
        let category = CategoryTotal {
            name: "Food".to_string(),
            amount: Decimal::ZERO,
            color: "#FF6384".to_string(),
            icon: "🍔".to_string(),
        };
        assert_eq!(category.share_of(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let day = date(2024, 6, 1);
        let expenses = vec![
            expense("1", "10.10", day, "Food"),
            expense("2", "5.05", date(2024, 5, 31), "Transport"),
            expense("3", "7.77", day, "Food"),
        ];

        let first = summarize(&expenses, day).unwrap();
        let second = summarize(&expenses, day).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_average_rounds_to_cents() {
        let day = date(2024, 6, 1);
        let expenses = vec![
            expense("1", "10", day, "Food"),
            expense("2", "0.01", day, "Food"),
            expense("3", "0.01", day, "Food"),
        ];
        let summary = summarize(&expenses, day).unwrap();
        assert_eq!(summary.average_amount, dec("3.34"));
    }
}
