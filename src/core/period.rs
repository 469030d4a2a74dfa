//! Calendar month windows.

use chrono::{Datelike, Days, Months, NaiveDate};
use std::fmt::Display;

/// An inclusive range covering one calendar month.
///
/// Dates are plain calendar dates; no timezone conversion is ever applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl MonthWindow {
    /// The month that `date` falls in, from its first to its last day.
    pub fn containing(date: NaiveDate) -> Self {
        let start = date - Days::new(u64::from(date.day0()));
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Display for MonthWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start.format("%B %Y"))
    }
}
