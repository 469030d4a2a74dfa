//! Core domain types and the aggregation engine

pub mod analytics;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod expense;
pub mod log;
pub mod money;
pub mod period;
pub mod repository;

// Re-export main types for cleaner imports
pub use analytics::{
    CategoryTotal, DashboardSummary, GroupBy, SummaryOptions, summarize, summarize_with,
};
pub use dashboard::Dashboard;
pub use error::{RecordField, ValidationError};
pub use expense::{CategoryRef, ExpenseRecord, NewExpense, Session};
pub use money::{CentsError, Money};
pub use period::MonthWindow;
pub use repository::ExpenseRepository;
