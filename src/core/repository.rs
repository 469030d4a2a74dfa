//! Data store abstraction for expense records

use crate::core::expense::{ExpenseRecord, NewExpense, Session};
use anyhow::Result;
use async_trait::async_trait;

/// Owner-scoped access to expense records, each joined to its category.
///
/// Every call acts on the records of `session.user_id` only. Listing order
/// is store-defined and callers must not depend on it.
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn list_expenses(&self, session: &Session) -> Result<Vec<ExpenseRecord>>;

    async fn insert_expense(&self, session: &Session, expense: NewExpense)
    -> Result<ExpenseRecord>;

    async fn delete_expense(&self, session: &Session, id: &str) -> Result<()>;
}
