use crate::core::expense::{ExpenseRecord, NewExpense, Session};
use crate::core::repository::ExpenseRepository;
use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory expense store, partitioned by user. Records are listed in
/// insertion order.
pub struct MemoryExpenseStore {
    inner: Arc<Mutex<HashMap<String, Vec<ExpenseRecord>>>>,
    next_id: AtomicU64,
}

impl MemoryExpenseStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Creates a store holding `expenses` for `user_id`. The records are
    /// kept as given, without validation.
    pub fn with_expenses(user_id: &str, expenses: Vec<ExpenseRecord>) -> Self {
        let mut users = HashMap::new();
        users.insert(user_id.to_string(), expenses);
        Self {
            inner: Arc::new(Mutex::new(users)),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for MemoryExpenseStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExpenseRepository for MemoryExpenseStore {
    async fn list_expenses(&self, session: &Session) -> Result<Vec<ExpenseRecord>> {
        let users = self.inner.lock().await;
        let expenses = users.get(&session.user_id).cloned().unwrap_or_default();
        debug!(
            "Memory store LIST for {}: {} expenses",
            session.user_id,
            expenses.len()
        );
        Ok(expenses)
    }

    async fn insert_expense(
        &self,
        session: &Session,
        expense: NewExpense,
    ) -> Result<ExpenseRecord> {
        expense.validate()?;
        let id = format!("mem-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = expense.into_record(id);

        let mut users = self.inner.lock().await;
        users
            .entry(session.user_id.clone())
            .or_default()
            .push(record.clone());
        debug!("Memory store INSERT {} for {}", record.id, session.user_id);
        Ok(record)
    }

    async fn delete_expense(&self, session: &Session, id: &str) -> Result<()> {
        let mut users = self.inner.lock().await;
        let expenses = users.entry(session.user_id.clone()).or_default();
        match expenses.iter().position(|e| e.id == id) {
            Some(index) => {
                expenses.remove(index);
                debug!("Memory store DELETE {} for {}", id, session.user_id);
                Ok(())
            }
            None => bail!("Expense {id} not found"),
        }
    }
}
