use crate::core::expense::{ExpenseRecord, NewExpense, Session};
use crate::core::repository::ExpenseRepository;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

const PARTITION: &str = "expenses";

/// Local expense store on a fjall keyspace.
///
/// Keys are `<user_id> 0x00 <id>`, so a prefix scan yields one user's
/// records. Ids are time ordered hex, which keeps scans in insertion order.
pub struct DiskExpenseStore {
    keyspace: Keyspace,
    expenses: PartitionHandle,
    last_id: AtomicU64,
}

impl DiskExpenseStore {
    pub fn new(db_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(db_path)
            .with_context(|| format!("Failed to create directory: {}", db_path.display()))?;

        let keyspace = fjall::Config::new(db_path)
            .open()
            .with_context(|| format!("Failed to open expense store at {}", db_path.display()))?;
        let expenses = keyspace.open_partition(PARTITION, PartitionCreateOptions::default())?;
        debug!("Opened expense store at {}", db_path.display());
        Ok(Self {
            keyspace,
            expenses,
            last_id: AtomicU64::new(0),
        })
    }

    fn next_id(&self) -> String {
        let now = u64::try_from(Utc::now().timestamp_nanos_opt().unwrap_or_default())
            .unwrap_or_default();
        let previous = self
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| {
                Some(now.max(prev + 1))
            })
            .unwrap_or_else(|prev| prev);
        format!("{:016x}", now.max(previous + 1))
    }

    fn persist(&self) -> Result<()> {
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist expense store")
    }
}

fn user_prefix(user_id: &str) -> Vec<u8> {
    let mut prefix = user_id.as_bytes().to_vec();
    prefix.push(0);
    prefix
}

fn record_key(user_id: &str, id: &str) -> Vec<u8> {
    let mut key = user_prefix(user_id);
    key.extend_from_slice(id.as_bytes());
    key
}

#[async_trait]
impl ExpenseRepository for DiskExpenseStore {
    async fn list_expenses(&self, session: &Session) -> Result<Vec<ExpenseRecord>> {
        let mut expenses = Vec::new();
        for item in self.expenses.prefix(user_prefix(&session.user_id)) {
            let (key, value) = item?;
            let record: ExpenseRecord = serde_json::from_slice(&value).with_context(|| {
                format!(
                    "Corrupt expense entry {}",
                    String::from_utf8_lossy(&key).replace('\0', "/")
                )
            })?;
            expenses.push(record);
        }
        debug!(
            "Disk store LIST for {}: {} expenses",
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
        let record = expense.into_record(self.next_id());

        self.expenses.insert(
            record_key(&session.user_id, &record.id),
            serde_json::to_vec(&record)?,
        )?;
        self.persist()?;
        debug!("Disk store INSERT {} for {}", record.id, session.user_id);
        Ok(record)
    }

    async fn delete_expense(&self, session: &Session, id: &str) -> Result<()> {
        let key = record_key(&session.user_id, id);
        if self.expenses.get(&key)?.is_none() {
            bail!("Expense {id} not found");
        }
        self.expenses.remove(key)?;
        self.persist()?;
        debug!("Disk store DELETE {} for {}", id, session.user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::expense::CategoryRef;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    fn new_expense(cents: i64, notes: &str) -> NewExpense {
        NewExpense {
            amount: Decimal::new(cents, 2),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            category: CategoryRef::new("Bills", "#9966FF", "💡").with_id("bills"),
            notes: Some(notes.to_string()),
        }
    }

    #[tokio::test]
    async fn test_insert_list_delete() {
        let dir = tempdir().unwrap();
        let store = DiskExpenseStore::new(dir.path()).unwrap();
        let alice = Session::new("alice");

        let first = store.insert_expense(&alice, new_expense(100, "a")).await.unwrap();
        let second = store.insert_expense(&alice, new_expense(250, "b")).await.unwrap();
        assert!(first.id < second.id);

        let listed = store.list_expenses(&alice).await.unwrap();
        assert_eq!(listed, vec![first.clone(), second.clone()]);

        store.delete_expense(&alice, &first.id).await.unwrap();
        assert_eq!(store.list_expenses(&alice).await.unwrap(), vec![second]);

        let err = store.delete_expense(&alice, &first.id).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let dir = tempdir().unwrap();
        let store = DiskExpenseStore::new(dir.path()).unwrap();
        let alice = Session::new("alice");
        // "alice" is a byte prefix of "alice2"; the separator keeps them apart
        let alice2 = Session::new("alice2");

        let record = store.insert_expense(&alice2, new_expense(100, "x")).await.unwrap();

        assert!(store.list_expenses(&alice).await.unwrap().is_empty());
        assert!(store.delete_expense(&alice, &record.id).await.is_err());
        assert_eq!(store.list_expenses(&alice2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        let alice = Session::new("alice");
        let record = {
            let store = DiskExpenseStore::new(dir.path()).unwrap();
            store.insert_expense(&alice, new_expense(999, "kept")).await.unwrap()
        };

        let store = DiskExpenseStore::new(dir.path()).unwrap();
        assert_eq!(store.list_expenses(&alice).await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_expense() {
        let dir = tempdir().unwrap();
        let store = DiskExpenseStore::new(dir.path()).unwrap();
        let alice = Session::new("alice");

        assert!(store.insert_expense(&alice, new_expense(0, "zero")).await.is_err());
        assert!(store.list_expenses(&alice).await.unwrap().is_empty());
    }
}
