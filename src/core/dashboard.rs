use crate::core::analytics::{self, DashboardSummary, SummaryOptions};
use crate::core::expense::{ExpenseRecord, NewExpense, Session};
use crate::core::repository::ExpenseRepository;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

/// Ties a repository to a session and recomputes the summary from scratch
/// after every read or mutation.
pub struct Dashboard {
    repository: Arc<dyn ExpenseRepository>,
    session: Session,
    options: SummaryOptions,
}

impl Dashboard {
    pub fn new(repository: Arc<dyn ExpenseRepository>, session: Session) -> Self {
        Self {
            repository,
            session,
            options: SummaryOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SummaryOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn expenses(&self) -> Result<Vec<ExpenseRecord>> {
        let expenses = self
            .repository
            .list_expenses(&self.session)
            .await
            .with_context(|| format!("Failed to list expenses for user {}", self.session.user_id))?;
        debug!(
            "Fetched {} expenses for user {}",
            expenses.len(),
            self.session.user_id
        );
        Ok(expenses)
    }

    /// Refetches all records and summarizes them.
    pub async fn refresh(&self, as_of: NaiveDate) -> Result<DashboardSummary> {
        let expenses = self.expenses().await?;
        let summary = analytics::summarize_with(&expenses, as_of, &self.options)?;
        Ok(summary)
    }

    pub async fn add(
        &self,
        expense: NewExpense,
        as_of: NaiveDate,
    ) -> Result<(ExpenseRecord, DashboardSummary)> {
        let created = self
            .repository
            .insert_expense(&self.session, expense)
            .await
            .context("Failed to add expense")?;
        info!("Added expense {}", created.id);
        let summary = self.refresh(as_of).await?;
        Ok((created, summary))
    }

    pub async fn remove(&self, id: &str, as_of: NaiveDate) -> Result<DashboardSummary> {
        self.repository
            .delete_expense(&self.session, id)
            .await
            .with_context(|| format!("Failed to delete expense {id}"))?;
        info!("Deleted expense {id}");
        self.refresh(as_of).await
    }
}
