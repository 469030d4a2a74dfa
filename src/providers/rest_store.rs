//! Expense store backed by a PostgREST-style HTTP API.
//!
//! Expenses live in an `expenses` table with a `user_id` owner column and a
//! `category_id` foreign key into `categories`. Reads embed the category so
//! that each row arrives with its name, color and icon.

use crate::core::error::ValidationError;
use crate::core::expense::{ExpenseRecord, ExpenseRow, NewExpense, Session};
use crate::core::repository::ExpenseRepository;
use crate::providers::util::{is_transient, with_retry};
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, Response, Url};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

const EXPENSE_SELECT: &str = "id,amount,date,notes,category:categories(id,name,color,icon)";

pub struct RestExpenseStore {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct InsertBody<'a> {
    user_id: &'a str,
    amount: Decimal,
    date: NaiveDate,
    category_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
}

impl RestExpenseStore {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("xpense/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn expenses_url(&self, params: &[(&str, String)]) -> Result<Url> {
        let url = format!("{}/rest/v1/expenses", self.base_url);
        Url::parse_with_params(&url, params).with_context(|| format!("Invalid store URL: {url}"))
    }

    fn request(&self, method: Method, url: Url, session: &Session) -> RequestBuilder {
        // Without a user token the anon key doubles as bearer, as PostgREST gateways expect
        let token = session.access_token.as_deref().unwrap_or(&self.api_key);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
    }
}

fn owner_filter(session: &Session) -> (&'static str, String) {
    ("user_id", format!("eq.{}", session.user_id))
}

async fn read_body(response: Response, action: &str) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .with_context(|| format!("Failed to read store response while {action}"))?;
    if !status.is_success() {
        bail!("Store returned {status} while {action}: {body}");
    }
    Ok(body)
}

fn parse_rows(body: &str, action: &str) -> Result<Vec<ExpenseRow>> {
    serde_json::from_str(body).with_context(|| {
        format!("Failed to parse store response while {action}. Response: '{body}'")
    })
}

fn into_records(rows: Vec<ExpenseRow>) -> Result<Vec<ExpenseRecord>, ValidationError> {
    rows.into_iter().map(ExpenseRecord::try_from).collect()
}

#[async_trait]
impl ExpenseRepository for RestExpenseStore {
    async fn list_expenses(&self, session: &Session) -> Result<Vec<ExpenseRecord>> {
        let url = self.expenses_url(&[
            ("select", EXPENSE_SELECT.to_string()),
            owner_filter(session),
            ("order", "date.desc".to_string()),
        ])?;
        debug!("Requesting expenses from {}", url);

        let response = with_retry(
            || self.request(Method::GET, url.clone(), session).send(),
            3,
            500,
            is_transient,
        )
        .await
        .with_context(|| format!("Failed to send request for user: {}", session.user_id))?;

        let body = read_body(response, "listing expenses").await?;
        let records = into_records(parse_rows(&body, "listing expenses")?)?;
        debug!(
            "Successfully fetched {} expenses for user {}",
            records.len(),
            session.user_id
        );
        Ok(records)
    }

    async fn insert_expense(
        &self,
        session: &Session,
        expense: NewExpense,
    ) -> Result<ExpenseRecord> {
        expense.validate()?;
        let category_id = expense.category.id.as_deref().with_context(|| {
            format!("Category '{}' has no id in the store", expense.category.name)
        })?;
        let body = InsertBody {
            user_id: &session.user_id,
            amount: expense.amount,
            date: expense.date,
            category_id,
            notes: expense.notes.as_deref(),
        };

        let url = self.expenses_url(&[("select", EXPENSE_SELECT.to_string())])?;
        // Inserts are not idempotent, so a failed send is never retried
        let response = self
            .request(Method::POST, url, session)
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await
            .context("Failed to send insert request")?;

        let body = read_body(response, "inserting an expense").await?;
        let record = into_records(parse_rows(&body, "inserting an expense")?)?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Store returned no row for the inserted expense"))?;
        info!("Inserted expense {} for user {}", record.id, session.user_id);
        Ok(record)
    }

    async fn delete_expense(&self, session: &Session, id: &str) -> Result<()> {
        let url = self.expenses_url(&[
            ("id", format!("eq.{id}")),
            owner_filter(session),
            ("select", "id".to_string()),
        ])?;

        let response = with_retry(
            || {
                self.request(Method::DELETE, url.clone(), session)
                    .header("Prefer", "return=representation")
                    .send()
            },
            3,
            500,
            is_transient,
        )
        .await
        .with_context(|| format!("Failed to send delete request for expense: {id}"))?;

        let body = read_body(response, "deleting an expense").await?;
        let deleted: Vec<serde_json::Value> = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse delete response: '{body}'"))?;
        if deleted.is_empty() {
            bail!("Expense {id} not found");
        }
        info!("Deleted expense {} for user {}", id, session.user_id);
        Ok(())
    }
}
