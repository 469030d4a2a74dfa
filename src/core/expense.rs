//! Expense records and the category snapshots they carry.

use crate::core::error::{RecordField, ValidationError};
use crate::core::money::Money;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

pub const DEFAULT_CATEGORY_COLOR: &str = "#C9CBCF";
pub const DEFAULT_CATEGORY_ICON: &str = "❓";

/// Snapshot of a category as it looked when the expense was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_icon")]
    pub icon: String,
}

fn default_color() -> String {
    DEFAULT_CATEGORY_COLOR.to_string()
}

fn default_icon() -> String {
    DEFAULT_CATEGORY_ICON.to_string()
}

impl CategoryRef {
    pub fn new(name: &str, color: &str, icon: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: CategoryRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ExpenseRecord {
    /// Checks the record and returns its amount in cents.
    pub fn validate(&self) -> Result<Money, ValidationError> {
        if self.category.name.trim().is_empty() {
            return Err(ValidationError::new(
                &self.id,
                RecordField::Category,
                "missing category name",
            ));
        }
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::new(
                &self.id,
                RecordField::Amount,
                format!("must be positive, got {}", self.amount),
            ));
        }
        Money::try_from_decimal(self.amount).map_err(|err| {
            ValidationError::new(&self.id, RecordField::Amount, format!("{} {err}", self.amount))
        })
    }
}

/// Payload for creating an expense. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: CategoryRef,
    pub notes: Option<String>,
}

impl NewExpense {
    /// Same checks as [`ExpenseRecord::validate`], before an id exists.
    pub fn validate(&self) -> Result<Money, ValidationError> {
        self.clone().into_record("(new)".to_string()).validate()
    }

    pub fn into_record(self, id: String) -> ExpenseRecord {
        ExpenseRecord {
            id,
            amount: self.amount,
            date: self.date,
            category: self.category,
            notes: self.notes,
        }
    }
}

/// Identifies whose records a repository call acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub access_token: Option<String>,
}

impl Session {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }
}

/// An expense row as a data store returns it, before any typing.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseRow {
    #[serde(default)]
    pub id: Value,
    pub amount: Value,
    pub date: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, alias = "categories")]
    pub category: Option<CategoryRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRow {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Only non-blank strings and numbers identify a row.
fn parse_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_amount(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    // Timestamps are cut down to their calendar date, ISO or Postgres text form
    let day = text.trim().split(['T', ' ']).next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

impl TryFrom<ExpenseRow> for ExpenseRecord {
    type Error = ValidationError;

    fn try_from(row: ExpenseRow) -> Result<Self, Self::Error> {
        let id = parse_id(&row.id).ok_or_else(|| {
            ValidationError::new(
                "(missing id)",
                RecordField::Id,
                format!("expected a string or number, got {}", row.id),
            )
        })?;

        let amount = parse_amount(&row.amount).ok_or_else(|| {
            ValidationError::new(
                &id,
                RecordField::Amount,
                format!("not a number: {}", row.amount),
            )
        })?;

        let date = parse_date(&row.date).ok_or_else(|| {
            ValidationError::new(&id, RecordField::Date, format!("unparseable date '{}'", row.date))
        })?;

        let category = row
            .category
            .and_then(|c| {
                let name = c.name.filter(|n| !n.trim().is_empty())?;
                Some(CategoryRef {
                    id: c.id.as_ref().map(value_to_string),
                    name,
                    color: c.color.unwrap_or_else(default_color),
                    icon: c.icon.unwrap_or_else(default_icon),
                })
            })
            .ok_or_else(|| {
                ValidationError::new(&id, RecordField::Category, "missing category name")
            })?;

        let record = ExpenseRecord {
            id,
            amount,
            date,
            category,
            notes: row.notes,
        };
        record.validate()?;
        Ok(record)
    }
}
