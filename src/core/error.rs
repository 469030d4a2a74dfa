use std::fmt::Display;
use thiserror::Error;

/// The part of an expense record that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Id,
    Amount,
    Date,
    Category,
}

impl Display for RecordField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RecordField::Id => "id",
                RecordField::Amount => "amount",
                RecordField::Date => "date",
                RecordField::Category => "category",
            }
        )
    }
}

/// A malformed expense record. Aggregation stops at the first one found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field} on expense {record_id}: {reason}")]
pub struct ValidationError {
    pub record_id: String,
    pub field: RecordField,
    pub reason: String,
}

impl ValidationError {
    pub fn new(record_id: impl Into<String>, field: RecordField, reason: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names_record_and_field() {
        let err = ValidationError::new("exp-7", RecordField::Amount, "must be positive, got -1");
        assert_eq!(
            err.to_string(),
            "Invalid amount on expense exp-7: must be positive, got -1"
        );
    }

    #[test]
    fn test_converts_into_anyhow() {
        let err: anyhow::Error = ValidationError::new("x", RecordField::Date, "bad").into();
        let inner = err.downcast_ref::<ValidationError>().unwrap();
        assert_eq!(inner.field, RecordField::Date);
    }
}
