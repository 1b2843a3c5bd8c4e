//! Domain models for ledger transactions.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{validation, Month};
use crate::errors::ValidationError;

/// Direction of money flow for a transaction or template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        };
        f.write_str(label)
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(ValidationError::InvalidType(other.to_string())),
        }
    }
}

/// Records how a transaction entered the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionSource {
    #[default]
    Manual,
    Recurring,
}

/// A single income or expense entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source: TransactionSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_month: Option<Month>,
}

impl Transaction {
    /// Builds a manual transaction from a validated draft.
    pub fn manual(
        draft: NewTransaction,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let draft = draft.validated()?;
        Ok(Self {
            id: Uuid::new_v4(),
            date: draft.date,
            kind: draft.kind,
            category: draft.category,
            amount: draft.amount,
            note: draft.note,
            created_at,
            updated_at: None,
            source: TransactionSource::Manual,
            recurring_id: None,
            applied_month: None,
        })
    }

    pub fn month(&self) -> Month {
        Month::of(self.date)
    }

    pub fn is_recurring(&self) -> bool {
        self.source == TransactionSource::Recurring
    }

    /// Checks the record-level invariants that the type system cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::ensure_positive_amount(self.amount)?;
        validation::normalize_category(&self.category)?;
        Ok(())
    }

    /// Returns a copy with `patch` merged in and `updated_at` stamped, or the
    /// validation failure of the merged record.
    pub fn patched(
        &self,
        patch: TransactionPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let mut next = self.clone();
        if let Some(date) = patch.date {
            next.date = date;
        }
        if let Some(kind) = patch.kind {
            next.kind = kind;
        }
        if let Some(category) = patch.category {
            next.category = validation::normalize_category(&category)?;
        }
        if let Some(amount) = patch.amount {
            next.amount = amount;
        }
        if let Some(note) = patch.note {
            next.note = validation::normalize_note(note);
        }
        next.updated_at = Some(updated_at);
        next.validate()?;
        Ok(next)
    }
}

/// Caller-supplied fields for a manual transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub kind: TransactionType,
    pub category: String,
    pub amount: f64,
    pub note: Option<String>,
}

impl NewTransaction {
    pub fn new(
        date: NaiveDate,
        kind: TransactionType,
        category: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            date,
            kind,
            category: category.into(),
            amount,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Parses raw form input. Every field is checked before anything is returned.
    pub fn parse(
        date: &str,
        kind: &str,
        category: &str,
        amount: &str,
        note: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let draft = Self {
            date: validation::parse_date(date)?,
            kind: kind.parse()?,
            category: category.to_string(),
            amount: validation::parse_amount(amount)?,
            note: note.map(str::to_string),
        };
        draft.validated()
    }

    fn validated(self) -> Result<Self, ValidationError> {
        validation::ensure_positive_amount(self.amount)?;
        Ok(Self {
            category: validation::normalize_category(&self.category)?,
            note: validation::normalize_note(self.note),
            ..self
        })
    }
}

/// Partial update applied by [`crate::ledger::TransactionLedger::update`].
///
/// `note: Some(None)` clears the note; `note: None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub date: Option<NaiveDate>,
    pub kind: Option<TransactionType>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub note: Option<Option<String>>,
}

impl TransactionPatch {
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn note(mut self, note: Option<String>) -> Self {
        self.note = Some(note);
        self
    }
}
