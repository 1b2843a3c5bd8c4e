//! Recurring transaction templates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{validation, Month, Transaction, TransactionSource, TransactionType};
use crate::errors::ValidationError;

/// A reusable definition realized into one ledger entry per month.
///
/// Templates are immutable once stored; edits are modelled as delete-and-recreate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTemplate {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl RecurringTemplate {
    pub fn from_draft(
        draft: NewRecurringTemplate,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        validation::ensure_positive_amount(draft.amount)?;
        Ok(Self {
            id: Uuid::new_v4(),
            kind: draft.kind,
            category: validation::normalize_category(&draft.category)?,
            amount: draft.amount,
            note: validation::normalize_note(draft.note),
            created_at,
        })
    }

    /// Materializes this template as a ledger entry dated the first day of `month`.
    pub fn realize(&self, month: Month, created_at: DateTime<Utc>) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            date: month.first_day(),
            kind: self.kind,
            category: self.category.clone(),
            amount: self.amount,
            note: self.note.clone(),
            created_at,
            updated_at: None,
            source: TransactionSource::Recurring,
            recurring_id: Some(self.id),
            applied_month: Some(month),
        }
    }
}

/// Caller-supplied fields for a recurring template.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecurringTemplate {
    pub kind: TransactionType,
    pub category: String,
    pub amount: f64,
    pub note: Option<String>,
}

impl NewRecurringTemplate {
    pub fn new(kind: TransactionType, category: impl Into<String>, amount: f64) -> Self {
        Self {
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn from_draft_validates_like_transactions() {
        let rent = NewRecurringTemplate::new(TransactionType::Expense, " Rent ", 80000.0);
        let template = RecurringTemplate::from_draft(rent, now()).expect("valid template");
        assert_eq!(template.category, "Rent");

        let blank = NewRecurringTemplate::new(TransactionType::Expense, "", 80000.0);
        assert_eq!(
            RecurringTemplate::from_draft(blank, now()),
            Err(ValidationError::EmptyCategory)
        );
        let free = NewRecurringTemplate::new(TransactionType::Income, "Gift", 0.0);
        assert_eq!(
            RecurringTemplate::from_draft(free, now()),
            Err(ValidationError::NonPositiveAmount(0.0))
        );
    }

    #[test]
    fn realize_copies_template_fields() {
        let draft =
            NewRecurringTemplate::new(TransactionType::Income, "Salary", 300000.0).with_note("May");
        let template = RecurringTemplate::from_draft(draft, now()).unwrap();
        let month: Month = "2024-05".parse().unwrap();
        let txn = template.realize(month, now());

        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(txn.kind, TransactionType::Income);
        assert_eq!(txn.category, "Salary");
        assert_eq!(txn.amount, 300000.0);
        assert_eq!(txn.note.as_deref(), Some("May"));
        assert_eq!(txn.source, TransactionSource::Recurring);
        assert_eq!(txn.recurring_id, Some(template.id));
        assert_eq!(txn.applied_month, Some(month));
        assert_ne!(txn.id, template.id);
        assert!(txn.validate().is_ok());
    }
}
