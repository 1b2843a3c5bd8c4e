//! Field-level checks shared by transactions and recurring templates.

use chrono::NaiveDate;

use crate::errors::ValidationError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Largest amount a single entry may carry. Keeps every monthly sum finite.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

pub fn ensure_positive_amount(amount: f64) -> Result<f64, ValidationError> {
    if !amount.is_finite() {
        Err(ValidationError::InvalidAmount(amount.to_string()))
    } else if amount <= 0.0 {
        Err(ValidationError::NonPositiveAmount(amount))
    } else if amount > MAX_AMOUNT {
        Err(ValidationError::AmountTooLarge(amount))
    } else {
        Ok(amount)
    }
}

/// Parses an amount typed by the user. Fractions are accepted; non-numeric input,
/// `inf`/`NaN`, values `<= 0` and values above [`MAX_AMOUNT`] are rejected.
pub fn parse_amount(raw: &str) -> Result<f64, ValidationError> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidAmount(raw.to_string()))?;
    if !amount.is_finite() {
        return Err(ValidationError::InvalidAmount(raw.to_string()));
    }
    ensure_positive_amount(amount)
}

/// Parses a `YYYY-MM-DD` calendar day.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

/// Returns the trimmed label, rejecting labels that are blank.
pub fn normalize_category(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyCategory)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
