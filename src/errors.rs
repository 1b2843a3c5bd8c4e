use std::result::Result as StdResult;

use thiserror::Error;

/// Rejections raised before a mutation touches any store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Amount must be greater than zero (got {0})")]
    NonPositiveAmount(f64),
    #[error("Amount exceeds the supported maximum (got {0})")]
    AmountTooLarge(f64),
    #[error("Amount is not a number: `{0}`")]
    InvalidAmount(String),
    #[error("Category must not be empty")]
    EmptyCategory,
    #[error("Invalid date: `{0}` (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("Invalid transaction type: `{0}` (expected income or expense)")]
    InvalidType(String),
    #[error("Invalid month: `{0}` (expected YYYY-MM)")]
    InvalidMonth(String),
}

/// Failures reported by a durable backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while loading or saving [`crate::config::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Unified error type for process-start APIs.
#[derive(Debug, Error)]
pub enum KakeiboError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Persistence error: {0}")]
    Storage(#[from] StorageError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = StdResult<T, KakeiboError>;
