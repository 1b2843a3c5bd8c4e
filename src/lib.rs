#![doc(test(attr(deny(warnings))))]

//! Kakeibo Core is the storage and bookkeeping engine of a personal household ledger:
//! durable observable stores, the transaction ledger, categories, recurring templates,
//! month reconciliation, and monthly aggregation.

pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod time;
pub mod utils;

pub use crate::core::{
    AggregationEngine, ApplyReport, CategoryTotal, MonthlySummary, MonthlyTotals,
    ReconciliationEngine, StoreRegistry,
};
pub use config::{Config, ConfigManager};
pub use domain::{
    Month, NewRecurringTemplate, NewTransaction, RecurringTemplate, Transaction,
    TransactionPatch, TransactionSource, TransactionType,
};
pub use errors::{ConfigError, KakeiboError, StorageError, ValidationError};
pub use ledger::{CategoryRegistry, RecurringTemplateStore, TransactionLedger};
pub use storage::{JsonFileBackend, MemoryBackend, PersistentStore, StorageBackend, Subscription};
pub use time::{Clock, FixedClock, SystemClock};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Kakeibo Core tracing initialized.");
    });
}
