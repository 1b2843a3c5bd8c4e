//! Realizes recurring templates into concrete ledger entries, once per (template, month).

use std::collections::HashSet;

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    domain::{Month, RecurringTemplate, Transaction},
    ledger::TransactionLedger,
    time::Clock,
};

/// Outcome of applying templates to a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyReport {
    pub month: Month,
    pub applied: usize,
}

pub struct ReconciliationEngine;

impl ReconciliationEngine {
    /// Synthesizes the entries still missing for `target`, without touching any store.
    ///
    /// A template counts as applied when the snapshot already holds a recurring entry with its
    /// id and `applied_month == target`. Templates sharing an id are realized at most once.
    pub fn plan(
        target: Month,
        templates: &[RecurringTemplate],
        snapshot: &[Transaction],
        clock: &dyn Clock,
    ) -> Vec<Transaction> {
        let mut realized: HashSet<Uuid> = snapshot
            .iter()
            .filter(|txn| txn.is_recurring() && txn.applied_month == Some(target))
            .filter_map(|txn| txn.recurring_id)
            .collect();
        let created_at = clock.timestamp();
        templates
            .iter()
            .filter(|template| realized.insert(template.id))
            .map(|template| template.realize(target, created_at))
            .collect()
    }

    /// Applies every template not yet realized for `target` with one batched ledger write.
    ///
    /// When nothing is missing the ledger is not written at all. The exclusive borrow of
    /// `ledger` spans the scan and the write, so no other mutation can slip in between.
    pub fn apply_to_month(
        target: Month,
        templates: &[RecurringTemplate],
        ledger: &mut TransactionLedger,
        clock: &dyn Clock,
    ) -> ApplyReport {
        let batch = Self::plan(target, templates, ledger.all(), clock);
        if batch.is_empty() {
            debug!(month = %target, "recurring templates already applied");
            return ApplyReport {
                month: target,
                applied: 0,
            };
        }
        let applied = ledger.add_many(batch);
        info!(month = %target, applied, "recurring templates applied");
        ApplyReport {
            month: target,
            applied,
        }
    }
}
