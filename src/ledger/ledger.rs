use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::{
    domain::{Month, NewTransaction, Transaction, TransactionPatch, TransactionType},
    errors::ValidationError,
    storage::{PersistentStore, StorageBackend, Subscription},
    time::Clock,
};

/// Ordered collection of transactions, newest first, persisted on every mutation.
pub struct TransactionLedger {
    store: PersistentStore<Vec<Transaction>>,
    clock: Arc<dyn Clock>,
}

impl TransactionLedger {
    pub fn open(
        key: impl Into<String>,
        backend: Arc<dyn StorageBackend>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store: PersistentStore::open(key, backend, Vec::new()),
            clock,
        }
    }

    /// Validates and records a manual transaction. Nothing changes when validation fails.
    pub fn add(&mut self, draft: NewTransaction) -> Result<Transaction, ValidationError> {
        let txn = Transaction::manual(draft, self.clock.timestamp())?;
        let stored = txn.clone();
        self.store.modify(|txns| txns.insert(0, stored));
        debug!(id = %txn.id, kind = %txn.kind, amount = txn.amount, "transaction added");
        Ok(txn)
    }

    /// Prepends a pre-validated batch with a single write, keeping the batch order.
    ///
    /// Entries are trusted as-is; only internal producers such as reconciliation call this.
    pub fn add_many(&mut self, batch: Vec<Transaction>) -> usize {
        let count = batch.len();
        if count == 0 {
            return 0;
        }
        self.store.modify(|txns| {
            txns.splice(0..0, batch);
        });
        debug!(count, "transaction batch added");
        count
    }

    /// Removes the transaction with `id`. Returns `false` without writing when it is absent.
    pub fn delete(&mut self, id: Uuid) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.store.modify(|txns| txns.retain(|txn| txn.id != id));
        debug!(%id, "transaction deleted");
        true
    }

    /// Merges `patch` into the transaction with `id` and re-validates the result.
    ///
    /// Returns `Ok(false)` when `id` is absent. A rejected patch leaves the stored record intact.
    pub fn update(&mut self, id: Uuid, patch: TransactionPatch) -> Result<bool, ValidationError> {
        let Some(position) = self.position(id) else {
            return Ok(false);
        };
        let next = self.store.get()[position].patched(patch, self.clock.timestamp())?;
        self.store.modify(|txns| txns[position] = next);
        debug!(%id, "transaction updated");
        Ok(true)
    }

    pub fn all(&self) -> &[Transaction] {
        self.store.get()
    }

    pub fn get(&self, id: Uuid) -> Option<&Transaction> {
        self.all().iter().find(|txn| txn.id == id)
    }

    pub fn len(&self) -> usize {
        self.all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.all().is_empty()
    }

    /// Entries dated within `month`, in ledger order.
    pub fn by_month(&self, month: Month) -> Vec<&Transaction> {
        self.all()
            .iter()
            .filter(|txn| month.contains(txn.date))
            .collect()
    }

    /// Entries of the given type, in ledger order.
    pub fn by_type(&self, kind: TransactionType) -> Vec<&Transaction> {
        self.all().iter().filter(|txn| txn.kind == kind).collect()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&Vec<Transaction>) + Send + 'static,
    {
        self.store.subscribe(listener)
    }

    pub fn is_durable(&self) -> bool {
        self.store.is_durable()
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.all().iter().position(|txn| txn.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransactionSource;
    use crate::storage::MemoryBackend;
    use crate::time::FixedClock;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ledger() -> (TransactionLedger, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let clock = Arc::new(FixedClock::on(2024, 5, 20));
        (
            TransactionLedger::open("kakeibo:transactions", backend.clone(), clock),
            backend,
        )
    }

    fn expense(date: NaiveDate, category: &str, amount: f64) -> NewTransaction {
        NewTransaction::new(date, TransactionType::Expense, category, amount)
    }

    #[test]
    fn add_prepends_and_persists() {
        let (mut ledger, backend) = ledger();
        let first = ledger.add(expense(day(2024, 5, 1), "食費", 500.0)).unwrap();
        let second = ledger.add(expense(day(2024, 5, 2), "交通", 300.0)).unwrap();

        assert_ne!(first.id, second.id);
        let ids: Vec<Uuid> = ledger.all().iter().map(|txn| txn.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(backend.writes(), 2);
    }

    #[test]
    fn add_rejects_invalid_draft_without_writing() {
        let (mut ledger, backend) = ledger();
        let err = ledger.add(expense(day(2024, 5, 1), " ", 500.0)).unwrap_err();
        assert_eq!(err, ValidationError::EmptyCategory);
        let err = ledger.add(expense(day(2024, 5, 1), "食費", -1.0)).unwrap_err();
        assert_eq!(err, ValidationError::NonPositiveAmount(-1.0));
        assert!(ledger.is_empty());
        assert_eq!(backend.writes(), 0);
    }

    #[test]
    fn delete_missing_id_is_a_silent_no_op() {
        let (mut ledger, backend) = ledger();
        let txn = ledger.add(expense(day(2024, 5, 1), "食費", 500.0)).unwrap();
        assert!(!ledger.delete(Uuid::new_v4()));
        assert_eq!(backend.writes(), 1);
        assert!(ledger.delete(txn.id));
        assert!(ledger.is_empty());
        assert!(!ledger.delete(txn.id));
    }

    #[test]
    fn update_revalidates_and_keeps_prior_record_on_rejection() {
        let (mut ledger, _backend) = ledger();
        let txn = ledger.add(expense(day(2024, 5, 1), "食費", 500.0)).unwrap();

        let err = ledger
            .update(txn.id, TransactionPatch::default().amount(0.0))
            .unwrap_err();
        assert_eq!(err, ValidationError::NonPositiveAmount(0.0));
        assert_eq!(ledger.get(txn.id), Some(&txn));

        let changed = ledger
            .update(txn.id, TransactionPatch::default().category("外食").amount(800.0))
            .unwrap();
        assert!(changed);
        let stored = ledger.get(txn.id).unwrap();
        assert_eq!(stored.category, "外食");
        assert_eq!(stored.amount, 800.0);
        assert!(stored.updated_at.is_some());

        assert_eq!(
            ledger.update(Uuid::new_v4(), TransactionPatch::default().amount(1.0)),
            Ok(false)
        );
    }

    #[test]
    fn add_many_keeps_batch_order_and_writes_once() {
        let (mut ledger, backend) = ledger();
        let existing = ledger.add(expense(day(2024, 4, 30), "食費", 100.0)).unwrap();
        let batch: Vec<Transaction> = ["家賃", "光熱費"]
            .iter()
            .map(|category| {
                let draft = expense(day(2024, 5, 1), category, 1000.0);
                Transaction::manual(draft, existing.created_at).unwrap()
            })
            .collect();
        let batch_ids: Vec<Uuid> = batch.iter().map(|txn| txn.id).collect();

        assert_eq!(ledger.add_many(batch), 2);
        assert_eq!(backend.writes(), 2);
        let ids: Vec<Uuid> = ledger.all().iter().map(|txn| txn.id).collect();
        assert_eq!(ids, vec![batch_ids[0], batch_ids[1], existing.id]);

        assert_eq!(ledger.add_many(Vec::new()), 0);
        assert_eq!(backend.writes(), 2);
    }

    #[test]
    fn projections_filter_without_mutating() {
        let (mut ledger, _backend) = ledger();
        ledger.add(expense(day(2024, 4, 30), "食費", 100.0)).unwrap();
        ledger.add(expense(day(2024, 5, 1), "食費", 200.0)).unwrap();
        ledger
            .add(NewTransaction::new(
                day(2024, 5, 25),
                TransactionType::Income,
                "給料",
                300000.0,
            ))
            .unwrap();
        let before = ledger.all().to_vec();

        let may: Month = "2024-05".parse().unwrap();
        assert_eq!(ledger.by_month(may).len(), 2);
        assert_eq!(ledger.by_type(TransactionType::Expense).len(), 2);
        assert_eq!(ledger.by_type(TransactionType::Income)[0].category, "給料");
        assert_eq!(ledger.all(), before.as_slice());
        assert!(ledger
            .all()
            .iter()
            .all(|txn| txn.source == TransactionSource::Manual));
    }

    #[test]
    fn reopening_restores_persisted_entries() {
        let (mut ledger, backend) = ledger();
        let txn = ledger.add(expense(day(2024, 5, 1), "食費", 500.0)).unwrap();
        let reopened = TransactionLedger::open(
            "kakeibo:transactions",
            backend,
            Arc::new(FixedClock::on(2024, 6, 1)),
        );
        assert_eq!(reopened.all(), &[txn]);
    }
}
