use std::sync::Arc;

use tracing::info;

use crate::{
    config::Config,
    core::services::{
        AggregationEngine, ApplyReport, CategoryTotal, MonthlySummary, MonthlyTotals,
        ReconciliationEngine,
    },
    domain::Month,
    errors::Result,
    ledger::{CategoryRegistry, RecurringTemplateStore, TransactionLedger},
    storage::{JsonFileBackend, StorageBackend},
    time::{Clock, SystemClock},
};

/// Owns every store of a household, built once at process start and handed to consumers.
pub struct StoreRegistry {
    ledger: TransactionLedger,
    categories: CategoryRegistry,
    recurring: RecurringTemplateStore,
    clock: Arc<dyn Clock>,
    series_window: usize,
}

impl StoreRegistry {
    pub fn new(backend: Arc<dyn StorageBackend>, config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger: TransactionLedger::open(
                config.transactions_key.clone(),
                backend.clone(),
                clock.clone(),
            ),
            categories: CategoryRegistry::open(
                config.categories_key.clone(),
                backend.clone(),
                config.default_categories.clone(),
            ),
            recurring: RecurringTemplateStore::open(
                config.recurring_key.clone(),
                backend,
                clock.clone(),
            ),
            clock,
            series_window: config.series_window,
        }
    }

    /// Opens the stores from JSON files in the configured data directory using wall-clock time.
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        let dir = config.resolve_data_dir();
        let backend = JsonFileBackend::new(&dir)?;
        info!(data_dir = %dir.display(), "opening household stores");
        Ok(Self::new(Arc::new(backend), config, Arc::new(SystemClock)))
    }

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut TransactionLedger {
        &mut self.ledger
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn categories_mut(&mut self) -> &mut CategoryRegistry {
        &mut self.categories
    }

    pub fn recurring(&self) -> &RecurringTemplateStore {
        &self.recurring
    }

    pub fn recurring_mut(&mut self) -> &mut RecurringTemplateStore {
        &mut self.recurring
    }

    /// Realizes every stored template for `month` that has not been realized yet.
    pub fn apply_recurring(&mut self, month: Month) -> ApplyReport {
        ReconciliationEngine::apply_to_month(
            month,
            self.recurring.list(),
            &mut self.ledger,
            self.clock.as_ref(),
        )
    }

    pub fn apply_recurring_to_current_month(&mut self) -> ApplyReport {
        let month = self.clock.current_month();
        self.apply_recurring(month)
    }

    pub fn monthly_totals(&self, month: Month) -> MonthlyTotals {
        AggregationEngine::monthly_totals(self.ledger.all(), month)
    }

    pub fn category_breakdown(&self, month: Month) -> Vec<CategoryTotal> {
        AggregationEngine::category_breakdown(self.ledger.all(), month)
    }

    pub fn monthly_series(&self) -> Vec<MonthlySummary> {
        AggregationEngine::monthly_series_limited(self.ledger.all(), self.series_window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewRecurringTemplate, TransactionType};
    use crate::errors::{ConfigError, KakeiboError};
    use crate::storage::MemoryBackend;
    use crate::time::FixedClock;

    fn registry(backend: Arc<MemoryBackend>) -> StoreRegistry {
        StoreRegistry::new(
            backend,
            &Config::default(),
            Arc::new(FixedClock::on(2024, 5, 12)),
        )
    }

    #[test]
    fn stores_use_configured_keys() {
        let backend = Arc::new(MemoryBackend::new());
        let mut registry = registry(backend.clone());
        registry.categories_mut().add("Rent").unwrap();
        registry
            .recurring_mut()
            .add(NewRecurringTemplate::new(TransactionType::Expense, "Rent", 80000.0))
            .unwrap();
        registry.apply_recurring_to_current_month();

        let config = Config::default();
        assert!(backend.snapshot(&config.transactions_key).is_some());
        assert!(backend.snapshot(&config.categories_key).is_some());
        assert!(backend.snapshot(&config.recurring_key).is_some());
    }

    #[test]
    fn current_month_comes_from_the_clock() {
        let mut registry = registry(Arc::new(MemoryBackend::new()));
        registry
            .recurring_mut()
            .add(NewRecurringTemplate::new(TransactionType::Income, "Salary", 300000.0))
            .unwrap();
        let report = registry.apply_recurring_to_current_month();
        assert_eq!(report.month.to_string(), "2024-05");
        assert_eq!(report.applied, 1);
        assert_eq!(registry.monthly_totals(report.month).income, 300000.0);
    }

    #[test]
    fn open_refuses_stores_sharing_a_key() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let config = Config {
            data_dir: Some(temp.path().to_path_buf()),
            categories_key: Config::default_transactions_key(),
            ..Config::default()
        };
        assert!(matches!(
            StoreRegistry::open(&config),
            Err(KakeiboError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn categories_start_from_configured_defaults() {
        let registry = registry(Arc::new(MemoryBackend::new()));
        assert_eq!(registry.categories().list(), Config::default().default_categories);
    }
}
