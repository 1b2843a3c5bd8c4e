//! Read-only monthly summaries derived from a ledger snapshot.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::domain::{Month, Transaction, TransactionType};

/// Number of most recent active months reported by [`AggregationEngine::monthly_series`].
pub const SERIES_WINDOW: usize = 12;

/// Income, expense, and their difference for one month.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MonthlyTotals {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

impl MonthlyTotals {
    fn record(&mut self, txn: &Transaction) {
        match txn.kind {
            TransactionType::Income => self.income += txn.amount,
            TransactionType::Expense => self.expense += txn.amount,
        }
        self.balance = self.income - self.expense;
    }
}

/// Expense total for one category label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// One row of the multi-month series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub month: Month,
    #[serde(flatten)]
    pub totals: MonthlyTotals,
}

pub struct AggregationEngine;

impl AggregationEngine {
    /// Sums income and expense among entries dated within `month`.
    pub fn monthly_totals(txns: &[Transaction], month: Month) -> MonthlyTotals {
        txns.iter()
            .filter(|txn| month.contains(txn.date))
            .fold(MonthlyTotals::default(), |mut totals, txn| {
                totals.record(txn);
                totals
            })
    }

    /// Groups the expenses of `month` by category label, largest total first.
    ///
    /// Ties keep the order in which categories first appear in the ledger.
    pub fn category_breakdown(txns: &[Transaction], month: Month) -> Vec<CategoryTotal> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut rows: Vec<CategoryTotal> = Vec::new();
        for txn in txns
            .iter()
            .filter(|txn| txn.kind == TransactionType::Expense && month.contains(txn.date))
        {
            match index.get(txn.category.as_str()) {
                Some(&slot) => rows[slot].total += txn.amount,
                None => {
                    index.insert(txn.category.as_str(), rows.len());
                    rows.push(CategoryTotal {
                        category: txn.category.clone(),
                        total: txn.amount,
                    });
                }
            }
        }
        rows.sort_by(|a, b| b.total.total_cmp(&a.total));
        rows
    }

    /// Per-month totals for the [`SERIES_WINDOW`] most recent months with any activity,
    /// oldest first. Months without entries are omitted rather than zero-filled.
    pub fn monthly_series(txns: &[Transaction]) -> Vec<MonthlySummary> {
        Self::monthly_series_limited(txns, SERIES_WINDOW)
    }

    pub fn monthly_series_limited(txns: &[Transaction], window: usize) -> Vec<MonthlySummary> {
        let mut by_month: BTreeMap<Month, MonthlyTotals> = BTreeMap::new();
        for txn in txns {
            by_month.entry(txn.month()).or_default().record(txn);
        }
        let skip = by_month.len().saturating_sub(window);
        by_month
            .into_iter()
            .skip(skip)
            .map(|(month, totals)| MonthlySummary { month, totals })
            .collect()
    }
}
