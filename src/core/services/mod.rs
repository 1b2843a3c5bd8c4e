pub mod aggregation;
pub mod reconciliation;

pub use aggregation::{
    AggregationEngine, CategoryTotal, MonthlySummary, MonthlyTotals, SERIES_WINDOW,
};
pub use reconciliation::{ApplyReport, ReconciliationEngine};
