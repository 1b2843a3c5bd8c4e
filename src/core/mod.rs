//! Household services built on the stores: reconciliation, aggregation, and the registry
//! that wires them together.

pub mod registry;
pub mod services;

pub use registry::StoreRegistry;
pub use services::{
    AggregationEngine, ApplyReport, CategoryTotal, MonthlySummary, MonthlyTotals,
    ReconciliationEngine,
};
