//! Persistent stores for transactions, categories, and recurring templates.

pub mod category;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod recurring;

pub use category::CategoryRegistry;
pub use ledger::TransactionLedger;
pub use recurring::RecurringTemplateStore;
