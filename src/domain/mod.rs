//! Household-ledger domain models: months, transactions, and recurring templates.
//! No I/O and no storage; only data types and their validation.

pub mod month;
pub mod recurring;
pub mod transaction;
pub mod validation;

pub use month::Month;
pub use recurring::{NewRecurringTemplate, RecurringTemplate};
pub use transaction::{
    NewTransaction, Transaction, TransactionPatch, TransactionSource, TransactionType,
};
pub use validation::{parse_amount, parse_date};
