//! Aggregation services, caller-side validation, and the ledger facade.

pub mod ledger_manager;
pub mod services;
pub mod time;
pub mod utils;
pub mod validation;

pub use ledger_manager::{ExpenseLedger, LedgerSnapshot};
