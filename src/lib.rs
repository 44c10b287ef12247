#![doc(test(attr(deny(warnings))))]

//! Expense Ledger records personal spending in an append-only CSV file and
//! derives totals, per-category and per-day breakdowns, and budget insights
//! from the stored records.
//!
//! ```no_run
//! use expense_ledger::{
//!     core::services::{InsightService, SummaryService},
//!     storage::CsvExpenseStore,
//! };
//!
//! let store = CsvExpenseStore::new("expenses.csv");
//! store.initialize()?;
//! store.append(100.0, "Food", "lunch")?;
//! let records = store.read_all()?;
//! println!("total: {}", SummaryService::total_spent(&records));
//! for insight in InsightService::insights(&records) {
//!     println!("{insight}");
//! }
//! # Ok::<(), expense_ledger::errors::LedgerError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("Expense Ledger tracing initialized.");
    });
}
