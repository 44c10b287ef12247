pub mod csv_backend;

use std::path::Path;

use crate::{domain::ExpenseRecord, errors::LedgerError};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Append-only persistence for expense records.
///
/// Implementations assume a single writer. Concurrent writers from other
/// processes may interleave rows; nothing here locks the backing file.
pub trait ExpenseStore: Send + Sync {
    /// Makes the store ready for appends. Never alters existing records.
    fn initialize(&self) -> Result<()>;

    /// Stamps a record with today's date and appends it.
    fn append(&self, amount: f64, category: &str, note: &str) -> Result<ExpenseRecord>;

    /// Every stored record in insertion order.
    fn read_all(&self) -> Result<Vec<ExpenseRecord>>;

    fn location(&self) -> &Path;
}

pub use csv_backend::{CsvExpenseStore, HEADER};
